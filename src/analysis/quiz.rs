//! Multiple-choice quiz responses.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Number of options every question must offer.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A generated quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    /// Quiz title
    pub title: String,
    /// Questions in order
    pub questions: Vec<QuizQuestion>,
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    /// Question text
    pub question: String,
    /// Possible answers
    pub options: Vec<String>,
    /// The correct answer, verbatim one of `options`
    pub correct_answer: String,
}

/// Why a quiz was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizProblem {
    /// A question does not offer exactly four options.
    OptionCount {
        /// 1-based question number
        question: usize,
        /// Options found
        found: usize,
    },
    /// A question's correct answer is not one of its options.
    AnswerNotAnOption {
        /// 1-based question number
        question: usize,
    },
}

impl std::fmt::Display for QuizProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizProblem::OptionCount { question, found } => write!(
                f,
                "question {} has {} options, expected {}",
                question, found, OPTIONS_PER_QUESTION
            ),
            QuizProblem::AnswerNotAnOption { question } => {
                write!(f, "question {} has a correct answer that is not an option", question)
            }
        }
    }
}

impl Quiz {
    /// Parse a quiz from a JSON response.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(strip_code_fence(text))
    }

    /// Check every question against the response contract.
    pub fn validate(&self) -> Result<(), QuizProblem> {
        for (i, q) in self.questions.iter().enumerate() {
            if q.options.len() != OPTIONS_PER_QUESTION {
                return Err(QuizProblem::OptionCount {
                    question: i + 1,
                    found: q.options.len(),
                });
            }
            if !q.options.iter().any(|o| *o == q.correct_answer) {
                return Err(QuizProblem::AnswerNotAnOption { question: i + 1 });
            }
        }
        Ok(())
    }

    /// Readable text form used for downloads.
    pub fn to_plain_text(&self) -> String {
        let mut out = format!("{}\n\n", self.title);
        for (i, q) in self.questions.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, q.question));
            for option in &q.options {
                out.push_str(&format!("   - {}\n", option));
            }
            out.push_str(&format!("Correct Answer: {}\n\n", q.correct_answer));
        }
        out
    }
}

/// Response schema sent with quiz requests.
pub fn quiz_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "A creative title for the quiz based on the document content."
            },
            "questions": {
                "type": "ARRAY",
                "description": "An array of quiz questions.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": { "type": "STRING", "description": "The quiz question." },
                        "options": {
                            "type": "ARRAY",
                            "description": "An array of 4 possible answers (strings). One of them must be the correct answer.",
                            "items": { "type": "STRING" }
                        },
                        "correctAnswer": {
                            "type": "STRING",
                            "description": "The correct answer, which must exactly match one of the strings in the 'options' array."
                        }
                    },
                    "required": ["question", "options", "correctAnswer"]
                }
            }
        },
        "required": ["title", "questions"]
    })
}

/// Remove a surrounding Markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    // Skip the info string ("json") on the opening line.
    match body.find('\n') {
        Some(i) => body[i + 1..].trim(),
        None => body.trim(),
    }
}
