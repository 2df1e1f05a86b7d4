//! Document analysis requests.
//!
//! Builds prompts for an external text-generation service and validates
//! what comes back. The service itself is supplied by the caller through
//! [`AnalysisService`]; no network code lives in this crate.

mod quiz;

pub use quiz::{quiz_schema, Quiz, QuizProblem, QuizQuestion, OPTIONS_PER_QUESTION};

use std::fmt;

use serde_json::Value;

use crate::convert::{Artifact, TargetKind};
use crate::error::{Error, Result};
use crate::render::{flow_text, PdfWriter, RenderOptions};

/// Longest document excerpt sent to the service, in characters.
pub const MAX_PROMPT_CHARS: usize = 100_000;

const SERVICE_FAILURE: &str = "Failed to get a response from the analysis service. The content might be too complex or there could be an issue with the service.";
const INVALID_QUIZ: &str = "The analysis service returned an invalid format for the quiz. Please try again.";

/// Error type returned by analysis services.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    /// A concise Markdown summary
    Summarize,
    /// A four-week action plan
    Strategize,
    /// A multiple-choice quiz
    Quiz,
}

impl AnalysisKind {
    /// All analysis kinds.
    pub const ALL: [AnalysisKind; 3] = [
        AnalysisKind::Summarize,
        AnalysisKind::Strategize,
        AnalysisKind::Quiz,
    ];

    /// Short tag used in download names.
    pub fn tag(self) -> &'static str {
        match self {
            AnalysisKind::Summarize => "summarize",
            AnalysisKind::Strategize => "strategy",
            AnalysisKind::Quiz => "quiz",
        }
    }

    /// Heading shown above a result.
    pub fn title(self) -> &'static str {
        match self {
            AnalysisKind::Summarize => "Summary",
            AnalysisKind::Strategize => "4-Week Strategy",
            AnalysisKind::Quiz => "Generated Quiz",
        }
    }

    fn instructions(self) -> &'static str {
        match self {
            AnalysisKind::Summarize => "Summarize the following document concisely. Use Markdown for formatting, including bullet points for key takeaways and bold text for important terms. Structure the summary with a main title and sections if applicable.",
            AnalysisKind::Strategize => "Based on the following document, create a detailed 4-week actionable strategy. Format the output using Markdown. Use a main heading for the strategy. For each week, use a sub-heading (e.g., \"## Week 1: Foundation\") and then use bulleted or numbered lists for goals, tasks, and milestones. Use bold text to emphasize key actions.",
            AnalysisKind::Quiz => "Generate a multiple-choice quiz with at least 5 questions based on the key information in the following document. For each question, provide 4 options and clearly indicate the correct answer. The questions should test understanding of the main concepts.",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Expected form of the service's answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// Free text (Markdown)
    Text,
    /// JSON conforming to a schema
    Json {
        /// Response schema
        schema: Value,
    },
}

/// A prompt ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    /// What is being asked for
    pub kind: AnalysisKind,
    /// Full prompt text, document included
    pub prompt: String,
    /// Expected answer form
    pub shape: ResponseShape,
}

impl AnalysisRequest {
    /// Build the prompt for a document.
    pub fn new(text: &str, kind: AnalysisKind) -> Self {
        let prompt = format!(
            "{}\n\nDocument:\n\"\"\"\n{}\n\"\"\"",
            kind.instructions(),
            truncate_chars(text, MAX_PROMPT_CHARS)
        );
        let shape = match kind {
            AnalysisKind::Quiz => ResponseShape::Json {
                schema: quiz_schema(),
            },
            _ => ResponseShape::Text,
        };
        Self {
            kind,
            prompt,
            shape,
        }
    }
}

/// A text-generation backend.
pub trait AnalysisService {
    /// Answer a request with raw response text.
    fn generate(&self, request: &AnalysisRequest) -> std::result::Result<String, BoxError>;
}

impl<F> AnalysisService for F
where
    F: Fn(&AnalysisRequest) -> std::result::Result<String, BoxError>,
{
    fn generate(&self, request: &AnalysisRequest) -> std::result::Result<String, BoxError> {
        self(request)
    }
}

/// A validated analysis result.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// Markdown text
    Text {
        /// Which analysis produced it
        kind: AnalysisKind,
        /// Trimmed response text
        text: String,
    },
    /// A quiz that passed validation
    Quiz(Quiz),
}

impl AnalysisOutcome {
    /// The analysis kind.
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisOutcome::Text { kind, .. } => *kind,
            AnalysisOutcome::Quiz(_) => AnalysisKind::Quiz,
        }
    }

    /// Readable text form.
    pub fn to_plain_text(&self) -> String {
        match self {
            AnalysisOutcome::Text { text, .. } => text.clone(),
            AnalysisOutcome::Quiz(quiz) => quiz.to_plain_text(),
        }
    }

    /// Download name: `{stem}_{kind}.{ext}`, where the stem is the source
    /// name up to its first dot.
    pub fn download_name(&self, source_name: &str, target: TargetKind) -> String {
        let stem = source_name.split('.').next().unwrap_or_default();
        format!("{}_{}.{}", stem, self.kind().tag(), target.extension())
    }

    /// Package the result as a plain text or PDF download.
    pub fn to_artifact(&self, source_name: &str, target: TargetKind) -> Result<Artifact> {
        let text = self.to_plain_text();
        let bytes = match target {
            TargetKind::PlainText => text.into_bytes(),
            TargetKind::Pdf => {
                let options = RenderOptions::new().with_title(self.kind().title());
                PdfWriter::new().write(&flow_text(&text, &options))?
            }
            _ => {
                return Err(Error::UnsupportedConversion {
                    source_kind: "analysis result".to_string(),
                    target: target.to_string(),
                })
            }
        };

        Ok(Artifact {
            name: self.download_name(source_name, target),
            mime: target.mime(),
            bytes,
        })
    }
}

/// Run one analysis over extracted document text.
pub fn analyze<S>(service: &S, text: &str, kind: AnalysisKind) -> Result<AnalysisOutcome>
where
    S: AnalysisService + ?Sized,
{
    if text.trim().is_empty() {
        return Err(Error::NoExtractableText);
    }

    let request = AnalysisRequest::new(text, kind);
    log::debug!("Requesting {} analysis ({} prompt bytes)", kind, request.prompt.len());

    let response = service.generate(&request).map_err(|e| {
        log::error!("Analysis service failed: {}", e);
        Error::UpstreamAnalysisFailure(SERVICE_FAILURE.to_string())
    })?;
    let response = response.trim();

    match kind {
        AnalysisKind::Quiz => {
            let quiz = Quiz::from_json(response).map_err(|e| {
                log::error!("Failed to parse quiz JSON: {}", e);
                Error::UpstreamAnalysisFailure(INVALID_QUIZ.to_string())
            })?;
            quiz.validate().map_err(|problem| {
                log::error!("Rejected quiz: {}", problem);
                Error::UpstreamAnalysisFailure(INVALID_QUIZ.to_string())
            })?;
            Ok(AnalysisOutcome::Quiz(quiz))
        }
        _ => Ok(AnalysisOutcome::Text {
            kind,
            text: response.to_string(),
        }),
    }
}

/// The first `max` characters of `text`.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}
