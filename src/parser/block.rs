//! Line-oriented Markdown block parser.
//!
//! Recognizes headings (levels 1-3), bullet and ordered list items, and
//! paragraphs. List items are grouped into runs by an explicit state
//! machine; nesting is not supported (leading whitespace is accepted but
//! ignored).

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Block, ListKind, MarkdownDocument};

use super::inline::{format_inline, InlineFormatter};

/// State of the list run currently being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    /// No list is open
    Closed,
    /// A run of `kind` items started at block index `start`
    Open { kind: ListKind, start: usize },
}

/// Classification of a single source line.
#[derive(Debug, PartialEq, Eq)]
enum LineKind<'a> {
    Blank,
    Heading(u8, &'a str),
    Item(ListKind, &'a str),
    Text(&'a str),
}

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*] ").expect("valid regex"));
static ORDERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\. ").expect("valid regex"));

/// Block parser for the supported Markdown subset.
pub struct BlockParser<'f> {
    formatter: Option<&'f InlineFormatter>,
}

impl<'f> BlockParser<'f> {
    /// Create a parser using the shared inline formatter.
    pub fn new() -> Self {
        Self { formatter: None }
    }

    /// Use a specific inline formatter.
    pub fn with_formatter(mut self, formatter: &'f InlineFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Parse a full Markdown text.
    pub fn parse(&self, text: &str) -> MarkdownDocument {
        let mut doc = MarkdownDocument::default();
        let mut state = RunState::Closed;

        for raw in text.split('\n') {
            let line = raw.strip_suffix('\r').unwrap_or(raw);

            state = match self.classify(line) {
                LineKind::Blank => close_run(&mut doc, state),
                LineKind::Heading(level, rest) => {
                    let state = close_run(&mut doc, state);
                    doc.blocks.push(Block::Heading {
                        level,
                        inline: self.inline(rest),
                    });
                    state
                }
                LineKind::Item(kind, rest) => {
                    let state = match state {
                        RunState::Open { kind: open, .. } if open == kind => state,
                        other => {
                            close_run(&mut doc, other);
                            RunState::Open {
                                kind,
                                start: doc.blocks.len(),
                            }
                        }
                    };
                    doc.blocks.push(Block::ListItem {
                        kind,
                        inline: self.inline(rest),
                    });
                    state
                }
                LineKind::Text(content) => {
                    let state = close_run(&mut doc, state);
                    doc.blocks.push(Block::Paragraph {
                        inline: self.inline(content),
                    });
                    state
                }
            };
        }

        close_run(&mut doc, state);
        doc
    }

    /// Classify a line. Markers must be followed by a space, which is
    /// matched before trailing whitespace is trimmed from the content.
    fn classify<'a>(&self, line: &'a str) -> LineKind<'a> {
        if line.trim().is_empty() {
            return LineKind::Blank;
        }
        if let Some(rest) = line.strip_prefix("# ") {
            return LineKind::Heading(1, rest.trim_end());
        }
        if let Some(rest) = line.strip_prefix("## ") {
            return LineKind::Heading(2, rest.trim_end());
        }
        if let Some(rest) = line.strip_prefix("### ") {
            return LineKind::Heading(3, rest.trim_end());
        }
        if let Some(m) = BULLET.find(line) {
            return LineKind::Item(ListKind::Bullet, line[m.end()..].trim_end());
        }
        if let Some(m) = ORDERED.find(line) {
            return LineKind::Item(ListKind::Ordered, line[m.end()..].trim_end());
        }
        LineKind::Text(line.trim_end())
    }

    fn inline(&self, text: &str) -> Vec<crate::model::InlineSpan> {
        match self.formatter {
            Some(formatter) => formatter.format(text),
            None => format_inline(text),
        }
    }
}

impl Default for BlockParser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Record the open run, if any, and return the closed state.
fn close_run(doc: &mut MarkdownDocument, state: RunState) -> RunState {
    if let RunState::Open { start, .. } = state {
        let end = doc.blocks.len();
        if end > start {
            doc.list_runs.push(start..end);
        }
    }
    RunState::Closed
}

/// Parse Markdown with the shared parser.
pub fn parse_markdown(text: &str) -> MarkdownDocument {
    static PARSER: LazyLock<BlockParser<'static>> = LazyLock::new(BlockParser::new);
    PARSER.parse(text)
}
