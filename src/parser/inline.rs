//! Inline Markdown formatting (bold, italic, code, links).
//!
//! Inline markup is resolved by a fixed sequence of textual passes. Each
//! pass only looks at text that is still plain after the previous passes,
//! so a delimiter pair already turned into a styled span is never
//! reconsidered. The order is significant: bold must run before italic
//! or the `*` inside `**` would be read as emphasis.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::model::InlineSpan;

type SpanBuilder = fn(&Captures<'_>) -> InlineSpan;

/// One substitution pass: a delimiter pattern and the span it produces.
#[derive(Clone)]
struct InlinePass {
    pattern: Regex,
    build: SpanBuilder,
}

/// Resolves inline markup of a single line into styled spans.
pub struct InlineFormatter {
    passes: Vec<InlinePass>,
}

/// Delimiter passes in the order they are applied.
static PASSES: LazyLock<Vec<InlinePass>> = LazyLock::new(|| {
    let pass = |pattern: &str, build: SpanBuilder| InlinePass {
        pattern: Regex::new(pattern).expect("valid regex"),
        build,
    };

    vec![
        pass(r"\*\*(.*?)\*\*", |c| InlineSpan::Bold(group(c, 1))),
        pass(r"__(.*?)__", |c| InlineSpan::Bold(group(c, 1))),
        pass(r"\*(.*?)\*", |c| InlineSpan::Italic(group(c, 1))),
        pass(r"_(.*?)_", |c| InlineSpan::Italic(group(c, 1))),
        pass(r"`([^`]+)`", |c| InlineSpan::Code(group(c, 1))),
        pass(r"\[(.*?)\]\((.*?)\)", |c| InlineSpan::Link {
            text: group(c, 1),
            href: group(c, 2),
        }),
    ]
});

impl InlineFormatter {
    /// Create a formatter with the standard pass order.
    pub fn new() -> Self {
        Self {
            passes: PASSES.clone(),
        }
    }

    /// Format one line into spans.
    pub fn format(&self, line: &str) -> Vec<InlineSpan> {
        let mut spans = Vec::new();
        push_text(&mut spans, line);

        for pass in &self.passes {
            spans = apply_pass(pass, spans);
        }

        spans
    }
}

impl Default for InlineFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format one line with the shared formatter.
pub fn format_inline(line: &str) -> Vec<InlineSpan> {
    static FORMATTER: LazyLock<InlineFormatter> = LazyLock::new(InlineFormatter::new);
    FORMATTER.format(line)
}

fn group(caps: &Captures<'_>, index: usize) -> String {
    caps.get(index)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn apply_pass(pass: &InlinePass, spans: Vec<InlineSpan>) -> Vec<InlineSpan> {
    let mut out = Vec::with_capacity(spans.len());

    for span in spans {
        match span {
            InlineSpan::Text(text) => split_text(pass, &text, &mut out),
            styled => out.push(styled),
        }
    }

    out
}

fn split_text(pass: &InlinePass, text: &str, out: &mut Vec<InlineSpan>) {
    let mut last = 0;

    for caps in pass.pattern.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_text(out, &text[last..whole.start()]);
        out.push((pass.build)(&caps));
        last = whole.end();
    }

    push_text(out, &text[last..]);
}

/// Append plain text, merging with a preceding plain span.
fn push_text(out: &mut Vec<InlineSpan>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(InlineSpan::Text(prev)) = out.last_mut() {
        prev.push_str(text);
    } else {
        out.push(InlineSpan::Text(text.to_string()));
    }
}
