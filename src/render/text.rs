//! Plain text rendering for Markdown and notebooks.
//!
//! Used where a document's readable text is needed without layout, such
//! as preparing analysis input or printing a notebook to a terminal.

use crate::model::{CellKind, ListKind, MarkdownDocument, Node, Notebook};
use crate::parser::parse_markdown;

/// Convert Markdown to plain text. Inline styling is dropped; list items
/// keep a marker.
pub fn markdown_to_text(doc: &MarkdownDocument) -> String {
    let mut lines = Vec::new();

    for node in doc.nodes() {
        match node {
            Node::Block(block) => lines.push(block.plain_text()),
            Node::List(run) => {
                for (i, item) in run.items.iter().enumerate() {
                    let marker = match run.kind {
                        ListKind::Bullet => "-".to_string(),
                        ListKind::Ordered => format!("{}.", i + 1),
                    };
                    lines.push(format!("{} {}", marker, item.plain_text()));
                }
            }
        }
    }

    lines.join("\n")
}

/// Convert a notebook to plain text: cells separated by blank lines, each
/// code cell followed by its text outputs.
pub fn notebook_to_text(notebook: &Notebook) -> String {
    let mut sections = Vec::new();

    for cell in &notebook.cells {
        match cell.kind {
            CellKind::Markdown => {
                let text = markdown_to_text(&parse_markdown(&cell.source));
                if !text.trim().is_empty() {
                    sections.push(text);
                }
            }
            CellKind::Code => {
                let mut section = cell.source.trim_end().to_string();
                for output in cell.output_texts() {
                    section.push('\n');
                    section.push_str(output.trim_end_matches('\n'));
                }
                if !section.trim().is_empty() {
                    sections.push(section);
                }
            }
            CellKind::Other(_) => {}
        }
    }

    sections.join("\n\n")
}
