//! # docshift
//!
//! Structured document conversion for Rust.
//!
//! This library turns PDF, DOCX, Jupyter notebooks, Markdown and plain
//! text into plain text, self-contained HTML, styled DOCX and paginated
//! PDF. Every conversion goes through a routing table that lists which
//! (source, target) pairs are offered.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docshift::{convert_file, TargetKind};
//!
//! fn main() -> docshift::Result<()> {
//!     // Notebook to a standalone HTML page
//!     let artifact = convert_file("analysis.ipynb", TargetKind::Html)?;
//!     std::fs::write(&artifact.name, &artifact.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Text extraction**: PDF content streams and DOCX paragraphs
//! - **Markdown subset**: headings, lists, bold, italic, code and links
//! - **Notebooks**: HTML, DOCX and paginated PDF with cell outputs
//! - **Paginated PDF**: fixed-width layout sliced into A4 pages
//! - **Analysis prompts**: summary, strategy and quiz requests for an
//!   external text-generation service

pub mod analysis;
pub mod convert;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod parser;
pub mod render;
pub mod retry;

// Re-export commonly used types
pub use analysis::{analyze, AnalysisKind, AnalysisOutcome, AnalysisRequest, AnalysisService};
pub use convert::{
    Artifact, ConversionRoute, ConvertOptions, Converter, RoutingTable, SourceDocument,
    SourceKind, TargetKind,
};
pub use detect::{detect_source_kind, detect_source_kind_from_path};
pub use error::{Error, Result};
pub use extract::{DocxTextExtractor, PdfTextExtractor, TextExtractor};
pub use model::{Block, InlineSpan, ListKind, MarkdownDocument, Notebook, PagedDocument};
pub use parser::{format_inline, parse_markdown, parse_notebook};
pub use render::{RenderOptions, SanitizeOptions};
pub use retry::{poll_until, PollOutcome, RetryPolicy};

use std::path::Path;

/// Library version, as recorded in generated documents.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convert a file with the default routing table.
///
/// # Example
///
/// ```no_run
/// use docshift::{convert_file, TargetKind};
///
/// let artifact = convert_file("report.docx", TargetKind::Pdf).unwrap();
/// assert_eq!(artifact.name, "report.pdf");
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P, target: TargetKind) -> Result<Artifact> {
    let source = SourceDocument::from_path(path)?;
    Converter::default().convert(&source, target)
}

/// Convert in-memory bytes. The name drives format detection and the
/// artifact name.
pub fn convert_bytes(name: &str, bytes: &[u8], target: TargetKind) -> Result<Artifact> {
    let source = SourceDocument::new(name, bytes);
    Converter::default().convert(&source, target)
}

/// Extract the readable text of a file.
///
/// Fails with [`Error::NoExtractableText`] when the document yields only
/// whitespace, as image-only PDFs do.
///
/// # Example
///
/// ```no_run
/// let text = docshift::extract_text("document.pdf").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let source = SourceDocument::from_path(path)?;
    Converter::default().extract_text(&source)
}

/// Render Markdown text as a display fragment.
pub fn markdown_to_html(text: &str) -> String {
    render::markdown_to_html_fragment(&parse_markdown(text))
}
