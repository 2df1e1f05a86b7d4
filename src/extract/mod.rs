//! Text extraction adapters.
//!
//! Each adapter turns the bytes of a binary document into plain text.
//! Structure is not preserved beyond line and paragraph breaks.

mod docx;
mod pdf;

pub use docx::DocxTextExtractor;
pub(crate) use docx::is_docx_package;
pub use pdf::{inspect_pdf, PdfInfo, PdfTextExtractor};

use crate::error::{Error, Result};

/// Extracts plain text from a document's bytes.
pub trait TextExtractor {
    /// Extract the full text.
    fn extract(&self, bytes: &[u8]) -> Result<String>;

    /// Short name used in log messages.
    fn name(&self) -> &'static str;
}

/// Reject text that is empty after trimming.
///
/// Image-only PDFs and empty DOCX bodies come back as whitespace; callers
/// that need real content pass the result through here.
pub fn require_text(text: String) -> Result<String> {
    if text.trim().is_empty() {
        return Err(Error::NoExtractableText);
    }
    Ok(text)
}
