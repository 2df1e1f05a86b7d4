//! Error types for docshift.

use std::io;
use thiserror::Error;

/// Result type alias for docshift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a document.
///
/// Every variant terminates only the request that produced it.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The requested (source, target) pair has no routing table entry.
    #[error("Conversion from {source_kind} to {target} is not supported")]
    UnsupportedConversion {
        /// Detected source kind
        source_kind: String,
        /// Requested target kind
        target: String,
    },

    /// The route is listed but refused.
    #[error("{label} is not available: {reason}")]
    RouteDisabled {
        /// Route label (e.g. "to DOCX")
        label: String,
        /// Reason shown to the user
        reason: String,
    },

    /// Extraction succeeded but produced no usable text.
    #[error("Could not extract text from the document. It might be image-based or empty.")]
    NoExtractableText,

    /// The notebook could not be decoded into cells.
    #[error("Malformed notebook: {0}")]
    MalformedNotebook(String),

    /// The render surface never reached a stable state.
    #[error("Timed out after {attempts} checks waiting for content to render. Try a smaller document.")]
    RenderTimeout {
        /// Number of readiness checks performed
        attempts: u32,
    },

    /// The surface is stable but shows no text.
    #[error("Rendered content is empty. Cannot generate a paginated document.")]
    EmptyRenderedContent,

    /// The external analysis service failed or returned a non-conforming answer.
    #[error("{0}")]
    UpstreamAnalysisFailure(String),

    /// The file format could not be recognized.
    #[error("Unknown file format: {0}")]
    UnknownFormat(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The DOCX package is missing required parts.
    #[error("Invalid DOCX: {0}")]
    InvalidDocx(String),

    /// ZIP container error.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Error while producing an output artifact.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnsupportedConversion {
            source_kind: "plain text".to_string(),
            target: "plain text".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Conversion from plain text to plain text is not supported"
        );

        let err = Error::RenderTimeout { attempts: 100 };
        assert!(err.to_string().starts_with("Timed out after 100 checks"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
