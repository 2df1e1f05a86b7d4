//! Source format detection.
//!
//! A source is classified by its file name first (`.ipynb` has no
//! registered MIME type and is always recognized by extension), then by
//! the declared MIME type, then by extension, and finally by sniffing the
//! leading bytes.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Error, Result};
use crate::extract::is_docx_package;

/// MIME type of DOCX packages.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// ZIP local file header.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Kind of document a conversion starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    /// PDF document
    Pdf,
    /// Word document (OOXML)
    Docx,
    /// Jupyter notebook
    Notebook,
    /// Markdown text
    Markdown,
    /// Plain text
    PlainText,
}

impl SourceKind {
    /// All source kinds.
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Pdf,
        SourceKind::Docx,
        SourceKind::Notebook,
        SourceKind::Markdown,
        SourceKind::PlainText,
    ];

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            SourceKind::Pdf => "PDF",
            SourceKind::Docx => "DOCX",
            SourceKind::Notebook => "notebook",
            SourceKind::Markdown => "Markdown",
            SourceKind::PlainText => "plain text",
        }
    }

    /// Match a lowercase file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(SourceKind::Pdf),
            "docx" => Some(SourceKind::Docx),
            "ipynb" => Some(SourceKind::Notebook),
            "md" | "markdown" => Some(SourceKind::Markdown),
            "txt" | "text" => Some(SourceKind::PlainText),
            _ => None,
        }
    }

    /// Match a MIME type. Parameters such as `; charset=utf-8` are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/pdf" => Some(SourceKind::Pdf),
            DOCX_MIME => Some(SourceKind::Docx),
            "application/x-ipynb+json" => Some(SourceKind::Notebook),
            "text/markdown" | "text/x-markdown" => Some(SourceKind::Markdown),
            "text/plain" => Some(SourceKind::PlainText),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extension of a file name, without the dot.
pub fn extension(name: &str) -> Option<&str> {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match file.rfind('.') {
        Some(0) | None => None,
        Some(i) => Some(&file[i + 1..]),
    }
}

/// Detect the kind of a source document.
pub fn detect_source_kind(name: &str, mime: Option<&str>, bytes: &[u8]) -> Result<SourceKind> {
    let ext = extension(name);

    if ext.is_some_and(|e| e.eq_ignore_ascii_case("ipynb")) {
        return Ok(SourceKind::Notebook);
    }

    if let Some(kind) = mime.and_then(SourceKind::from_mime) {
        return Ok(kind);
    }

    if let Some(kind) = ext.and_then(SourceKind::from_extension) {
        return Ok(kind);
    }

    if let Some(kind) = sniff(bytes) {
        log::debug!("Detected {} from content of {}", kind, name);
        return Ok(kind);
    }

    Err(Error::UnknownFormat(name.to_string()))
}

/// Detect the kind of a file on disk.
pub fn detect_source_kind_from_path<P: AsRef<Path>>(path: P) -> Result<SourceKind> {
    let path = path.as_ref();
    let mut bytes = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;
    detect_source_kind(&path.to_string_lossy(), None, &bytes)
}

/// Classify bytes by their signature.
pub fn sniff(bytes: &[u8]) -> Option<SourceKind> {
    if is_pdf_bytes(bytes) {
        Some(SourceKind::Pdf)
    } else if bytes.starts_with(ZIP_MAGIC) && is_docx_package(bytes) {
        Some(SourceKind::Docx)
    } else {
        None
    }
}

/// PDF version from the file header (e.g. "1.7"), if the bytes are a PDF.
pub fn pdf_version(data: &[u8]) -> Option<String> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return None;
    }

    let version_bytes = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();
    is_valid_version(&version).then_some(version)
}

/// Check if bytes start with a valid PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    pdf_version(data).is_some()
}

fn is_valid_version(version: &str) -> bool {
    let chars: Vec<char> = version.chars().collect();
    chars.len() == 3 && chars[0].is_ascii_digit() && chars[1] == '.' && chars[2].is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipynb_wins_over_mime() {
        let kind = detect_source_kind("analysis.IPYNB", Some("application/json"), b"{}").unwrap();
        assert_eq!(kind, SourceKind::Notebook);
    }

    #[test]
    fn test_mime_before_extension() {
        let kind = detect_source_kind("notes.txt", Some("application/pdf"), b"").unwrap();
        assert_eq!(kind, SourceKind::Pdf);

        let mime = format!("{}; q=1", DOCX_MIME);
        let kind = detect_source_kind("a.bin", Some(mime.as_str()), b"").unwrap();
        assert_eq!(kind, SourceKind::Docx);
    }

    #[test]
    fn test_extension() {
        assert_eq!(
            detect_source_kind("README.md", None, b"").unwrap(),
            SourceKind::Markdown
        );
        assert_eq!(
            detect_source_kind("dir.v2/notes.txt", Some("application/octet-stream"), b"").unwrap(),
            SourceKind::PlainText
        );
    }

    #[test]
    fn test_sniff_pdf() {
        let kind = detect_source_kind("upload", None, b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(kind, SourceKind::Pdf);
    }

    #[test]
    fn test_unknown() {
        let result = detect_source_kind("upload", None, b"<!DOCTYPE html>");
        assert!(matches!(result, Err(Error::UnknownFormat(_))));

        // A ZIP that is not a Word package
        assert!(sniff(b"PK\x03\x04garbage").is_none());
    }

    #[test]
    fn test_extension_helper() {
        assert_eq!(extension("report.final.pdf"), Some("pdf"));
        assert_eq!(extension(".bashrc"), None);
        assert_eq!(extension("some.dir/README"), None);
        assert_eq!(extension("README"), None);
    }

    #[test]
    fn test_pdf_version() {
        assert_eq!(pdf_version(b"%PDF-2.0\n"), Some("2.0".to_string()));
        assert_eq!(pdf_version(b"%PDF"), None);
        assert_eq!(pdf_version(b"%PDF-x.y"), None);
        assert!(!is_pdf_bytes(b"Not a PDF"));
    }
}
