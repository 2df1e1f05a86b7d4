//! Conversion orchestration.
//!
//! A [`Converter`] detects the kind of a [`SourceDocument`], looks the
//! requested target up in its [`RoutingTable`], runs the matching pipeline
//! and returns a named [`Artifact`].
//!
//! # Example
//!
//! ```no_run
//! use docshift::convert::{Converter, SourceDocument, TargetKind};
//!
//! fn main() -> docshift::Result<()> {
//!     let source = SourceDocument::from_path("report.pdf")?;
//!     let artifact = Converter::default().convert(&source, TargetKind::PlainText)?;
//!     std::fs::write(&artifact.name, &artifact.bytes)?;
//!     Ok(())
//! }
//! ```

mod routes;

pub use routes::{ConversionRoute, RoutingTable, TargetKind};

pub use crate::detect::SourceKind;

use std::path::Path;

use crate::detect::{detect_source_kind, extension};
use crate::error::{Error, Result};
use crate::extract::{require_text, DocxTextExtractor, PdfTextExtractor, TextExtractor};
use crate::parser::{parse_markdown, parse_notebook_bytes};
use crate::render::{
    flow_text, markdown_to_text, notebook_to_text, paginate_markdown, paginate_notebook,
    DocxRenderer, HtmlRenderer, PdfWriter, RenderOptions,
};

/// An uploaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// File name, used for detection and artifact naming
    pub name: String,
    /// Declared MIME type, if any
    pub mime: Option<String>,
    /// Raw content
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    /// Create a source document.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            mime: None,
            bytes: bytes.into(),
        }
    }

    /// Set the declared MIME type.
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Read a file. The file name (without directories) becomes the
    /// document name.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Ok(Self::new(name, bytes))
    }

    /// Detect the source kind.
    pub fn kind(&self) -> Result<SourceKind> {
        detect_source_kind(&self.name, self.mime.as_deref(), &self.bytes)
    }

    /// Content decoded as UTF-8 text, without a leading BOM.
    fn text(&self) -> String {
        let bytes = self.bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&self.bytes);
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// The output of one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File name with the target's extension
    pub name: String,
    /// MIME type of the content
    pub mime: &'static str,
    /// Content
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Get content length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the artifact has no content.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Content as text, for text-based targets.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// Name an artifact after its source: the source extension is replaced
/// with `ext`, or `ext` is appended when there is none.
pub fn artifact_name(source_name: &str, ext: &str) -> String {
    match extension(source_name) {
        Some(old) => format!("{}.{}", &source_name[..source_name.len() - old.len() - 1], ext),
        None => format!("{}.{}", source_name, ext),
    }
}

/// Options for document conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Rendering options. The title defaults to the source name.
    pub render: RenderOptions,

    /// Available routes
    pub routes: RoutingTable,

    /// PDF text extraction settings
    pub pdf: PdfTextExtractor,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Set the routing table.
    pub fn with_routes(mut self, routes: RoutingTable) -> Self {
        self.routes = routes;
        self
    }

    /// Set the PDF text extractor.
    pub fn with_pdf_extractor(mut self, extractor: PdfTextExtractor) -> Self {
        self.pdf = extractor;
        self
    }
}

/// Runs conversions through the routing table.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter.
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// The routing table in use.
    pub fn routes(&self) -> &RoutingTable {
        &self.options.routes
    }

    /// Routes offered for a source, with their enablement.
    pub fn routes_for(&self, source: &SourceDocument) -> Result<Vec<&ConversionRoute>> {
        let kind = source.kind()?;
        Ok(self.options.routes.routes_for(kind).collect())
    }

    /// Convert a source document to the target kind.
    pub fn convert(&self, source: &SourceDocument, target: TargetKind) -> Result<Artifact> {
        let kind = source.kind()?;

        let route = self
            .options
            .routes
            .find(kind, target)
            .ok_or_else(|| Error::UnsupportedConversion {
                source_kind: kind.to_string(),
                target: target.to_string(),
            })?;

        if let Some(reason) = &route.disabled_reason {
            log::warn!("Refusing {} {}: {}", kind, route.label, reason);
            return Err(Error::RouteDisabled {
                label: route.label.clone(),
                reason: reason.clone(),
            });
        }

        log::debug!(
            "Converting {} ({}, {} bytes) {}",
            source.name,
            kind,
            source.bytes.len(),
            route.label
        );

        let bytes = self.run(kind, target, source)?;
        let artifact = Artifact {
            name: artifact_name(&source.name, target.extension()),
            mime: target.mime(),
            bytes,
        };

        log::debug!("Produced {} ({} bytes)", artifact.name, artifact.len());
        Ok(artifact)
    }

    /// Extract the readable text of a source, for display or analysis.
    pub fn extract_text(&self, source: &SourceDocument) -> Result<String> {
        let text = match source.kind()? {
            SourceKind::Pdf => self.options.pdf.extract(&source.bytes)?,
            SourceKind::Docx => DocxTextExtractor::new().extract(&source.bytes)?,
            SourceKind::Notebook => notebook_to_text(&parse_notebook_bytes(&source.bytes)?),
            SourceKind::Markdown => markdown_to_text(&parse_markdown(&source.text())),
            SourceKind::PlainText => source.text(),
        };
        require_text(text)
    }

    fn render_options(&self, source: &SourceDocument) -> RenderOptions {
        let mut options = self.options.render.clone();
        if options.title.is_none() {
            options.title = Some(source.name.clone());
        }
        options
    }

    fn run(&self, kind: SourceKind, target: TargetKind, source: &SourceDocument) -> Result<Vec<u8>> {
        let options = self.render_options(source);
        let writer = PdfWriter::new();

        match (kind, target) {
            (SourceKind::Pdf, TargetKind::PlainText) => {
                let text = require_text(self.options.pdf.extract(&source.bytes)?)?;
                Ok(text.into_bytes())
            }
            (SourceKind::Docx, TargetKind::PlainText) => {
                let text = require_text(DocxTextExtractor::new().extract(&source.bytes)?)?;
                Ok(text.into_bytes())
            }
            (SourceKind::Docx, TargetKind::Pdf) => {
                let text = require_text(DocxTextExtractor::new().extract(&source.bytes)?)?;
                writer.write(&flow_text(&text, &options))
            }
            (SourceKind::Notebook, TargetKind::Html) => {
                let notebook = parse_notebook_bytes(&source.bytes)?;
                Ok(HtmlRenderer::new(options).notebook_document(&notebook).into_bytes())
            }
            (SourceKind::Notebook, TargetKind::Docx) => {
                let notebook = parse_notebook_bytes(&source.bytes)?;
                DocxRenderer::new(options).notebook(&notebook)
            }
            (SourceKind::Notebook, TargetKind::Pdf) => {
                let notebook = parse_notebook_bytes(&source.bytes)?;
                writer.write(&paginate_notebook(&notebook, &options)?)
            }
            (SourceKind::Markdown, TargetKind::Html) => {
                let doc = parse_markdown(&source.text());
                Ok(HtmlRenderer::new(options).markdown_document(&doc).into_bytes())
            }
            (SourceKind::Markdown, TargetKind::Docx) => {
                DocxRenderer::new(options).markdown(&parse_markdown(&source.text()))
            }
            (SourceKind::Markdown, TargetKind::Pdf) => {
                writer.write(&paginate_markdown(&parse_markdown(&source.text()), &options)?)
            }
            (SourceKind::PlainText, TargetKind::Pdf) => {
                writer.write(&flow_text(&source.text(), &options))
            }
            _ => Err(Error::UnsupportedConversion {
                source_kind: kind.to_string(),
                target: target.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_name() {
        assert_eq!(artifact_name("report.pdf", "txt"), "report.txt");
        assert_eq!(artifact_name("a.b.ipynb", "html"), "a.b.html");
        assert_eq!(artifact_name("README", "pdf"), "README.pdf");
    }

    #[test]
    fn test_unsupported_pair() {
        let source = SourceDocument::new("notes.txt", b"hello".to_vec());
        let result = Converter::default().convert(&source, TargetKind::PlainText);
        assert!(matches!(result, Err(Error::UnsupportedConversion { .. })));
    }

    #[test]
    fn test_disabled_route() {
        let source = SourceDocument::new("scan.pdf", b"%PDF-1.4\n".to_vec());
        match Converter::default().convert(&source, TargetKind::Docx) {
            Err(Error::RouteDisabled { label, reason }) => {
                assert_eq!(label, "to DOCX");
                assert_eq!(reason, "Client-side PDF to DOCX is not supported.");
            }
            other => panic!("Expected RouteDisabled, got {:?}", other),
        }
    }

    #[test]
    fn test_markdown_to_html() {
        let source = SourceDocument::new("notes.md", b"# Hi\n- a".to_vec());
        let artifact = Converter::default()
            .convert(&source, TargetKind::Html)
            .unwrap();
        assert_eq!(artifact.name, "notes.html");
        assert_eq!(artifact.mime, "text/html");

        let html = artifact.as_text().unwrap();
        assert!(html.contains("<title>notes.md</title>"));
        assert!(html.contains("<h1 class=\"md-h1\">Hi</h1>"));
    }

    #[test]
    fn test_custom_table_refuses_missing_route() {
        let options = ConvertOptions::new().with_routes(RoutingTable::new());
        let source = SourceDocument::new("notes.md", b"x".to_vec());
        let result = Converter::new(options).convert(&source, TargetKind::Html);
        assert!(matches!(result, Err(Error::UnsupportedConversion { .. })));
    }

    #[test]
    fn test_extract_text_rejects_blank() {
        let source = SourceDocument::new("empty.txt", b"  \n".to_vec());
        assert!(matches!(
            Converter::default().extract_text(&source),
            Err(Error::NoExtractableText)
        ));
    }
}
