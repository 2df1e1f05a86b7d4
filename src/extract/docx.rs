//! DOCX text extraction.
//!
//! Reads `word/document.xml` from the package and emits the text of each
//! paragraph followed by a blank line. Run formatting is discarded.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::{Error, Result};

use super::TextExtractor;

const DOCUMENT_PART: &str = "word/document.xml";

/// Plain-text extractor for Word documents.
#[derive(Debug, Clone, Default)]
pub struct DocxTextExtractor;

impl DocxTextExtractor {
    /// Create an extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract text from the XML of a document part.
    pub fn extract_xml(&self, xml: &str) -> Result<String> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut out = String::new();
        let mut paragraph = String::new();
        let mut in_paragraph = false;
        let mut in_text = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match local_name(e.name().as_ref()) {
                    b"p" => {
                        in_paragraph = true;
                        paragraph.clear();
                    }
                    b"t" => in_text = true,
                    b"tab" => paragraph.push('\t'),
                    b"br" | b"cr" => paragraph.push('\n'),
                    _ => {}
                },
                Event::Empty(e) => match local_name(e.name().as_ref()) {
                    b"p" => out.push_str("\n\n"),
                    b"tab" => paragraph.push('\t'),
                    b"br" | b"cr" => paragraph.push('\n'),
                    _ => {}
                },
                Event::Text(e) if in_text => {
                    paragraph.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
                Event::GeneralRef(e) if in_text => {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        paragraph.push_str(&resolved);
                    }
                }
                Event::End(e) => match local_name(e.name().as_ref()) {
                    b"t" => in_text = false,
                    b"p" if in_paragraph => {
                        in_paragraph = false;
                        out.push_str(&paragraph);
                        out.push_str("\n\n");
                        paragraph.clear();
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(out)
    }
}

impl TextExtractor for DocxTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::InvalidDocx(e.to_string()))?;

        let mut xml = String::new();
        archive
            .by_name(DOCUMENT_PART)
            .map_err(|_| Error::InvalidDocx(format!("missing {}", DOCUMENT_PART)))?
            .read_to_string(&mut xml)?;

        log::debug!("Read {} ({} bytes)", DOCUMENT_PART, xml.len());
        self.extract_xml(&xml)
    }

    fn name(&self) -> &'static str {
        "docx"
    }
}

/// Check whether a ZIP archive looks like a Word document.
pub(crate) fn is_docx_package(bytes: &[u8]) -> bool {
    ZipArchive::new(Cursor::new(bytes))
        .map(|archive| archive.index_for_name(DOCUMENT_PART).is_some())
        .unwrap_or(false)
}

/// Element name without its namespace prefix.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(i) => &name[i + 1..],
        None => name,
    }
}

fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };

    code.and_then(char::from_u32).map(|c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn body(inner: &str) -> String {
        format!(r#"<w:document {}><w:body>{}</w:body></w:document>"#, NS, inner)
    }

    #[test]
    fn test_paragraphs() {
        let xml = body(
            "<w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space=\"preserve\"> world</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Second</w:t></w:r></w:p>",
        );
        let text = DocxTextExtractor::new().extract_xml(&xml).unwrap();
        assert_eq!(text, "Hello world\n\nSecond\n\n");
    }

    #[test]
    fn test_tabs_breaks_and_entities() {
        let xml = body("<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c &amp; d</w:t></w:r></w:p>");
        let text = DocxTextExtractor::new().extract_xml(&xml).unwrap();
        assert_eq!(text, "a\tb\nc & d\n\n");
    }

    #[test]
    fn test_empty_paragraph() {
        let xml = body("<w:p/><w:p><w:pPr/></w:p>");
        let text = DocxTextExtractor::new().extract_xml(&xml).unwrap();
        assert_eq!(text, "\n\n\n\n");
    }

    #[test]
    fn test_not_a_zip() {
        let result = DocxTextExtractor::new().extract(b"plain text");
        assert!(matches!(result, Err(Error::InvalidDocx(_))));
        assert!(!is_docx_package(b"plain text"));
    }

    #[test]
    fn test_package_needs_document_part() {
        use std::io::Write;
        use zip::write::SimpleFileOptions;
        use zip::ZipWriter;

        let package = |part: &str| {
            let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
            writer.start_file(part, SimpleFileOptions::default()).unwrap();
            writer.write_all(b"<x/>").unwrap();
            writer.finish().unwrap().into_inner()
        };

        assert!(is_docx_package(&package(DOCUMENT_PART)));
        assert!(!is_docx_package(&package("mimetype")));
    }

    #[test]
    fn test_resolve_entity() {
        assert_eq!(resolve_entity("#x41").as_deref(), Some("A"));
        assert_eq!(resolve_entity("#66").as_deref(), Some("B"));
        assert_eq!(resolve_entity("nbsp"), None);
    }
}
