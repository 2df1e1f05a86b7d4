//! PDF text extraction using lopdf.
//!
//! Walks each page's content stream and collects one text item per
//! text-showing operator (`Tj`, `TJ`, `'`, `"`). A line move or the end of
//! a text object adds an empty end-of-line item, so a page's items joined
//! with spaces read like the visual lines of the page. Every page ends
//! with a newline.

use std::io::Read;

use flate2::read::ZlibDecoder;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};

use super::TextExtractor;

/// TJ adjustment (thousandths of a unit of text space) treated as a word gap.
const DEFAULT_GAP_THRESHOLD: f32 = 200.0;

/// Plain-text extractor for PDF documents.
#[derive(Debug, Clone)]
pub struct PdfTextExtractor {
    /// Insert a space for TJ adjustments larger than this; None disables it
    pub gap_threshold: Option<f32>,
}

impl PdfTextExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the TJ word-gap threshold.
    pub fn with_gap_threshold(mut self, threshold: Option<f32>) -> Self {
        self.gap_threshold = threshold;
        self
    }

    /// Text items of one page, in content-stream order.
    pub fn page_items(&self, doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<String>> {
        let fonts = doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let content = page_content(doc, page_id)?;
        if content.is_empty() {
            return Ok(Vec::new());
        }

        let content =
            lopdf::content::Content::decode(&content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut items = ItemCollector::default();
        let mut font: Vec<u8> = Vec::new();
        let mut line_y: Option<f32> = None;
        let mut in_text = false;

        for op in content.operations {
            match op.operator.as_str() {
                "BT" => in_text = true,
                "ET" => {
                    in_text = false;
                    line_y = None;
                    items.end_line();
                }
                "Tf" => {
                    if let Some(Object::Name(name)) = op.operands.first() {
                        font = name.clone();
                    }
                }
                "Td" | "TD" => {
                    let ty = op.operands.get(1).and_then(get_number).unwrap_or(0.0);
                    if ty != 0.0 {
                        items.end_line();
                    }
                }
                "Tm" => {
                    let y = op.operands.get(5).and_then(get_number);
                    if line_y.is_some() && y != line_y {
                        items.end_line();
                    }
                    line_y = y;
                }
                "T*" => items.end_line(),
                "Tj" if in_text => {
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        items.push(decode(doc, fonts.get(&font).copied(), bytes));
                    }
                }
                "TJ" if in_text => {
                    if let Some(Object::Array(parts)) = op.operands.first() {
                        let font = fonts.get(&font).copied();
                        items.push(self.decode_array(|b| decode(doc, font, b), parts));
                    }
                }
                "'" | "\"" if in_text => {
                    items.end_line();
                    let index = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(Object::String(bytes, _)) = op.operands.get(index) {
                        items.push(decode(doc, fonts.get(&font).copied(), bytes));
                    }
                }
                _ => {}
            }
        }

        Ok(items.items)
    }

    fn decode_array(&self, decode: impl Fn(&[u8]) -> String, parts: &[Object]) -> String {
        let mut combined = String::new();

        for part in parts {
            match part {
                Object::String(bytes, _) => combined.push_str(&decode(bytes)),
                Object::Integer(_) | Object::Real(_) => {
                    let Some(threshold) = self.gap_threshold else {
                        continue;
                    };
                    // Negative adjustments move the next glyph right.
                    let adjustment = -get_number(part).unwrap_or(0.0);
                    if adjustment > threshold
                        && !combined.is_empty()
                        && !combined.ends_with(' ')
                        && !combined.chars().last().is_some_and(is_spaceless_script_char)
                    {
                        combined.push(' ');
                    }
                }
                _ => {}
            }
        }

        combined
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self {
            gap_threshold: Some(DEFAULT_GAP_THRESHOLD),
        }
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let doc = LopdfDocument::load_mem(bytes)?;
        let pages = doc.get_pages();
        log::debug!("Extracting text from {} PDF pages", pages.len());

        let mut out = String::new();
        for (page_num, page_id) in pages {
            match self.page_items(&doc, page_id) {
                Ok(items) => out.push_str(&items.join(" ")),
                Err(e) => log::warn!("Skipping text of page {}: {}", page_num, e),
            }
            out.push('\n');
        }

        Ok(out)
    }

    fn name(&self) -> &'static str {
        "pdf"
    }
}

/// Collects text items with end-of-line markers.
#[derive(Default)]
struct ItemCollector {
    items: Vec<String>,
}

impl ItemCollector {
    fn push(&mut self, text: String) {
        if !text.is_empty() {
            self.items.push(text);
        }
    }

    /// Mark the end of the current line. Repeated moves collapse into one
    /// marker and nothing is marked before the first item.
    fn end_line(&mut self) {
        if self.items.last().is_some_and(|last| !last.is_empty()) {
            self.items.push(String::new());
        }
    }
}

/// Basic facts about a PDF file.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfInfo {
    /// Number of pages
    pub page_count: usize,
    /// PDF version, e.g. "1.5"
    pub version: String,
    /// Title from the info dictionary
    pub title: Option<String>,
    /// Creation date from the info dictionary
    pub created: Option<chrono::DateTime<chrono::Utc>>,
}

/// Read page count and info-dictionary metadata.
pub fn inspect_pdf(bytes: &[u8]) -> Result<PdfInfo> {
    let doc = LopdfDocument::load_mem(bytes)?;

    let info = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|info| info.as_reference().ok())
        .and_then(|id| doc.get_dictionary(id).ok());

    Ok(PdfInfo {
        page_count: doc.get_pages().len(),
        version: doc.version.to_string(),
        title: info.and_then(|dict| get_string_from_dict(dict, b"Title")),
        created: info
            .and_then(|dict| get_string_from_dict(dict, b"CreationDate"))
            .and_then(|date| parse_pdf_date(&date)),
    })
}

/// Concatenated, decompressed content streams of a page. A page without
/// `Contents` yields an empty buffer.
fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;

    let Ok(contents) = page_dict.get(b"Contents") else {
        return Ok(Vec::new());
    };

    match contents {
        Object::Reference(r) => match doc.get_object(*r) {
            Ok(Object::Stream(s)) => Ok(stream_bytes(s)),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        },
        Object::Array(arr) => {
            let mut content = Vec::new();
            for obj in arr {
                if let Object::Reference(r) = obj {
                    if let Ok(Object::Stream(s)) = doc.get_object(*r) {
                        content.extend_from_slice(&stream_bytes(s));
                        content.push(b' ');
                    }
                }
            }
            Ok(content)
        }
        _ => Err(Error::PdfParse("Invalid content stream".to_string())),
    }
}

/// Stream data, decompressed when a filter is present.
fn stream_bytes(stream: &lopdf::Stream) -> Vec<u8> {
    match stream.decompressed_content() {
        Ok(bytes) => bytes,
        Err(_) if is_flate(stream) => inflate_lenient(&stream.content),
        Err(_) => stream.content.clone(),
    }
}

fn is_flate(stream: &lopdf::Stream) -> bool {
    stream
        .dict
        .get(b"Filter")
        .ok()
        .and_then(|f| f.as_name().ok())
        .is_some_and(|name| name == b"FlateDecode")
}

/// Inflate a damaged zlib stream, keeping whatever decoded before the
/// first error.
fn inflate_lenient(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut decoder = ZlibDecoder::new(data);
    if let Err(e) = decoder.read_to_end(&mut out) {
        log::debug!("Truncated content stream after {} bytes: {}", out.len(), e);
    }
    if out.is_empty() {
        data.to_vec()
    } else {
        out
    }
}

/// Decode a string operand with the font's encoding.
fn decode(doc: &LopdfDocument, font: Option<&Dictionary>, bytes: &[u8]) -> String {
    match font.and_then(|f| f.get_font_encoding(doc).ok()) {
        Some(enc) => {
            LopdfDocument::decode_text(&enc, bytes).unwrap_or_else(|_| decode_text_simple(bytes))
        }
        None => decode_text_simple(bytes),
    }
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Scripts written without spaces between words (Chinese, Japanese).
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        || (0x3040..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}

/// Fallback decoding when a font has no usable encoding.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

fn get_string_from_dict(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_text_simple(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
fn parse_pdf_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let s = s.strip_prefix("D:")?;

    if s.len() < 4 {
        return None;
    }

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = s.get(6..8).and_then(|d| d.parse().ok()).unwrap_or(1);
    let hour: u32 = s.get(8..10).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|m| m.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|s| s.parse().ok()).unwrap_or(0);

    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|dt| chrono::DateTime::from_naive_utc_and_offset(dt, chrono::Utc))
}
