//! PDF output using lopdf.
//!
//! Writes a [`PagedDocument`] with the standard Type1 fonts in
//! WinAnsiEncoding. Page items use a top-left origin; they are flipped
//! into PDF user space here.

use lopdf::content::{Content, Operation};
use lopdf::{
    dictionary, Dictionary, Document as LopdfDocument, Object, ObjectId, Stream, StringFormat,
};

use crate::error::{Error, Result};
use crate::model::{FontFace, PageItem, PageLayout, PagedDocument};

/// Baseline position within the font size, measured from the top.
const ASCENT: f32 = 0.8;

/// Writes paged documents as PDF.
#[derive(Debug, Clone)]
pub struct PdfWriter {
    producer: String,
    compress: bool,
}

impl PdfWriter {
    /// Create a writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable stream compression.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Serialize a document to PDF bytes.
    pub fn write(&self, doc: &PagedDocument) -> Result<Vec<u8>> {
        let mut pdf = LopdfDocument::with_version("1.5");
        let pages_id = pdf.new_object_id();

        let mut fonts = Dictionary::new();
        for face in FontFace::ALL {
            let font_id = pdf.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => face.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(face.resource_name(), font_id);
        }
        let resources_id = pdf.add_object(dictionary! {
            "Font" => fonts,
        });

        let setup = doc.setup;
        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            Object::Real(setup.width),
            Object::Real(setup.height),
        ];

        let mut kids: Vec<Object> = Vec::with_capacity(doc.pages.len());
        for page in &doc.pages {
            let content = page_content(page, setup.height);
            let content_id = pdf.add_object(Stream::new(
                dictionary! {},
                content.encode().map_err(|e| Error::Render(e.to_string()))?,
            ));
            let page_id = pdf.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => media_box.clone(),
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        pdf.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => media_box,
            }),
        );

        let catalog_id = pdf.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        pdf.trailer.set("Root", catalog_id);

        let info_id = self.info_dictionary(&mut pdf, doc.title.as_deref());
        pdf.trailer.set("Info", info_id);

        if self.compress {
            pdf.compress();
        }

        let mut out = Vec::new();
        pdf.save_to(&mut out)?;
        log::debug!("Wrote PDF: {} page(s), {} bytes", doc.page_count(), out.len());
        Ok(out)
    }

    fn info_dictionary(&self, pdf: &mut LopdfDocument, title: Option<&str>) -> ObjectId {
        let created = chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
        let mut info = dictionary! {
            "Producer" => Object::string_literal(self.producer.as_str()),
            "CreationDate" => Object::string_literal(created),
        };
        if let Some(title) = title {
            info.set("Title", Object::String(encode_win_ansi(title), StringFormat::Literal));
        }
        pdf.add_object(info)
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self {
            producer: format!("docshift {}", crate::VERSION),
            compress: true,
        }
    }
}

/// Serialize a paged document with the default writer.
pub fn to_pdf(doc: &PagedDocument) -> Result<Vec<u8>> {
    PdfWriter::new().write(doc)
}

fn page_content(page: &PageLayout, page_height: f32) -> Content {
    let mut operations = Vec::new();

    for item in &page.items {
        match item {
            PageItem::Fill(fill) => {
                operations.push(Operation::new("q", vec![]));
                operations.push(Operation::new("g", vec![Object::Real(fill.gray)]));
                operations.push(Operation::new(
                    "re",
                    vec![
                        Object::Real(fill.x),
                        Object::Real(page_height - fill.y - fill.height),
                        Object::Real(fill.width),
                        Object::Real(fill.height),
                    ],
                ));
                operations.push(Operation::new("f", vec![]));
                operations.push(Operation::new("Q", vec![]));
            }
            PageItem::Text(text) => {
                let baseline = page_height - text.y - text.size * ASCENT;
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("g", vec![Object::Real(text.gray)]));
                operations.push(Operation::new(
                    "Tf",
                    vec![text.font.resource_name().into(), Object::Real(text.size)],
                ));
                operations.push(Operation::new(
                    "Td",
                    vec![Object::Real(text.x), Object::Real(baseline)],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(&text.text), StringFormat::Literal)],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
        }
    }

    Content { operations }
}

/// Encode text for WinAnsiEncoding. Characters outside Latin-1 become '?'.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            _ => b'?',
        })
        .collect()
}
