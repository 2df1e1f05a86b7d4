//! Styled DOCX output.
//!
//! Builds a minimal WordprocessingML package: content types, package and
//! document relationships, the document body, styles, numbering and core
//! properties. Headings use the built-in `Heading1`..`Heading3` style ids.
//! Every ordered item shares one decimal numbering instance, so numbers
//! run on across the whole document.

use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::model::{Block, CellKind, InlineSpan, ListKind, MarkdownDocument, Node, Notebook};
use crate::parser::parse_markdown;

use super::RenderOptions;

/// Numbering instance for bullet items.
const BULLET_NUM_ID: u32 = 1;
/// Numbering instance shared by every ordered item.
const ORDERED_NUM_ID: u32 = 2;

/// Relationship ids below this are taken by styles and numbering.
const FIRST_LINK_REL: usize = 3;

const CODE_FONT: &str = "Courier New";
/// Half-points.
const CODE_SIZE: u32 = 20;
const OUTPUT_SIZE: u32 = 18;
const CODE_SHADING: &str = "F0F0F0";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="120"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="200" w:after="100"/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="26"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading3"><w:name w:val="heading 3"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="160" w:after="80"/><w:outlineLvl w:val="2"/></w:pPr><w:rPr><w:b/><w:sz w:val="24"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="ListParagraph"><w:name w:val="List Paragraph"/><w:basedOn w:val="Normal"/><w:pPr><w:ind w:left="720"/></w:pPr></w:style><w:style w:type="character" w:styleId="Hyperlink"><w:name w:val="Hyperlink"/><w:rPr><w:color w:val="0563C1"/><w:u w:val="single"/></w:rPr></w:style></w:styles>"#;

const NUMBERING: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="&#8226;"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum><w:abstractNum w:abstractNumId="1"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/><w:lvlJc w:val="start"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num><w:num w:numId="2"><w:abstractNumId w:val="1"/></w:num></w:numbering>"#;

const DOCUMENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>"#;

/// A4 portrait with one-inch margins, in twentieths of a point.
const SECTION: &str = r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr>"#;

/// Accumulates the document body and its hyperlink targets.
#[derive(Default)]
struct DocxBody {
    xml: String,
    links: Vec<String>,
}

impl DocxBody {
    fn heading(&mut self, level: u8, spans: &[InlineSpan]) {
        let style = format!("<w:pStyle w:val=\"Heading{}\"/>", level.clamp(1, 3));
        self.paragraph_with(&style, spans);
    }

    fn list_item(&mut self, kind: ListKind, spans: &[InlineSpan]) {
        let num_id = match kind {
            ListKind::Bullet => BULLET_NUM_ID,
            ListKind::Ordered => ORDERED_NUM_ID,
        };
        let props = format!(
            "<w:pStyle w:val=\"ListParagraph\"/><w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"{}\"/></w:numPr>",
            num_id
        );
        self.paragraph_with(&props, spans);
    }

    fn paragraph(&mut self, spans: &[InlineSpan]) {
        self.paragraph_with("", spans);
    }

    fn paragraph_with(&mut self, props: &str, spans: &[InlineSpan]) {
        self.xml.push_str("<w:p>");
        if !props.is_empty() {
            self.xml.push_str(&format!("<w:pPr>{}</w:pPr>", props));
        }
        for span in spans {
            self.inline(span);
        }
        self.xml.push_str("</w:p>");
    }

    fn inline(&mut self, span: &InlineSpan) {
        match span {
            InlineSpan::Text(text) => self.run("", text),
            InlineSpan::Bold(text) => self.run("<w:b/>", text),
            InlineSpan::Italic(text) => self.run("<w:i/>", text),
            InlineSpan::Code(text) => self.run(&mono_props(CODE_SIZE), text),
            InlineSpan::Link { text, href } => {
                let rel = FIRST_LINK_REL + self.links.len();
                self.links.push(href.clone());
                self.xml
                    .push_str(&format!("<w:hyperlink r:id=\"rId{}\" w:history=\"1\">", rel));
                self.run("<w:rStyle w:val=\"Hyperlink\"/>", text);
                self.xml.push_str("</w:hyperlink>");
            }
        }
    }

    fn run(&mut self, props: &str, text: &str) {
        self.xml.push_str("<w:r>");
        if !props.is_empty() {
            self.xml.push_str(&format!("<w:rPr>{}</w:rPr>", props));
        }
        self.xml.push_str(&format!(
            "<w:t xml:space=\"preserve\">{}</w:t></w:r>",
            xml_text(text)
        ));
    }

    /// One monospace paragraph per source line, shaded for code.
    fn mono_lines(&mut self, text: &str, size: u32, shaded: bool) {
        for line in text.split('\n') {
            self.xml.push_str("<w:p><w:pPr>");
            if shaded {
                self.xml.push_str(&format!(
                    "<w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"{}\"/>",
                    CODE_SHADING
                ));
            }
            self.xml.push_str("<w:spacing w:after=\"0\"/></w:pPr>");
            self.run(&mono_props(size), line);
            self.xml.push_str("</w:p>");
        }
    }

    fn spacer(&mut self) {
        self.xml.push_str("<w:p/>");
    }

    fn markdown(&mut self, doc: &MarkdownDocument) {
        for node in doc.nodes() {
            match node {
                Node::Block(Block::Heading { level, inline }) => self.heading(*level, inline),
                Node::Block(block) => self.paragraph(block.inline()),
                Node::List(run) => {
                    for item in run.items {
                        self.list_item(run.kind, item.inline());
                    }
                }
            }
        }
    }

    fn document_xml(&self) -> String {
        format!("{}{}{}</w:body></w:document>", DOCUMENT_OPEN, self.xml, SECTION)
    }

    fn document_rels(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>"#,
        );
        for (i, href) in self.links.iter().enumerate() {
            xml.push_str(&format!(
                "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink\" Target=\"{}\" TargetMode=\"External\"/>",
                FIRST_LINK_REL + i,
                xml_text(href)
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }
}

fn mono_props(size: u32) -> String {
    format!(
        "<w:rFonts w:ascii=\"{0}\" w:hAnsi=\"{0}\" w:cs=\"{0}\"/><w:sz w:val=\"{1}\"/>",
        CODE_FONT, size
    )
}

/// Escape text and drop characters XML 1.0 cannot carry.
fn xml_text(text: &str) -> String {
    let clean: String = text
        .chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}'))
        .collect();
    escape(clean.as_str()).into_owned()
}

/// DOCX renderer.
pub struct DocxRenderer {
    options: RenderOptions,
}

impl DocxRenderer {
    /// Create a new DOCX renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render Markdown.
    pub fn markdown(&self, doc: &MarkdownDocument) -> Result<Vec<u8>> {
        let mut body = DocxBody::default();
        body.markdown(doc);
        self.package(&body)
    }

    /// Render a notebook. Each cell is followed by an empty paragraph.
    pub fn notebook(&self, notebook: &Notebook) -> Result<Vec<u8>> {
        let mut body = DocxBody::default();

        for cell in &notebook.cells {
            match cell.kind {
                CellKind::Markdown => body.markdown(&parse_markdown(&cell.source)),
                CellKind::Code => {
                    body.mono_lines(cell.source.trim_end_matches('\n'), CODE_SIZE, true);
                    for text in cell.output_texts() {
                        body.mono_lines(text.trim_end_matches('\n'), OUTPUT_SIZE, false);
                    }
                }
                CellKind::Other(_) => {}
            }
            body.spacer();
        }

        self.package(&body)
    }

    fn package(&self, body: &DocxBody) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", PACKAGE_RELS.to_string()),
            ("word/document.xml", body.document_xml()),
            ("word/_rels/document.xml.rels", body.document_rels()),
            ("word/styles.xml", STYLES.to_string()),
            ("word/numbering.xml", NUMBERING.to_string()),
            ("docProps/core.xml", self.core_properties()),
        ];

        for (name, content) in parts {
            zip.start_file(name, options)?;
            zip.write_all(content.as_bytes())?;
        }

        let bytes = zip.finish()?.into_inner();
        log::debug!(
            "Wrote DOCX: {} bytes, {} hyperlink(s)",
            bytes.len(),
            body.links.len()
        );
        Ok(bytes)
    }

    fn core_properties(&self) -> String {
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        let title = self.options.title.as_deref().unwrap_or_default();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dc:creator>docshift</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified></cp:coreProperties>"#,
            xml_text(title),
            now,
            now
        )
    }
}

impl Default for DocxRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

/// Render Markdown as DOCX bytes.
pub fn markdown_to_docx(doc: &MarkdownDocument, title: &str) -> Result<Vec<u8>> {
    DocxRenderer::new(RenderOptions::new().with_title(title)).markdown(doc)
}

/// Render a notebook as DOCX bytes.
pub fn notebook_to_docx(notebook: &Notebook, title: &str) -> Result<Vec<u8>> {
    DocxRenderer::new(RenderOptions::new().with_title(title)).notebook(notebook)
}
