//! Rendering module for converting parsed documents to output formats.
//!
//! HTML and DOCX are produced directly from the document model. PDF goes
//! through a layout step first: either the text flow (plain text) or a
//! render surface that the paginator slices into pages.

mod docx;
mod html;
mod layout;
mod metrics;
mod options;
mod paginate;
mod pdf;
mod sanitize;
mod text;

pub use docx::{markdown_to_docx, notebook_to_docx, DocxRenderer};
pub use html::{
    escape_html, markdown_to_html_document, markdown_to_html_fragment, notebook_to_html,
    HtmlRenderer,
};
pub use layout::{
    markdown_flow, notebook_flow, wrap_line, wrap_text, FlowBlock, FlowStyle, LayoutSurface,
    TextFlow,
};
pub use metrics::{char_width, text_width};
pub use options::{PaginateOptions, RenderOptions, TextFlowOptions};
pub use paginate::{Paginator, RenderSurface, SurfaceLine, SurfaceShade, SurfaceState};
pub use pdf::{to_pdf, PdfWriter};
pub use sanitize::{sanitize_glyphs, GlyphSanitizer, SanitizeOptions};
pub use text::{markdown_to_text, notebook_to_text};

use crate::error::Result;
use crate::model::{MarkdownDocument, Notebook, PagedDocument};

/// Lay out a notebook on a surface and paginate it.
pub fn paginate_notebook(notebook: &Notebook, options: &RenderOptions) -> Result<PagedDocument> {
    paginate_blocks(notebook_flow(notebook), options)
}

/// Lay out Markdown on a surface and paginate it.
pub fn paginate_markdown(doc: &MarkdownDocument, options: &RenderOptions) -> Result<PagedDocument> {
    paginate_blocks(markdown_flow(doc), options)
}

fn paginate_blocks(blocks: Vec<FlowBlock>, options: &RenderOptions) -> Result<PagedDocument> {
    let surface = LayoutSurface::new(blocks, &options.paginate, options.sanitize.clone());
    let mut doc = Paginator::new(options.paginate.clone()).paginate(surface)?;
    doc.title = options.title.clone();
    Ok(doc)
}

/// Flow plain text onto pages.
pub fn flow_text(text: &str, options: &RenderOptions) -> PagedDocument {
    let mut doc = TextFlow::new(options.text_flow.clone(), options.sanitize.clone()).layout(text);
    doc.title = options.title.clone();
    doc
}
