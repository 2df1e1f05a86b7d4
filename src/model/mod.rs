//! Document model types.
//!
//! These are the intermediate representations that sit between the
//! source adapters and the renderers: parsed Markdown blocks, notebook
//! cells, and laid-out fixed-size pages.

mod markdown;
mod notebook;
mod page;

pub use markdown::{
    plain_text, Block, InlineSpan, ListKind, ListRun, MarkdownDocument, Node, Nodes,
};
pub use notebook::{CellKind, CellOutput, Notebook, NotebookCell};
pub use page::{
    FontFace, PageItem, PageLayout, PageSetup, PagedDocument, PlacedFill, PlacedText, MM,
};
