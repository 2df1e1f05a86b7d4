//! Source parsing: Markdown blocks and inline spans, and notebook JSON.

mod block;
mod inline;
mod notebook;

pub use block::{parse_markdown, BlockParser};
pub use inline::{format_inline, InlineFormatter};
pub use notebook::{parse_notebook, parse_notebook_bytes};
