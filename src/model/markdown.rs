//! Block and inline types produced by the Markdown parser.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// One styled run of text within a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum InlineSpan {
    /// Unstyled text
    Text(String),
    /// Strong emphasis
    Bold(String),
    /// Emphasis
    Italic(String),
    /// Inline code (monospace)
    Code(String),
    /// Hyperlink
    Link {
        /// Link text
        text: String,
        /// Link target, passed through verbatim
        href: String,
    },
}

impl InlineSpan {
    /// The visible text of this span.
    pub fn text(&self) -> &str {
        match self {
            InlineSpan::Text(t)
            | InlineSpan::Bold(t)
            | InlineSpan::Italic(t)
            | InlineSpan::Code(t) => t,
            InlineSpan::Link { text, .. } => text,
        }
    }
}

/// Concatenate the visible text of a span sequence.
pub fn plain_text(spans: &[InlineSpan]) -> String {
    spans.iter().map(InlineSpan::text).collect()
}

/// Kind of list an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    /// `-` or `*` markers
    Bullet,
    /// `1.` style markers
    Ordered,
}

/// One structural unit of parsed Markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Heading, level 1 to 3
    Heading {
        /// Heading level (1-3)
        level: u8,
        /// Inline content
        inline: Vec<InlineSpan>,
    },
    /// Item of a bullet or ordered list
    ListItem {
        /// List kind
        kind: ListKind,
        /// Inline content
        inline: Vec<InlineSpan>,
    },
    /// Plain paragraph
    Paragraph {
        /// Inline content
        inline: Vec<InlineSpan>,
    },
}

impl Block {
    /// Inline content of the block.
    pub fn inline(&self) -> &[InlineSpan] {
        match self {
            Block::Heading { inline, .. }
            | Block::ListItem { inline, .. }
            | Block::Paragraph { inline } => inline,
        }
    }

    /// Visible text of the block.
    pub fn plain_text(&self) -> String {
        plain_text(self.inline())
    }
}

/// Parsed Markdown: blocks in document order plus the list runs the
/// parser closed while reading them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownDocument {
    /// Blocks in document order
    pub blocks: Vec<Block>,

    /// Index ranges into `blocks`, one per list run, in order
    pub list_runs: Vec<Range<usize>>,
}

impl MarkdownDocument {
    /// Check if nothing was parsed.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate blocks with list items grouped into their runs.
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes {
            doc: self,
            index: 0,
            run: 0,
        }
    }

    /// Visible text, one block per line.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A maximal sequence of consecutive same-kind list items.
#[derive(Debug, Clone, Copy)]
pub struct ListRun<'a> {
    /// Kind shared by every item
    pub kind: ListKind,
    /// The items, each a `Block::ListItem`
    pub items: &'a [Block],
}

/// A top-level rendering unit.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// A heading or paragraph
    Block(&'a Block),
    /// A list run
    List(ListRun<'a>),
}

/// Iterator returned by [`MarkdownDocument::nodes`].
pub struct Nodes<'a> {
    doc: &'a MarkdownDocument,
    index: usize,
    run: usize,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.doc.blocks.get(self.index)?;

        // Skip runs that start behind the cursor
        while let Some(range) = self.doc.list_runs.get(self.run) {
            if range.start >= self.index {
                break;
            }
            self.run += 1;
        }

        if let Some(range) = self.doc.list_runs.get(self.run) {
            if range.start == self.index {
                self.run += 1;
                // Runs that overrun the blocks fall back to single blocks
                let items = self.doc.blocks.get(range.clone()).filter(|i| !i.is_empty());
                if let Some(items) = items {
                    self.index = range.end;
                    let kind = match block {
                        Block::ListItem { kind, .. } => *kind,
                        _ => ListKind::Bullet,
                    };
                    return Some(Node::List(ListRun { kind, items }));
                }
            }
        }

        self.index += 1;
        Some(Node::Block(block))
    }
}
