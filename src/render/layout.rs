//! Text layout: line wrapping, the plain-text flow, and the measured
//! render surface used by the paginated renderer.

use crate::model::{
    plain_text, Block, CellKind, FontFace, ListKind, MarkdownDocument, Node, Notebook,
    PagedDocument, PlacedText,
};
use crate::parser::parse_markdown;

use super::metrics::text_width;
use super::options::{PaginateOptions, TextFlowOptions};
use super::paginate::{RenderSurface, SurfaceLine, SurfaceShade, SurfaceState};
use super::sanitize::{GlyphSanitizer, SanitizeOptions};

const TAB: &str = "    ";

/// Break one line of text into lines no wider than `max_width`.
///
/// Words are split on single spaces so leading indentation survives on
/// the first line. A word wider than the line is broken between
/// characters. An empty input yields one empty line.
pub fn wrap_line(text: &str, font: FontFace, size: f32, max_width: f32) -> Vec<String> {
    let text = text.replace('\t', TAB);
    let mut lines = Vec::new();
    let mut current: Option<String> = None;

    for word in text.split(' ') {
        let candidate = match &current {
            Some(line) => format!("{} {}", line, word),
            None => word.to_string(),
        };

        if text_width(font, size, &candidate) <= max_width {
            current = Some(candidate);
            continue;
        }

        let rest = match current.take() {
            Some(line) if !line.trim().is_empty() => {
                lines.push(line);
                word.to_string()
            }
            _ => candidate,
        };
        current = Some(break_word(&rest, font, size, max_width, &mut lines));
    }

    lines.push(current.unwrap_or_default());
    lines
}

/// Push full-width pieces of `word` and return the remainder.
fn break_word(
    word: &str,
    font: FontFace,
    size: f32,
    max_width: f32,
    lines: &mut Vec<String>,
) -> String {
    let mut piece = String::new();

    for c in word.chars() {
        piece.push(c);
        if piece.chars().count() > 1 && text_width(font, size, &piece) > max_width {
            piece.pop();
            lines.push(std::mem::take(&mut piece));
            piece.push(c);
        }
    }

    piece
}

/// Wrap every line of a multi-line text.
pub fn wrap_text(text: &str, font: FontFace, size: f32, max_width: f32) -> Vec<String> {
    text.split('\n')
        .flat_map(|line| wrap_line(line, font, size, max_width))
        .collect()
}

/// Plain-text flow onto fixed-size pages.
///
/// Text is sanitized, wrapped to the usable width and placed line by
/// line. A new page starts whenever the next line would cross the bottom
/// margin. Empty lines take up space but draw nothing.
pub struct TextFlow {
    options: TextFlowOptions,
    sanitizer: GlyphSanitizer,
}

impl TextFlow {
    /// Create a text flow.
    pub fn new(options: TextFlowOptions, sanitize: SanitizeOptions) -> Self {
        Self {
            options,
            sanitizer: GlyphSanitizer::new(sanitize),
        }
    }

    /// Lay out text. The result always has at least one page.
    pub fn layout(&self, text: &str) -> PagedDocument {
        let setup = self.options.page;
        let size = self.options.font_size;
        let advance = self.options.line_advance();
        let bottom = setup.height - setup.margin_bottom;

        let clean = self.sanitizer.sanitize(text);
        let lines = wrap_text(&clean, FontFace::Sans, size, setup.usable_width());

        let mut doc = PagedDocument::new(setup);
        doc.push_page();
        let mut cursor = setup.margin_top;

        for line in lines {
            if cursor + advance > bottom {
                doc.push_page();
                cursor = setup.margin_top;
            }

            if !line.trim().is_empty() {
                if let Some(page) = doc.pages.last_mut() {
                    page.add_text(PlacedText {
                        x: setup.margin_left,
                        y: cursor,
                        font: FontFace::Sans,
                        size,
                        gray: 0.0,
                        text: line,
                    });
                }
            }
            cursor += advance;
        }

        log::debug!("Text flow produced {} page(s)", doc.page_count());
        doc
    }
}

impl Default for TextFlow {
    fn default() -> Self {
        Self::new(TextFlowOptions::default(), SanitizeOptions::default())
    }
}

/// Visual role of a flow block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStyle {
    /// Heading, level 1-3
    Heading(u8),
    /// Body text
    Paragraph,
    /// List item, already carrying its marker
    ListItem,
    /// Code cell source
    Code,
    /// Code cell output
    Output,
    /// Vertical gap between notebook cells
    Spacer,
}

/// A unit of content for the render surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowBlock {
    /// Visual role
    pub style: FlowStyle,
    /// Text, may contain newlines for code and outputs
    pub text: String,
}

impl FlowBlock {
    /// Create a block.
    pub fn new(style: FlowStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

/// Flatten parsed Markdown into flow blocks. Inline styling is dropped.
pub fn markdown_flow(doc: &MarkdownDocument) -> Vec<FlowBlock> {
    let mut blocks = Vec::new();

    for node in doc.nodes() {
        match node {
            Node::Block(Block::Heading { level, inline }) => {
                blocks.push(FlowBlock::new(
                    FlowStyle::Heading(*level),
                    plain_text(inline),
                ));
            }
            Node::Block(block) => {
                blocks.push(FlowBlock::new(FlowStyle::Paragraph, block.plain_text()));
            }
            Node::List(run) => {
                for (i, item) in run.items.iter().enumerate() {
                    let marker = match run.kind {
                        ListKind::Bullet => "-".to_string(),
                        ListKind::Ordered => format!("{}.", i + 1),
                    };
                    blocks.push(FlowBlock::new(
                        FlowStyle::ListItem,
                        format!("{} {}", marker, item.plain_text()),
                    ));
                }
            }
        }
    }

    blocks
}

/// Flatten a notebook into flow blocks, one spacer after every cell.
pub fn notebook_flow(notebook: &Notebook) -> Vec<FlowBlock> {
    let mut blocks = Vec::new();

    for cell in &notebook.cells {
        match cell.kind {
            CellKind::Markdown => blocks.extend(markdown_flow(&parse_markdown(&cell.source))),
            CellKind::Code => {
                blocks.push(FlowBlock::new(FlowStyle::Code, cell.source.trim_end()));
                for text in cell.output_texts() {
                    blocks.push(FlowBlock::new(FlowStyle::Output, text.trim_end_matches('\n')));
                }
            }
            CellKind::Other(_) => continue,
        }
        blocks.push(FlowBlock::new(FlowStyle::Spacer, ""));
    }

    blocks
}

/// How the lines of one flow style are drawn. Lengths are in px.
struct LineStyle {
    font: FontFace,
    size: f32,
    line_height: f32,
    gray: f32,
    indent: f32,
    shade: Option<f32>,
    gap_before: f32,
}

fn line_style(style: FlowStyle) -> LineStyle {
    let body = LineStyle {
        font: FontFace::Sans,
        size: 14.0,
        line_height: 1.5,
        gray: 0.0,
        indent: 0.0,
        shade: None,
        gap_before: 6.0,
    };

    match style {
        FlowStyle::Heading(level) => LineStyle {
            font: FontFace::SansBold,
            size: match level {
                1 => 24.0,
                2 => 20.0,
                _ => 16.0,
            },
            line_height: 1.3,
            gap_before: 14.0,
            ..body
        },
        FlowStyle::Paragraph => body,
        FlowStyle::ListItem => LineStyle {
            indent: 20.0,
            gap_before: 2.0,
            ..body
        },
        FlowStyle::Code => LineStyle {
            font: FontFace::Mono,
            size: 13.0,
            line_height: 1.4,
            indent: 8.0,
            shade: Some(0.94),
            gap_before: 8.0,
            ..body
        },
        FlowStyle::Output => LineStyle {
            font: FontFace::Mono,
            size: 12.0,
            line_height: 1.4,
            gray: 0.3,
            indent: 8.0,
            gap_before: 4.0,
            ..body
        },
        FlowStyle::Spacer => LineStyle {
            gap_before: 12.0,
            ..body
        },
    }
}

/// Horizontal and vertical padding of the surface, in px.
const SURFACE_PADDING: f32 = 20.0;

/// A render surface that measures flow blocks at a fixed width.
///
/// The first poll places every block, whatever the document size; the
/// surface reports ready once nothing is pending.
pub struct LayoutSurface {
    pending: std::vec::IntoIter<FlowBlock>,
    lines: Vec<SurfaceLine>,
    sanitizer: GlyphSanitizer,
    width: f32,
    placed_any: bool,
}

impl LayoutSurface {
    /// Create a surface for the given blocks.
    pub fn new(blocks: Vec<FlowBlock>, options: &PaginateOptions, sanitize: SanitizeOptions) -> Self {
        Self {
            pending: blocks.into_iter(),
            lines: Vec::new(),
            sanitizer: GlyphSanitizer::new(sanitize),
            width: options.surface_width,
            placed_any: false,
        }
    }

    /// Width available to text, in px.
    pub fn content_width(&self) -> f32 {
        (self.width - 2.0 * SURFACE_PADDING).max(1.0)
    }

    fn place(&mut self, block: FlowBlock) {
        let style = line_style(block.style);
        let content_width = self.content_width();

        if self.placed_any && style.gap_before > 0.0 {
            self.lines.push(SurfaceLine::gap(style.gap_before));
        }
        self.placed_any = true;

        if block.style == FlowStyle::Spacer {
            return;
        }

        let text = self.sanitizer.sanitize(&block.text);
        let max_width = (content_width - style.indent * 2.0).max(1.0);

        for line in wrap_text(&text, style.font, style.size, max_width) {
            self.lines.push(SurfaceLine {
                text: line,
                font: style.font,
                size: style.size,
                gray: style.gray,
                indent: SURFACE_PADDING + style.indent,
                height: style.size * style.line_height,
                shade: style.shade.map(|gray| SurfaceShade {
                    x: SURFACE_PADDING,
                    width: content_width,
                    gray,
                }),
            });
        }
    }

    fn content_height(&self) -> f32 {
        2.0 * SURFACE_PADDING + self.lines.iter().map(|l| l.height).sum::<f32>()
    }
}

impl RenderSurface for LayoutSurface {
    fn poll(&mut self) -> SurfaceState {
        for block in std::mem::take(&mut self.pending) {
            self.place(block);
        }

        SurfaceState {
            ready: self.pending.len() == 0,
            content_height: self.content_height(),
        }
    }

    fn lines(&self) -> &[SurfaceLine] {
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellOutput, NotebookCell};

    #[test]
    fn test_wrap_fits() {
        assert_eq!(wrap_line("a b c", FontFace::Mono, 10.0, 100.0), vec!["a b c"]);
        assert_eq!(wrap_line("", FontFace::Mono, 10.0, 100.0), vec![""]);
    }

    #[test]
    fn test_wrap_breaks_on_spaces() {
        // Courier 10pt: 6pt per char, 30pt = 5 chars
        let lines = wrap_line("aaa bbb ccc", FontFace::Mono, 10.0, 30.0);
        assert_eq!(lines, vec!["aaa", "bbb", "ccc"]);
    }

    #[test]
    fn test_wrap_long_word() {
        let lines = wrap_line("abcdefghijkl", FontFace::Mono, 10.0, 30.0);
        assert_eq!(lines, vec!["abcde", "fghij", "kl"]);
    }

    #[test]
    fn test_wrap_keeps_indent_and_expands_tabs() {
        let lines = wrap_line("\tx = 1", FontFace::Mono, 10.0, 600.0);
        assert_eq!(lines, vec!["    x = 1"]);
    }

    #[test]
    fn test_text_flow_single_page() {
        let doc = TextFlow::default().layout("Hello\n\nWorld");
        assert_eq!(doc.page_count(), 1);
        let lines: Vec<_> = doc.pages[0].lines().map(|l| l.text.as_str()).collect();
        assert_eq!(lines, vec!["Hello", "World"]);
        let first = doc.pages[0].lines().next().unwrap();
        assert_eq!(first.size, 16.0);
    }

    #[test]
    fn test_text_flow_paginates() {
        let text = (1..=100).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        let doc = TextFlow::default().layout(&text);

        // (841.89 - 2 * 42.52) / 18.4 = 41 lines per page
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.pages[0].lines().count(), 41);
        assert_eq!(doc.plain_text(), text);

        let bottom = doc.setup.height - doc.setup.margin_bottom;
        for page in &doc.pages {
            for line in page.lines() {
                assert!(line.y + 18.4 <= bottom + 0.01);
            }
        }
    }

    #[test]
    fn test_text_flow_sanitizes() {
        let doc = TextFlow::default().layout("\u{201C}quoted\u{201D}");
        assert_eq!(doc.plain_text(), "\"quoted\"");
    }

    #[test]
    fn test_empty_text_flow_has_one_page() {
        let doc = TextFlow::default().layout("");
        assert_eq!(doc.page_count(), 1);
        assert!(doc.pages[0].is_empty());
    }

    #[test]
    fn test_markdown_flow_numbers_runs() {
        let doc = parse_markdown("# T\n1. a\n2. b\n\n1. c\n- d");
        let texts: Vec<_> = markdown_flow(&doc).into_iter().map(|b| b.text).collect();
        assert_eq!(texts, vec!["T", "1. a", "2. b", "1. c", "- d"]);
    }

    #[test]
    fn test_notebook_flow() {
        let mut nb = Notebook::new("python");
        nb.add_cell(NotebookCell::markdown("# Title"));
        nb.add_cell(NotebookCell::code("print(1)\n").with_output(CellOutput::stream("1\n")));
        nb.add_cell(NotebookCell {
            kind: CellKind::Other("raw".to_string()),
            source: "ignored".to_string(),
            outputs: Vec::new(),
        });

        let styles: Vec<_> = notebook_flow(&nb).into_iter().map(|b| b.style).collect();
        assert_eq!(
            styles,
            vec![
                FlowStyle::Heading(1),
                FlowStyle::Spacer,
                FlowStyle::Code,
                FlowStyle::Output,
                FlowStyle::Spacer,
            ]
        );
    }

    #[test]
    fn test_surface_ready_on_first_poll() {
        let blocks = (0..10_000)
            .map(|i| FlowBlock::new(FlowStyle::Paragraph, format!("p{}", i)))
            .collect();
        let mut surface =
            LayoutSurface::new(blocks, &PaginateOptions::new(), SanitizeOptions::default());

        let state = surface.poll();
        assert!(state.ready);
        assert!(state.content_height > 1.0);
        assert!(surface.visible_text().starts_with("p0\np1\np2\n"));
        assert!(surface.visible_text().ends_with("p9999"));

        // Later polls are stable
        assert_eq!(surface.poll(), state);
    }
}
