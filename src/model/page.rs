//! Fixed-size page types produced by layout and consumed by the PDF writer.

use serde::{Deserialize, Serialize};

/// Millimetres to points.
pub const MM: f32 = 72.0 / 25.4;

/// Page size and margins, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSetup {
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
    /// Top margin
    pub margin_top: f32,
    /// Right margin
    pub margin_right: f32,
    /// Bottom margin
    pub margin_bottom: f32,
    /// Left margin
    pub margin_left: f32,
}

impl PageSetup {
    /// A page of the given size with uniform margins.
    pub fn new(width: f32, height: f32, margin: f32) -> Self {
        Self {
            width,
            height,
            margin_top: margin,
            margin_right: margin,
            margin_bottom: margin,
            margin_left: margin,
        }
    }

    /// A4 portrait (210 x 297 mm).
    pub fn a4(margin: f32) -> Self {
        Self::new(595.28, 841.89, margin)
    }

    /// US Letter portrait (8.5 x 11 inches).
    pub fn letter(margin: f32) -> Self {
        Self::new(612.0, 792.0, margin)
    }

    /// Set all four margins.
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin_top = margin;
        self.margin_right = margin;
        self.margin_bottom = margin;
        self.margin_left = margin;
        self
    }

    /// Width available between the side margins.
    pub fn usable_width(&self) -> f32 {
        (self.width - self.margin_left - self.margin_right).max(0.0)
    }

    /// Height available between the top and bottom margins.
    pub fn usable_height(&self) -> f32 {
        (self.height - self.margin_top - self.margin_bottom).max(0.0)
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::a4(15.0 * MM)
    }
}

/// Standard PDF fonts used by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FontFace {
    /// Helvetica
    Sans,
    /// Helvetica-Bold
    SansBold,
    /// Courier
    Mono,
}

impl FontFace {
    /// All faces, in resource order.
    pub const ALL: [FontFace; 3] = [FontFace::Sans, FontFace::SansBold, FontFace::Mono];

    /// PostScript name of the standard font.
    pub fn base_font(self) -> &'static str {
        match self {
            FontFace::Sans => "Helvetica",
            FontFace::SansBold => "Helvetica-Bold",
            FontFace::Mono => "Courier",
        }
    }

    /// Name of the font in a page resource dictionary.
    pub fn resource_name(self) -> &'static str {
        match self {
            FontFace::Sans => "F1",
            FontFace::SansBold => "F2",
            FontFace::Mono => "F3",
        }
    }
}

/// A line of text placed on a page. `y` is the top of the line box,
/// measured down from the top edge of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedText {
    /// Left edge
    pub x: f32,
    /// Top of the line box
    pub y: f32,
    /// Font
    pub font: FontFace,
    /// Font size
    pub size: f32,
    /// Gray level, 0.0 = black
    pub gray: f32,
    /// Text, already restricted to the font's glyph set
    pub text: String,
}

/// A filled rectangle placed on a page (code block shading).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedFill {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
    /// Gray level
    pub gray: f32,
}

/// One drawable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PageItem {
    /// Text line
    Text(PlacedText),
    /// Background fill
    Fill(PlacedFill),
}

/// A single laid-out page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Page number (1-indexed)
    pub number: u32,

    /// Items in paint order
    pub items: Vec<PageItem>,
}

impl PageLayout {
    /// Create an empty page.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            items: Vec::new(),
        }
    }

    /// Add a text line.
    pub fn add_text(&mut self, text: PlacedText) {
        self.items.push(PageItem::Text(text));
    }

    /// Add a background fill.
    pub fn add_fill(&mut self, fill: PlacedFill) {
        self.items.push(PageItem::Fill(fill));
    }

    /// Text lines in paint order.
    pub fn lines(&self) -> impl Iterator<Item = &PlacedText> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Text(t) => Some(t),
            PageItem::Fill(_) => None,
        })
    }

    /// Text of the page, one line per placed text.
    pub fn plain_text(&self) -> String {
        self.lines()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if nothing is drawn on the page.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A paginated, fixed-page-size document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedDocument {
    /// Page geometry shared by all pages
    pub setup: PageSetup,

    /// Pages in order
    pub pages: Vec<PageLayout>,

    /// Document title for the PDF info dictionary
    pub title: Option<String>,
}

impl PagedDocument {
    /// Create an empty document.
    pub fn new(setup: PageSetup) -> Self {
        Self {
            setup,
            pages: Vec::new(),
            title: None,
        }
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append a new empty page and return it.
    pub fn push_page(&mut self) -> &mut PageLayout {
        let number = self.pages.len() as u32 + 1;
        self.pages.push(PageLayout::new(number));
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Text of all pages in order, one line per placed text.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .flat_map(|p| p.lines())
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
