//! Paginated rendering.
//!
//! Content is first laid out on a [`RenderSurface`] at a fixed width. The
//! paginator waits for the surface to finish, then slices its lines into
//! fixed-size pages. Lines are never split across pages, so reading the
//! pages in order gives back the surface text exactly.

use crate::error::{Error, Result};
use crate::model::{FontFace, PagedDocument, PlacedFill, PlacedText};
use crate::retry::{poll_until, PollOutcome};

use super::options::PaginateOptions;

/// Snapshot of a surface's layout progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceState {
    /// All content has been laid out
    pub ready: bool,
    /// Total height of the laid-out content, in px
    pub content_height: f32,
}

/// Background shading behind a surface line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceShade {
    /// Left edge, in px
    pub x: f32,
    /// Width, in px
    pub width: f32,
    /// Gray level
    pub gray: f32,
}

/// One measured line on a surface. Lengths are in px.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceLine {
    /// Text; empty for pure vertical space
    pub text: String,
    /// Font
    pub font: FontFace,
    /// Font size
    pub size: f32,
    /// Gray level of the text
    pub gray: f32,
    /// Left offset of the text
    pub indent: f32,
    /// Height of the line box
    pub height: f32,
    /// Optional shading behind the line
    pub shade: Option<SurfaceShade>,
}

impl SurfaceLine {
    /// Blank vertical space.
    pub fn gap(height: f32) -> Self {
        Self {
            text: String::new(),
            font: FontFace::Sans,
            size: 0.0,
            gray: 0.0,
            indent: 0.0,
            height,
            shade: None,
        }
    }

    /// Check if the line draws text.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// A fixed-width rendering of content that becomes measurable over time.
pub trait RenderSurface {
    /// Advance layout and report progress.
    fn poll(&mut self) -> SurfaceState;

    /// Lines laid out so far, top to bottom.
    fn lines(&self) -> &[SurfaceLine];

    /// Visible text, one line per text-bearing surface line.
    fn visible_text(&self) -> String {
        self.lines()
            .iter()
            .filter(|l| l.has_text())
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Slices a ready surface into pages.
pub struct Paginator {
    options: PaginateOptions,
}

impl Paginator {
    /// Create a paginator.
    pub fn new(options: PaginateOptions) -> Self {
        Self { options }
    }

    /// Wait for the surface, then paginate it.
    ///
    /// The surface is consumed and dropped on every return path.
    pub fn paginate<S: RenderSurface>(&self, mut surface: S) -> Result<PagedDocument> {
        let outcome = poll_until(&self.options.retry, |_| {
            let state = surface.poll();
            (state.ready && state.content_height > 1.0).then_some(state)
        });

        let state = match outcome {
            PollOutcome::Ready(state) => state,
            PollOutcome::TimedOut { attempts } => {
                log::warn!("Surface not ready after {} checks", attempts);
                return Err(Error::RenderTimeout { attempts });
            }
        };

        if surface.visible_text().trim().is_empty() {
            return Err(Error::EmptyRenderedContent);
        }

        log::debug!(
            "Paginating surface: {:.0}px tall, {} lines",
            state.content_height,
            surface.lines().len()
        );

        Ok(self.slice(surface.lines()))
    }

    /// Place lines onto pages without splitting any line.
    pub fn slice(&self, lines: &[SurfaceLine]) -> PagedDocument {
        let setup = self.options.page;
        let scale = self.options.scale;
        let page_height = setup.usable_height() / scale;

        let mut doc = PagedDocument::new(setup);
        doc.push_page();
        let mut cursor = 0.0f32;
        let mut page_has_text = false;

        for line in lines {
            // A gap at the top of a page is dropped.
            if !line.has_text() && !page_has_text {
                continue;
            }

            if cursor + line.height > page_height && page_has_text {
                doc.push_page();
                cursor = 0.0;
                page_has_text = false;
                if !line.has_text() {
                    continue;
                }
            }

            let Some(page) = doc.pages.last_mut() else {
                break;
            };
            let top = setup.margin_top + cursor * scale;

            if let Some(shade) = line.shade {
                page.add_fill(PlacedFill {
                    x: setup.margin_left + shade.x * scale,
                    y: top,
                    width: shade.width * scale,
                    height: line.height * scale,
                    gray: shade.gray,
                });
            }

            if line.has_text() {
                page.add_text(PlacedText {
                    x: setup.margin_left + line.indent * scale,
                    y: top + (line.height - line.size) / 2.0 * scale,
                    font: line.font,
                    size: line.size * scale,
                    gray: line.gray,
                    text: line.text.clone(),
                });
                page_has_text = true;
            }

            cursor += line.height;
        }

        doc
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PaginateOptions::default())
    }
}
