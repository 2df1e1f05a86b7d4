//! Rendering options and configuration.

use crate::model::{PageSetup, MM};
use crate::retry::RetryPolicy;

use super::SanitizeOptions;

/// Options for the paginated (surface-based) renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginateOptions {
    /// Width of the render surface, in CSS pixels
    pub surface_width: f32,

    /// Output page geometry, in points
    pub page: PageSetup,

    /// Scale from surface pixels to page points
    pub scale: f32,

    /// How long to wait for the surface to become ready
    pub retry: RetryPolicy,
}

impl PaginateOptions {
    /// Create options with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the surface width.
    pub fn with_surface_width(mut self, width: f32) -> Self {
        self.surface_width = width.max(1.0);
        self
    }

    /// Set the page geometry.
    pub fn with_page(mut self, page: PageSetup) -> Self {
        self.page = page;
        self
    }

    /// Set the surface-to-page scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Set the readiness policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for PaginateOptions {
    fn default() -> Self {
        Self {
            surface_width: 880.0,
            page: PageSetup::a4(40.0),
            scale: 0.7,
            retry: RetryPolicy::default(),
        }
    }
}

/// Options for the plain-text flow renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFlowOptions {
    /// Page geometry
    pub page: PageSetup,

    /// Font size in points
    pub font_size: f32,

    /// Line height as a multiple of the font size
    pub line_height: f32,
}

impl TextFlowOptions {
    /// Create options with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size.max(1.0);
        self
    }

    /// Set the line height factor.
    pub fn with_line_height(mut self, factor: f32) -> Self {
        self.line_height = factor.max(1.0);
        self
    }

    /// Set the page geometry.
    pub fn with_page(mut self, page: PageSetup) -> Self {
        self.page = page;
        self
    }

    /// Distance between two baselines, in points.
    pub fn line_advance(&self) -> f32 {
        self.font_size * self.line_height
    }
}

impl Default for TextFlowOptions {
    fn default() -> Self {
        Self {
            page: PageSetup::a4(15.0 * MM),
            font_size: 16.0,
            line_height: 1.15,
        }
    }
}

/// Options shared by all renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Document title (HTML `<title>`, PDF info, DOCX core properties)
    pub title: Option<String>,

    /// Paginated renderer settings
    pub paginate: PaginateOptions,

    /// Text flow renderer settings
    pub text_flow: TextFlowOptions,

    /// Glyph sanitization for PDF output
    pub sanitize: SanitizeOptions,

    /// Embed the structural stylesheet in HTML documents
    pub embed_styles: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the paginated renderer settings.
    pub fn with_paginate(mut self, paginate: PaginateOptions) -> Self {
        self.paginate = paginate;
        self
    }

    /// Set the text flow settings.
    pub fn with_text_flow(mut self, text_flow: TextFlowOptions) -> Self {
        self.text_flow = text_flow;
        self
    }

    /// Set sanitization options.
    pub fn with_sanitize(mut self, sanitize: SanitizeOptions) -> Self {
        self.sanitize = sanitize;
        self
    }

    /// Enable or disable the embedded stylesheet.
    pub fn with_styles(mut self, embed: bool) -> Self {
        self.embed_styles = embed;
        self
    }

    /// The title, or a fallback.
    pub fn title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(fallback)
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: None,
            paginate: PaginateOptions::default(),
            text_flow: TextFlowOptions::default(),
            sanitize: SanitizeOptions::default(),
            embed_styles: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_title("Report")
            .with_styles(false)
            .with_paginate(PaginateOptions::new().with_scale(0.5));

        assert_eq!(options.title_or("x"), "Report");
        assert!(!options.embed_styles);
        assert_eq!(options.paginate.scale, 0.5);
        assert_eq!(options.paginate.surface_width, 880.0);
    }

    #[test]
    fn test_text_flow_defaults() {
        let flow = TextFlowOptions::default();
        assert_eq!(flow.font_size, 16.0);
        assert!((flow.line_advance() - 18.4).abs() < 0.001);
        assert!((flow.page.margin_top - 42.52).abs() < 0.01);
    }

    #[test]
    fn test_clamping() {
        let flow = TextFlowOptions::new().with_font_size(0.0).with_line_height(0.2);
        assert_eq!(flow.font_size, 1.0);
        assert_eq!(flow.line_height, 1.0);
        let paginate = PaginateOptions::new().with_surface_width(0.0);
        assert_eq!(paginate.surface_width, 1.0);
    }
}
