//! Conversion settings.

use crate::style::DEFAULT_FONT_SIZE;

/// Page size and margins, in points. Defaults to US Letter with one inch
/// margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin_top: 72.0,
            margin_right: 72.0,
            margin_bottom: 72.0,
            margin_left: 72.0,
        }
    }
}

impl PageSetup {
    pub const A4: PageSetup = PageSetup {
        width: 595.3,
        height: 841.9,
        margin_top: 72.0,
        margin_right: 72.0,
        margin_bottom: 72.0,
        margin_left: 72.0,
    };

    /// Width available between the side margins.
    pub fn text_width(&self) -> f32 {
        (self.width - self.margin_left - self.margin_right).max(0.0)
    }

    pub fn with_margins(mut self, points: f32) -> Self {
        self.margin_top = points;
        self.margin_right = points;
        self.margin_bottom = points;
        self.margin_left = points;
        self
    }
}

/// Options for [`crate::convert`].
///
/// ```
/// use docxflow::{ConvertOptions, PageSetup};
///
/// let options = ConvertOptions::new()
///     .with_stylesheet("p { text-indent: 1em }")
///     .with_base_font_size(11.0)
///     .with_page(PageSetup::A4);
/// assert_eq!(options.stylesheets.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Author CSS applied to every unit after the unit's own stylesheets.
    pub stylesheets: Vec<String>,
    /// Size of `medium` and of the root element, in points.
    pub base_font_size: f32,
    /// Images wider than this are scaled down. `None` uses the page's text
    /// width.
    pub max_image_width: Option<f32>,
    pub page: PageSetup,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            stylesheets: Vec::new(),
            base_font_size: DEFAULT_FONT_SIZE,
            max_image_width: None,
            page: PageSetup::default(),
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stylesheet(mut self, css: impl Into<String>) -> Self {
        self.stylesheets.push(css.into());
        self
    }

    pub fn with_base_font_size(mut self, points: f32) -> Self {
        self.base_font_size = points;
        self
    }

    pub fn with_max_image_width(mut self, points: f32) -> Self {
        self.max_image_width = Some(points);
        self
    }

    pub fn with_page(mut self, page: PageSetup) -> Self {
        self.page = page;
        self
    }

    /// The width images are clamped to.
    pub fn effective_max_image_width(&self) -> f32 {
        self.max_image_width.unwrap_or_else(|| self.page.text_width())
    }
}
