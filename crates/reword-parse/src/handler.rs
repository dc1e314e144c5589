//! Content handler callback trait for content stream interpretation.
//!
//! The interpreter reports what a page paints through [`ContentHandler`].
//! Positions in every event are already in top-left page space.

use reword_core::{BBox, Color, Point};

/// One painted glyph.
///
/// Produced for each character code shown by `Tj`, `TJ`, `'` and `"`.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphEvent {
    /// Unicode text of the glyph (may be more than one char for ligatures).
    pub text: String,
    /// Character code from the shown string.
    pub code: u32,
    /// The code's raw bytes.
    pub bytes: Vec<u8>,
    /// Glyph box from descent to ascent over the glyph width.
    pub bbox: BBox,
    /// Start of the glyph on the baseline.
    pub origin: Point,
    /// Base font name, subset prefix removed.
    pub font_name: String,
    /// Rendered size: the font size scaled by the text and current matrices.
    pub size: f64,
    /// Fill color at the time of painting.
    pub color: Color,
    /// Horizontal displacement in unscaled text space, spacing included.
    pub advance: f64,
}

impl GlyphEvent {
    /// Whether the glyph shows only whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// A painted image, inline or XObject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageEvent {
    /// The image's unit square mapped through the CTM.
    pub bbox: BBox,
}

/// Callback handler for content stream interpretation.
///
/// All methods have default no-op implementations so handlers subscribe
/// only to what they need.
pub trait ContentHandler {
    /// `BT`.
    fn on_text_begin(&mut self) {}

    /// `ET`.
    fn on_text_end(&mut self) {}

    /// A glyph was painted.
    fn on_glyph(&mut self, _event: &GlyphEvent) {}

    /// An image was painted.
    fn on_image(&mut self, _event: ImageEvent) {}
}
