//! Options controlling opening, extraction, and rewriting.

/// What to do when a fragment's font name does not resolve to a
/// standard font during reinsertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontFallback {
    /// Pick the closest standard family by name (default).
    #[default]
    Substitute,
    /// Fail the insertion.
    Strict,
}

/// Options for a reword session.
///
/// Provides sensible defaults for all settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorOptions {
    /// Maximum input PDF size in bytes (default: 20 MiB).
    pub max_input_bytes: usize,
    /// Font used to redraw a fragment whose font name is empty (default: "helv").
    pub fallback_font: String,
    /// Size used when a fragment's size is zero or not finite (default: 12).
    pub fallback_size: f64,
    /// Distance in points the reinsertion baseline sits above the
    /// fragment's bottom edge (default: 1.0).
    pub baseline_nudge: f64,
    /// Handling of unresolvable font names (default: substitute).
    pub font_fallback: FontFallback,
    /// Whether to collect warnings into the apply report (default: true).
    pub collect_warnings: bool,
}

/// Default input size limit, 20 MiB.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 20 * 1024 * 1024;

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            fallback_font: "helv".to_string(),
            fallback_size: 12.0,
            baseline_nudge: 1.0,
            font_fallback: FontFallback::Substitute,
            collect_warnings: true,
        }
    }
}

impl EditorOptions {
    /// Size to draw with: `size` when usable, otherwise the fallback.
    pub fn effective_size(&self, size: f64) -> f64 {
        if size.is_finite() && size != 0.0 {
            size
        } else {
            self.fallback_size
        }
    }

    /// Font to draw with: `font` when non-empty, otherwise the fallback.
    pub fn effective_font<'a>(&'a self, font: &'a str) -> &'a str {
        if font.is_empty() {
            &self.fallback_font
        } else {
            font
        }
    }
}
