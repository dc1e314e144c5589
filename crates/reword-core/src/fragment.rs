//! The editable text model: fragments grouped by page.

use serde::{Deserialize, Serialize};

use crate::geometry::{BBox, optional_bbox, serialize_number};

/// One contiguous run of text with uniform styling on a page.
///
/// A fragment's identity is its zero-based position within its page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// The run's text, possibly empty.
    #[serde(default)]
    pub text: String,
    /// Bounding box in top-left origin page space, `None` when unknown.
    #[serde(default, with = "optional_bbox")]
    pub bbox: Option<BBox>,
    /// Base font name without a subset prefix. Empty when unknown.
    #[serde(default)]
    pub font: String,
    /// Font size in points.
    #[serde(default, serialize_with = "serialize_number")]
    pub size: f64,
    /// Fill color packed as `0xRRGGBB`.
    #[serde(default)]
    pub color: u32,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, bbox: Option<BBox>) -> Self {
        Self {
            text: text.into(),
            bbox,
            ..Self::default()
        }
    }

    /// Set the font name and size.
    pub fn with_font(mut self, font: impl Into<String>, size: f64) -> Self {
        self.font = font.into();
        self.size = size;
        self
    }

    /// Set the packed fill color.
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }
}

/// Per-page ordered fragment lists for a whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragmentModel {
    #[serde(default)]
    pages: Vec<Vec<TextFragment>>,
}

impl FragmentModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page.
    pub fn push_page(&mut self, fragments: Vec<TextFragment>) {
        self.pages.push(fragments);
    }

    /// Append a fragment to the last page, opening a page if there is none.
    pub fn push_fragment(&mut self, fragment: TextFragment) {
        match self.pages.last_mut() {
            Some(page) => page.push(fragment),
            None => self.pages.push(vec![fragment]),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Fragments for page `index`, if the page exists.
    pub fn page(&self, index: usize) -> Option<&[TextFragment]> {
        self.pages.get(index).map(Vec::as_slice)
    }

    pub fn pages(&self) -> &[Vec<TextFragment>] {
        &self.pages
    }

    /// Total number of fragments across all pages.
    pub fn fragment_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    pub fn into_pages(self) -> Vec<Vec<TextFragment>> {
        self.pages
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl From<Vec<Vec<TextFragment>>> for FragmentModel {
    fn from(pages: Vec<Vec<TextFragment>>) -> Self {
        Self { pages }
    }
}
