//! Structured page text: blocks of lines of styled spans.
//!
//! This is the shape a backend reports for one page. [`TextPage::fragments`]
//! flattens it into the fragment list that both extraction and rewriting
//! index into, so the two always agree on fragment identity.

use crate::fragment::TextFragment;
use crate::geometry::BBox;

/// A run of glyphs sharing font, size, and fill color on one line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Span {
    pub text: String,
    pub bbox: Option<BBox>,
    /// Base font name, subset prefix removed.
    pub font: String,
    pub size: f64,
    /// Packed `0xRRGGBB` fill color.
    pub color: u32,
}

/// Spans sharing a baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub bbox: BBox,
    pub spans: Vec<Span>,
}

/// A text object's lines.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub bbox: BBox,
    pub lines: Vec<Line>,
}

/// A painted image. Carries no text.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlock {
    pub bbox: BBox,
}

/// One block in content order.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(TextBlock),
    Image(ImageBlock),
}

impl Block {
    pub fn bbox(&self) -> BBox {
        match self {
            Block::Text(t) => t.bbox,
            Block::Image(i) => i.bbox,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Block::Text(_))
    }
}

/// Structured text for one page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextPage {
    pub blocks: Vec<Block>,
}

impl TextPage {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Flatten into fragments: one per span, block → line → span order,
    /// image blocks skipped.
    pub fn fragments(&self) -> Vec<TextFragment> {
        self.spans()
            .map(|span| TextFragment {
                text: span.text.clone(),
                bbox: span.bbox,
                font: span.font.clone(),
                size: span.size,
                color: span.color,
            })
            .collect()
    }

    /// Iterate spans of text blocks in traversal order.
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Text(t) => Some(t),
                Block::Image(_) => None,
            })
            .flat_map(|t| t.lines.iter())
            .flat_map(|l| l.spans.iter())
    }

    /// Plain text of the page, one line per text line.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            if let Block::Text(t) = block {
                for line in &t.lines {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    for span in &line.spans {
                        out.push_str(&span.text);
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x0: f64) -> Span {
        Span {
            text: text.to_string(),
            bbox: Some(BBox::new(x0, 10.0, x0 + 20.0, 22.0)),
            font: "Helvetica".to_string(),
            size: 12.0,
            color: 0,
        }
    }

    fn line(spans: Vec<Span>) -> Line {
        let bbox = spans
            .iter()
            .filter_map(|s| s.bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0));
        Line { bbox, spans }
    }

    fn text_block(lines: Vec<Line>) -> Block {
        let bbox = lines
            .iter()
            .map(|l| l.bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0));
        Block::Text(TextBlock { bbox, lines })
    }

    #[test]
    fn fragments_follow_block_line_span_order() {
        let page = TextPage::new(vec![
            text_block(vec![line(vec![span("a", 0.0), span("b", 30.0)])]),
            text_block(vec![line(vec![span("c", 0.0)]), line(vec![span("d", 0.0)])]),
        ]);
        let texts: Vec<_> = page.fragments().into_iter().map(|f| f.text).collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn image_blocks_are_skipped() {
        let page = TextPage::new(vec![
            Block::Image(ImageBlock {
                bbox: BBox::new(0.0, 0.0, 100.0, 100.0),
            }),
            text_block(vec![line(vec![span("only", 0.0)])]),
            Block::Image(ImageBlock {
                bbox: BBox::new(0.0, 200.0, 100.0, 300.0),
            }),
        ]);
        let frags = page.fragments();
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].text, "only");
    }

    #[test]
    fn fragments_copy_span_fields_verbatim() {
        let mut s = span("", 5.0);
        s.bbox = None;
        s.color = 0x00FF00;
        let page = TextPage::new(vec![text_block(vec![line(vec![s])])]);
        let frag = &page.fragments()[0];
        assert_eq!(frag.text, "");
        assert_eq!(frag.bbox, None);
        assert_eq!(frag.font, "Helvetica");
        assert_eq!(frag.color, 0x00FF00);
    }

    #[test]
    fn repeated_traversal_is_identical() {
        let page = TextPage::new(vec![text_block(vec![line(vec![
            span("x", 0.0),
            span("y", 40.0),
        ])])]);
        assert_eq!(page.fragments(), page.fragments());
    }

    #[test]
    fn text_joins_lines() {
        let page = TextPage::new(vec![text_block(vec![
            line(vec![span("Hello", 0.0), span(" World", 30.0)]),
            line(vec![span("Next", 0.0)]),
        ])]);
        assert_eq!(page.text(), "Hello World\nNext");
    }

    #[test]
    fn empty_page_has_no_fragments() {
        assert!(TextPage::default().fragments().is_empty());
        assert_eq!(TextPage::default().text(), "");
    }
}
