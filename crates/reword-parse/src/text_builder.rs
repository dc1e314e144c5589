//! Groups painted glyphs into blocks, lines, and spans.
//!
//! Every `BT`…`ET` text object becomes one text block and every painted
//! image an image block, in content order. Inside a block a new line starts
//! when the baseline moves by more than half the glyph size, and a new span
//! when the font, size, or fill color changes. A horizontal gap wider than a
//! quarter of the size between two visible glyphs inserts a space.

use lopdf::{Document, ObjectId};
use reword_core::{BBox, Block, ImageBlock, Line, Span, TextBlock, TextPage};

use crate::error::BackendError;
use crate::handler::{ContentHandler, GlyphEvent, ImageEvent};
use crate::interpreter::interpret_page;

const LINE_BREAK_RATIO: f64 = 0.5;
const SPACE_GAP_RATIO: f64 = 0.25;
const SIZE_TOLERANCE: f64 = 1e-3;

/// Structured text of one page.
pub fn extract_text_page(doc: &Document, page_id: ObjectId) -> Result<TextPage, BackendError> {
    let mut builder = TextPageBuilder::default();
    interpret_page(doc, page_id, &mut builder)?;
    Ok(builder.finish())
}

#[derive(Debug, Default)]
pub struct TextPageBuilder {
    blocks: Vec<Block>,
    open: Option<BlockBuilder>,
}

#[derive(Debug, Default)]
struct BlockBuilder {
    lines: Vec<LineBuilder>,
}

#[derive(Debug)]
struct LineBuilder {
    baseline: f64,
    spans: Vec<Span>,
    /// Right edge and blankness of the previous glyph.
    last: Option<(f64, bool)>,
}

impl TextPageBuilder {
    pub fn finish(mut self) -> TextPage {
        self.close_block();
        TextPage::new(self.blocks)
    }

    fn close_block(&mut self) {
        let Some(block) = self.open.take() else {
            return;
        };
        let lines: Vec<Line> = block
            .lines
            .into_iter()
            .filter(|l| !l.spans.is_empty())
            .map(LineBuilder::finish)
            .collect();
        let Some(bbox) = union_all(lines.iter().map(|l| l.bbox)) else {
            return;
        };
        self.blocks.push(Block::Text(TextBlock { bbox, lines }));
    }
}

impl ContentHandler for TextPageBuilder {
    fn on_text_begin(&mut self) {
        self.close_block();
        self.open = Some(BlockBuilder::default());
    }

    fn on_text_end(&mut self) {
        self.close_block();
    }

    fn on_glyph(&mut self, glyph: &GlyphEvent) {
        self.open.get_or_insert_with(BlockBuilder::default).push(glyph);
    }

    fn on_image(&mut self, event: ImageEvent) {
        self.close_block();
        self.blocks.push(Block::Image(ImageBlock { bbox: event.bbox }));
    }
}

impl BlockBuilder {
    fn push(&mut self, glyph: &GlyphEvent) {
        let threshold = LINE_BREAK_RATIO * glyph.size;
        let same_line = self
            .lines
            .last()
            .is_some_and(|line| (glyph.origin.y - line.baseline).abs() <= threshold);
        if !same_line {
            self.lines.push(LineBuilder {
                baseline: glyph.origin.y,
                spans: Vec::new(),
                last: None,
            });
        }
        if let Some(line) = self.lines.last_mut() {
            line.push(glyph);
        }
    }
}

impl LineBuilder {
    fn push(&mut self, glyph: &GlyphEvent) {
        let blank = glyph.is_blank();
        if let (Some((last_x1, last_blank)), Some(span)) = (self.last, self.spans.last_mut()) {
            let gap = glyph.bbox.x0 - last_x1;
            if gap > SPACE_GAP_RATIO * glyph.size && !blank && !last_blank {
                span.text.push(' ');
            }
        }
        self.last = Some((glyph.bbox.x1, blank));

        let color = glyph.color.to_packed_rgb();
        match self.spans.last_mut() {
            Some(span)
                if span.font == glyph.font_name
                    && (span.size - glyph.size).abs() < SIZE_TOLERANCE
                    && span.color == color =>
            {
                span.text.push_str(&glyph.text);
                span.bbox = Some(match span.bbox {
                    Some(b) => b.union(&glyph.bbox),
                    None => glyph.bbox,
                });
            }
            _ => self.spans.push(Span {
                text: glyph.text.clone(),
                bbox: Some(glyph.bbox),
                font: glyph.font_name.clone(),
                size: glyph.size,
                color,
            }),
        }
    }

    fn finish(self) -> Line {
        let bbox = union_all(self.spans.iter().filter_map(|s| s.bbox))
            .unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0));
        Line {
            bbox,
            spans: self.spans,
        }
    }
}

fn union_all(boxes: impl Iterator<Item = BBox>) -> Option<BBox> {
    boxes.reduce(|a, b| a.union(&b))
}
