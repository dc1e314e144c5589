//! In-memory backend for facade unit tests.
//!
//! A "PDF" is the JSON array of pages, each an array of item strings. Every
//! item is a span on its own line, except for these markers:
//!
//! - `<image>`: an image block
//! - `<broken>`: the page cannot be interpreted
//! - `<nobbox>`: a span without a bounding box
//! - `<nofont>`: a span with an empty font name and size 0
//! - `<nomark>`: marking this span's area fails
//! - `<nocommit>`: committing this page's marks fails
//! - `<nosave>`: saving the document fails
//!
//! Inserting text that starts with `!` fails.

use reword_core::{
    BBox, Block, FontFallback, ImageBlock, Line, PdfError, Span, TextBlock, TextPage,
};
use reword_parse::{InsertOutcome, InsertRequest, PdfBackend};

pub(crate) struct FakeBackend;

#[derive(Debug, Default)]
pub(crate) struct FakeDocument {
    pages: Vec<Vec<String>>,
    /// Spans drawn by `insert_text`, per page.
    drawn: Vec<Vec<Span>>,
    pending: Vec<(usize, BBox)>,
    pub(crate) marks: Vec<(usize, BBox)>,
    pub(crate) commits: Vec<usize>,
    pub(crate) inserts: Vec<(usize, InsertRequest)>,
}

pub(crate) fn fake_pdf(pages: &[&[&str]]) -> Vec<u8> {
    serde_json::to_vec(pages).unwrap()
}

fn slot_bbox(slot: usize) -> BBox {
    let x0 = 10.0 + 100.0 * slot as f64;
    BBox::new(x0, 100.0, x0 + 60.0, 112.0)
}

fn span(text: &str, slot: usize) -> Span {
    let (font, size) = if text == "<nofont>" {
        ("", 0.0)
    } else {
        ("Times-Roman", 11.0)
    };
    Span {
        text: text.to_string(),
        bbox: (text != "<nobbox>").then(|| slot_bbox(slot)),
        font: font.to_string(),
        size,
        color: 0x336699,
    }
}

fn text_block(span: Span) -> Block {
    let bbox = span.bbox.unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0));
    Block::Text(TextBlock {
        bbox,
        lines: vec![Line {
            bbox,
            spans: vec![span],
        }],
    })
}

fn out_of_range(index: usize) -> PdfError {
    PdfError::Backend(format!("page index {index} out of range"))
}

impl PdfBackend for FakeBackend {
    type Document = FakeDocument;
    type Error = PdfError;

    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error> {
        let pages: Vec<Vec<String>> =
            serde_json::from_slice(bytes).map_err(|e| PdfError::DocumentOpen(e.to_string()))?;
        Ok(FakeDocument {
            drawn: vec![Vec::new(); pages.len()],
            pages,
            ..FakeDocument::default()
        })
    }

    fn page_count(doc: &Self::Document) -> usize {
        doc.pages.len()
    }

    fn page_text(doc: &Self::Document, index: usize) -> Result<TextPage, Self::Error> {
        let items = doc.pages.get(index).ok_or_else(|| out_of_range(index))?;
        if items.iter().any(|item| item == "<broken>") {
            return Err(PdfError::Backend("unterminated string in content".to_string()));
        }
        let mut blocks: Vec<Block> = items
            .iter()
            .enumerate()
            .map(|(slot, item)| match item.as_str() {
                "<image>" => Block::Image(ImageBlock {
                    bbox: slot_bbox(slot),
                }),
                text => text_block(span(text, slot)),
            })
            .collect();
        blocks.extend(doc.drawn[index].iter().cloned().map(text_block));
        Ok(TextPage::new(blocks))
    }

    fn add_redaction(
        doc: &mut Self::Document,
        index: usize,
        area: BBox,
    ) -> Result<(), Self::Error> {
        let items = doc.pages.get(index).ok_or_else(|| out_of_range(index))?;
        let refused = items
            .iter()
            .enumerate()
            .any(|(slot, item)| item == "<nomark>" && slot_bbox(slot) == area);
        if refused {
            return Err(PdfError::Backend("annotation rejected".to_string()));
        }
        doc.pending.push((index, area));
        doc.marks.push((index, area));
        Ok(())
    }

    fn apply_redactions(doc: &mut Self::Document, index: usize) -> Result<(), Self::Error> {
        let items = doc.pages.get_mut(index).ok_or_else(|| out_of_range(index))?;
        if items.iter().any(|item| item == "<nocommit>") {
            return Err(PdfError::Backend("content rewrite failed".to_string()));
        }
        let areas: Vec<BBox> = doc
            .pending
            .iter()
            .filter(|(page, _)| *page == index)
            .map(|(_, area)| *area)
            .collect();
        doc.pending.retain(|(page, _)| *page != index);
        for (slot, item) in items.iter_mut().enumerate() {
            if areas.contains(&slot_bbox(slot)) {
                item.clear();
            }
        }
        doc.commits.push(index);
        Ok(())
    }

    fn insert_text(
        doc: &mut Self::Document,
        index: usize,
        request: &InsertRequest,
        _fallback: FontFallback,
    ) -> Result<InsertOutcome, Self::Error> {
        let drawn = doc.drawn.get_mut(index).ok_or_else(|| out_of_range(index))?;
        if request.text.starts_with('!') {
            return Err(PdfError::Backend("font not embeddable".to_string()));
        }
        let x0 = request.origin.x;
        drawn.push(Span {
            text: request.text.clone(),
            bbox: Some(BBox::new(x0, request.origin.y - request.size, x0 + 1.0, request.origin.y)),
            font: request.font.clone(),
            size: request.size,
            color: 0,
        });
        doc.inserts.push((index, request.clone()));
        Ok(InsertOutcome {
            font: request.font.clone(),
            replaced_chars: 0,
        })
    }

    fn save(doc: &mut Self::Document) -> Result<Vec<u8>, Self::Error> {
        if doc.pages.iter().flatten().any(|item| item == "<nosave>") {
            return Err(PdfError::Serialization("disk full".to_string()));
        }
        serde_json::to_vec(&doc.pages).map_err(|e| PdfError::Serialization(e.to_string()))
    }
}
