//! lopdf-based PDF backend.
//!
//! Implements [`PdfBackend`] on top of the [lopdf](https://crates.io/crates/lopdf)
//! object model. Text comes from the content stream interpreter, redaction
//! rewrites page content, and insertion appends content streams drawn with
//! the standard 14 fonts.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use lopdf::ObjectId;
use reword_core::{BBox, FontFallback, PdfError, TextPage};
use tracing::{debug, warn};

use crate::backend::PdfBackend;
use crate::error::BackendError;
use crate::redaction::{redact_page, validate_area};
use crate::standard_fonts::Base14;
use crate::text_builder::extract_text_page;
use crate::writer::{
    InsertOutcome, InsertRequest, add_font_resource, draw_text, encode_text, resolve_font,
    wrap_contents,
};

/// A parsed PDF document backed by lopdf, plus the edit state the backend
/// keeps between calls.
pub struct LopdfDocument {
    /// The underlying lopdf document.
    inner: lopdf::Document,
    /// Cached ordered list of page ObjectIds (indexed by 0-based page number).
    page_ids: Vec<ObjectId>,
    /// Redaction areas marked but not yet committed, per page.
    pending: BTreeMap<usize, Vec<BBox>>,
    /// Pages whose original content is already isolated in `q`/`Q`.
    isolated: BTreeSet<usize>,
    /// Font resources added for insertion, per page and font.
    fonts: HashMap<(usize, Base14), Vec<u8>>,
}

impl LopdfDocument {
    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    fn page_id(&self, index: usize) -> Result<ObjectId, BackendError> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or(BackendError::PageIndex {
                index,
                count: self.page_ids.len(),
            })
    }

    /// Number of marks waiting for [`LopdfBackend::apply_redactions`].
    pub fn pending_redactions(&self, index: usize) -> usize {
        self.pending.get(&index).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

/// The lopdf-based PDF backend.
///
/// # Example
///
/// ```ignore
/// use reword_parse::{LopdfBackend, PdfBackend};
///
/// let doc = LopdfBackend::open(pdf_bytes)?;
/// let count = LopdfBackend::page_count(&doc);
/// let text = LopdfBackend::page_text(&doc, 0)?;
/// ```
pub struct LopdfBackend;

impl PdfBackend for LopdfBackend {
    type Document = LopdfDocument;
    type Error = BackendError;

    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error> {
        let inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;

        // No password support: encrypted documents are rejected outright.
        if inner.is_encrypted() {
            return Err(BackendError::Core(PdfError::PasswordRequired));
        }

        // get_pages returns BTreeMap<u32, ObjectId> with 1-based keys
        let page_ids: Vec<ObjectId> = inner.get_pages().into_values().collect();
        debug!(pages = page_ids.len(), "document opened");

        Ok(LopdfDocument {
            inner,
            page_ids,
            pending: BTreeMap::new(),
            isolated: BTreeSet::new(),
            fonts: HashMap::new(),
        })
    }

    fn page_count(doc: &Self::Document) -> usize {
        doc.page_ids.len()
    }

    fn page_text(doc: &Self::Document, index: usize) -> Result<TextPage, Self::Error> {
        extract_text_page(&doc.inner, doc.page_id(index)?)
    }

    fn add_redaction(
        doc: &mut Self::Document,
        index: usize,
        area: BBox,
    ) -> Result<(), Self::Error> {
        doc.page_id(index)?;
        validate_area(&area)?;
        doc.pending.entry(index).or_default().push(area);
        Ok(())
    }

    fn apply_redactions(doc: &mut Self::Document, index: usize) -> Result<(), Self::Error> {
        let page_id = doc.page_id(index)?;
        let Some(areas) = doc.pending.remove(&index) else {
            return Ok(());
        };
        redact_page(&mut doc.inner, page_id, &areas)?;
        doc.isolated.insert(index);
        Ok(())
    }

    fn insert_text(
        doc: &mut Self::Document,
        index: usize,
        request: &InsertRequest,
        fallback: FontFallback,
    ) -> Result<InsertOutcome, Self::Error> {
        let page_id = doc.page_id(index)?;
        let font = resolve_font(&request.font, fallback)?;
        let (bytes, replaced_chars) = encode_text(font, &request.text);
        if replaced_chars > 0 {
            warn!(
                page = index,
                font = font.pdf_name(),
                replaced = replaced_chars,
                "characters outside the font encoding written as '?'"
            );
        }

        if !doc.isolated.contains(&index) {
            wrap_contents(&mut doc.inner, page_id)?;
            doc.isolated.insert(index);
        }
        let resource = match doc.fonts.get(&(index, font)) {
            Some(name) => name.clone(),
            None => {
                let name = add_font_resource(&mut doc.inner, page_id, font)?;
                doc.fonts.insert((index, font), name.clone());
                name
            }
        };
        draw_text(&mut doc.inner, page_id, &resource, request, bytes)?;

        Ok(InsertOutcome {
            font: font.pdf_name().to_string(),
            replaced_chars,
        })
    }

    fn save(doc: &mut Self::Document) -> Result<Vec<u8>, Self::Error> {
        let mut buf = Vec::new();
        doc.inner
            .save_to(&mut buf)
            .map_err(|e| BackendError::Write(format!("failed to write PDF: {e}")))?;
        Ok(buf)
    }
}
