//! Redact-then-reinsert rewriting.
//!
//! For every page with edits, the page's fragments are re-derived with the
//! same traversal the extractor uses, the targeted fragments are redacted
//! in one commit, and the replacement text is drawn at each fragment's
//! baseline. Per-edit failures are absorbed as warnings; only serializing
//! the document can fail the whole operation.

use std::collections::BTreeMap;

use reword_core::{
    ApplyReport, BBox, EditSet, EditWarning, EditWarningCode, EditorOptions, PdfError, Point,
};
use reword_parse::{InsertRequest, LopdfBackend, PdfBackend};
use tracing::{debug, warn};

use crate::document::Document;
use crate::extractor::Extractor;

/// One fragment scheduled for redaction and redraw.
#[derive(Debug, Clone, PartialEq)]
struct PlannedEdit {
    fragment_index: usize,
    bbox: BBox,
    font: String,
    size: f64,
    /// Original color. Replacement text is always drawn in black.
    color: u32,
    new_text: String,
}

/// Applies an [`EditSet`] to a document.
pub struct Rewriter<'a, B: PdfBackend = LopdfBackend> {
    doc: &'a mut Document<B>,
    options: EditorOptions,
    report: ApplyReport,
}

impl<'a, B: PdfBackend> Rewriter<'a, B> {
    pub fn new(doc: &'a mut Document<B>) -> Self {
        let options = doc.options().clone();
        Self {
            doc,
            options,
            report: ApplyReport::default(),
        }
    }

    /// Apply `edits` page by page, then serialize the document.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Serialization`] (or the backend's equivalent) if
    /// the document cannot be written. No partial output is returned.
    pub fn apply(mut self, edits: &EditSet) -> Result<(Vec<u8>, ApplyReport), PdfError> {
        let page_count = self.doc.page_count();
        for (page, entries) in edits.pages() {
            if page >= page_count {
                debug!(page, page_count, "ignoring edits for missing page");
                self.record(EditWarning::on_page(
                    EditWarningCode::PageOutOfRange,
                    page,
                    format!("document has {page_count} pages"),
                ));
                continue;
            }
            self.apply_page(page, entries);
        }

        let bytes = B::save(self.doc.backend_doc_mut()).map_err(Into::<PdfError>::into)?;
        debug!(
            bytes = bytes.len(),
            redacted = self.report.redacted,
            inserted = self.report.inserted,
            warnings = self.report.warnings.len(),
            "document rewritten"
        );
        Ok((bytes, self.report))
    }

    fn apply_page(&mut self, page: usize, entries: &BTreeMap<usize, String>) {
        if entries.is_empty() {
            return;
        }
        let fragments = match Extractor::new(&*self.doc).page(page) {
            Ok(fragments) => fragments,
            Err(warning) => {
                self.record(warning);
                return;
            }
        };

        let mut plan = Vec::new();
        for (&index, new_text) in entries {
            let Some(fragment) = fragments.get(index) else {
                self.warn(EditWarning::on_fragment(
                    EditWarningCode::EditIndex,
                    page,
                    index,
                    format!("page has {} fragments", fragments.len()),
                ));
                continue;
            };
            let Some(bbox) = fragment.bbox else {
                self.warn(EditWarning::on_fragment(
                    EditWarningCode::MissingBBox,
                    page,
                    index,
                    "fragment has no bounding box",
                ));
                continue;
            };
            plan.push(PlannedEdit {
                fragment_index: index,
                bbox,
                font: self.options.effective_font(&fragment.font).to_string(),
                size: self.options.effective_size(fragment.size),
                color: fragment.color,
                new_text: new_text.clone(),
            });
        }

        let mut marked = Vec::with_capacity(plan.len());
        for edit in plan {
            match B::add_redaction(self.doc.backend_doc_mut(), page, edit.bbox) {
                Ok(()) => marked.push(edit),
                Err(err) => self.warn(EditWarning::on_fragment(
                    EditWarningCode::Redaction,
                    page,
                    edit.fragment_index,
                    err.to_string(),
                )),
            }
        }
        if marked.is_empty() {
            return;
        }
        if let Err(err) = B::apply_redactions(self.doc.backend_doc_mut(), page) {
            self.warn(EditWarning::on_page(
                EditWarningCode::Commit,
                page,
                format!("redactions not applied, page left unchanged: {err}"),
            ));
            return;
        }
        self.report.redacted += marked.len();
        self.report.pages_touched.push(page);

        for edit in marked {
            self.reinsert(page, edit);
        }
    }

    fn reinsert(&mut self, page: usize, edit: PlannedEdit) {
        if edit.new_text.is_empty() {
            debug!(page, fragment = edit.fragment_index, "fragment erased");
            return;
        }
        let request = InsertRequest {
            origin: Point::new(edit.bbox.x0, edit.bbox.bottom - self.options.baseline_nudge),
            text: edit.new_text,
            font: edit.font,
            size: edit.size,
        };
        let fallback = self.options.font_fallback;
        match B::insert_text(self.doc.backend_doc_mut(), page, &request, fallback) {
            Ok(outcome) => {
                debug!(
                    page,
                    fragment = edit.fragment_index,
                    font = %outcome.font,
                    original_color = edit.color,
                    "replacement drawn"
                );
                self.report.inserted += 1;
            }
            Err(err) => self.warn(EditWarning::on_fragment(
                EditWarningCode::Insertion,
                page,
                edit.fragment_index,
                err.to_string(),
            )),
        }
    }

    fn warn(&mut self, warning: EditWarning) {
        warn!(
            code = %warning.code,
            page = ?warning.page,
            fragment = ?warning.fragment,
            "{}",
            warning.description
        );
        self.record(warning);
    }

    fn record(&mut self, warning: EditWarning) {
        if self.options.collect_warnings {
            self.report.warnings.push(warning);
        }
    }
}
