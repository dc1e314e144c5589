//! PDF backend trait.
//!
//! Defines the [`PdfBackend`] trait that abstracts the document primitives
//! the editor needs: opening, structured page text, area redaction, text
//! insertion, and saving. Extraction and rewriting are written against this
//! trait, so a backend can be swapped (or mocked in tests) without touching
//! either.

use reword_core::{BBox, FontFallback, PdfError, TextPage};

use crate::writer::{InsertOutcome, InsertRequest};

/// Trait abstracting PDF document operations.
///
/// All coordinates are in top-left-origin page space, the same space
/// [`TextPage`] boxes use. Page indices are 0-based.
///
/// # Associated Types
///
/// - `Document`: The parsed PDF document representation.
/// - `Error`: Backend-specific error type, convertible to [`PdfError`].
///
/// # Usage
///
/// ```ignore
/// let mut doc = MyBackend::open(pdf_bytes)?;
/// let text = MyBackend::page_text(&doc, 0)?;
/// MyBackend::add_redaction(&mut doc, 0, area)?;
/// MyBackend::apply_redactions(&mut doc, 0)?;
/// MyBackend::insert_text(&mut doc, 0, &request, FontFallback::Substitute)?;
/// let bytes = MyBackend::save(&mut doc)?;
/// ```
pub trait PdfBackend {
    /// The parsed PDF document type.
    type Document;

    /// Backend-specific error type, convertible to [`PdfError`].
    type Error: std::error::Error + Into<PdfError>;

    /// Parse PDF bytes into a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes do not represent an openable PDF
    /// document, including encrypted documents.
    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error>;

    /// Return the number of pages in the document.
    fn page_count(doc: &Self::Document) -> usize;

    /// Structured text of a page: text and image blocks in content order.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the page content
    /// cannot be interpreted.
    fn page_text(doc: &Self::Document, index: usize) -> Result<TextPage, Self::Error>;

    /// Mark an area of a page for redaction. Nothing changes on the page
    /// until [`apply_redactions`](Self::apply_redactions).
    ///
    /// # Errors
    ///
    /// Returns an error if the area cannot be marked.
    fn add_redaction(doc: &mut Self::Document, index: usize, area: BBox)
    -> Result<(), Self::Error>;

    /// Commit every pending mark on a page: remove the text under the
    /// marked areas and paint them white.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be rewritten. The page is left
    /// as it was.
    fn apply_redactions(doc: &mut Self::Document, index: usize) -> Result<(), Self::Error>;

    /// Draw text on a page in black.
    ///
    /// # Errors
    ///
    /// Returns an error if the font cannot be resolved under `fallback` or
    /// the page cannot be updated.
    fn insert_text(
        doc: &mut Self::Document,
        index: usize,
        request: &InsertRequest,
        fallback: FontFallback,
    ) -> Result<InsertOutcome, Self::Error>;

    /// Serialize the whole document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written. No partial
    /// output is returned.
    fn save(doc: &mut Self::Document) -> Result<Vec<u8>, Self::Error>;
}
