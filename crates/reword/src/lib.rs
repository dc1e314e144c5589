//! reword: extract styled text fragments from PDF documents and rewrite
//! them in place.
//!
//! This is the public API facade. It re-exports types from reword-core and
//! uses reword-parse for PDF reading, redaction, and text insertion.
//!
//! # Architecture
//!
//! - **reword-core**: Backend-independent data types (fragments, edit sets, errors)
//! - **reword-parse**: The [`PdfBackend`] trait and the lopdf backend
//! - **reword** (this crate): [`Document`], [`Extractor`], and [`Rewriter`]
//!
//! # Example
//!
//! ```ignore
//! let model = reword::extract(&bytes)?;
//! let mut edits = reword::EditSet::new();
//! edits.insert(0, 0, "Bonjour");
//! let edited = reword::apply(&bytes, &edits)?;
//! ```

mod document;
mod extractor;
mod rewriter;

#[cfg(test)]
mod test_backend;

pub use document::Document;
pub use extractor::Extractor;
pub use rewriter::Rewriter;

pub use reword_core;
pub use reword_core::{
    ApplyReport, BBox, EditSet, EditSetError, EditWarning, EditWarningCode, EditorOptions,
    FontFallback, FragmentModel, PdfError, TextFragment, TextPage,
};
pub use reword_parse;
pub use reword_parse::{LopdfBackend, PdfBackend};

/// Extract the fragment model of a PDF with default options.
///
/// # Errors
///
/// Returns [`PdfError`] if the bytes cannot be opened.
pub fn extract(bytes: &[u8]) -> Result<FragmentModel, PdfError> {
    Ok(Document::open(bytes, None)?.extract())
}

/// Apply `edits` to a PDF with default options and return the new PDF.
///
/// # Errors
///
/// Returns [`PdfError`] if the bytes cannot be opened or the result cannot
/// be serialized. Individual edits that cannot be applied are skipped.
pub fn apply(bytes: &[u8], edits: &EditSet) -> Result<Vec<u8>, PdfError> {
    Document::open(bytes, None)?.apply(edits)
}
