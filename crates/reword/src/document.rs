//! Top-level PDF document handle for extraction and editing.

use reword_core::{
    ApplyReport, EditSet, EditorOptions, FragmentModel, PdfError, TextFragment, TextPage,
};
use reword_parse::{LopdfBackend, PdfBackend};

use crate::extractor::Extractor;
use crate::rewriter::Rewriter;

/// A PDF document opened for extraction and editing.
///
/// Owns the parsed document; it is released when the handle is dropped.
/// The backend defaults to [`LopdfBackend`].
///
/// # Example
///
/// ```ignore
/// let mut doc = Document::open(&bytes, None)?;
/// let model = doc.extract();
/// let edited = doc.apply(&edits)?;
/// ```
pub struct Document<B: PdfBackend = LopdfBackend> {
    doc: B::Document,
    options: EditorOptions,
}

impl Document<LopdfBackend> {
    /// Open a PDF document from a file path.
    ///
    /// This is a convenience wrapper around [`Document::open`] that reads the
    /// file into memory first.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the file cannot be read or is not an openable PDF.
    #[cfg(feature = "std")]
    pub fn open_file(
        path: impl AsRef<std::path::Path>,
        options: Option<EditorOptions>,
    ) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::open(&bytes, options)
    }

    /// Open a PDF document from bytes.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Raw PDF file bytes.
    /// * `options` - Editor options (size limit, fallbacks). Uses defaults if `None`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::ResourceLimitExceeded`] if the input is larger than
    /// `max_input_bytes`, [`PdfError::PasswordRequired`] if the PDF is
    /// encrypted, and [`PdfError::DocumentOpen`] if the bytes are not a PDF.
    pub fn open(bytes: &[u8], options: Option<EditorOptions>) -> Result<Self, PdfError> {
        Self::open_with_backend(bytes, options)
    }
}

impl<B: PdfBackend> Document<B> {
    /// Open a PDF document from bytes with an explicit backend.
    ///
    /// # Errors
    ///
    /// Same as [`Document::open`].
    pub fn open_with_backend(
        bytes: &[u8],
        options: Option<EditorOptions>,
    ) -> Result<Self, PdfError> {
        let options = options.unwrap_or_default();
        // Check max_input_bytes before parsing
        if bytes.len() > options.max_input_bytes {
            return Err(PdfError::ResourceLimitExceeded {
                limit_name: "max_input_bytes".to_string(),
                limit_value: options.max_input_bytes,
                actual_value: bytes.len(),
            });
        }
        let doc = B::open(bytes).map_err(Into::<PdfError>::into)?;
        Ok(Self { doc, options })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        B::page_count(&self.doc)
    }

    /// The options this document was opened with.
    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Structured text of one page as the backend reports it.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the index is out of range or the page content
    /// cannot be interpreted.
    pub fn page_text(&self, index: usize) -> Result<TextPage, PdfError> {
        B::page_text(&self.doc, index).map_err(Into::into)
    }

    /// Fragments of one page, in traversal order.
    ///
    /// # Errors
    ///
    /// Same as [`Document::page_text`].
    pub fn page_fragments(&self, index: usize) -> Result<Vec<TextFragment>, PdfError> {
        Ok(self.page_text(index)?.fragments())
    }

    /// Extract the text fragments of every page.
    pub fn extract(&self) -> FragmentModel {
        Extractor::new(self).extract()
    }

    /// Apply `edits` and serialize the modified document.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Serialization`] if the document cannot be written.
    pub fn apply(&mut self, edits: &EditSet) -> Result<Vec<u8>, PdfError> {
        self.apply_with_report(edits).map(|(bytes, _)| bytes)
    }

    /// Apply `edits`, returning the modified document and what happened to
    /// each edit.
    ///
    /// # Errors
    ///
    /// Same as [`Document::apply`].
    pub fn apply_with_report(
        &mut self,
        edits: &EditSet,
    ) -> Result<(Vec<u8>, ApplyReport), PdfError> {
        Rewriter::new(self).apply(edits)
    }

    #[cfg(test)]
    pub(crate) fn backend_doc(&self) -> &B::Document {
        &self.doc
    }

    pub(crate) fn backend_doc_mut(&mut self) -> &mut B::Document {
        &mut self.doc
    }
}

impl<B: PdfBackend> std::fmt::Debug for Document<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("page_count", &self.page_count())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
