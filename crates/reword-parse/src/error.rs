//! Error types for the backend layer.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Provides [`BackendError`]
//! that wraps backend-specific errors and converts them to [`PdfError`].

use reword_core::PdfError;
use thiserror::Error;

/// Error type for PDF backend operations.
///
/// Converts to [`PdfError`]: parse failures become
/// [`PdfError::DocumentOpen`], write failures [`PdfError::Serialization`],
/// and page-level failures [`PdfError::Backend`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading PDF data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error resolving font or encoding information.
    #[error("font error: {0}")]
    Font(String),

    /// Error during content stream interpretation.
    #[error("interpreter error: {0}")]
    Interpreter(String),

    /// A page index past the end of the document.
    #[error("page index {index} out of range (0..{count})")]
    PageIndex { index: usize, count: usize },

    /// A redaction area could not be marked or committed.
    #[error("redaction error: {0}")]
    Redaction(String),

    /// Text could not be inserted.
    #[error("insertion error: {0}")]
    Insertion(String),

    /// The document could not be written.
    #[error("write error: {0}")]
    Write(String),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] PdfError),
}

impl From<BackendError> for PdfError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => PdfError::DocumentOpen(msg),
            BackendError::Io(e) => PdfError::Io(e.to_string()),
            BackendError::Write(msg) => PdfError::Serialization(msg),
            BackendError::Core(e) => e,
            other @ (BackendError::Font(_)
            | BackendError::Interpreter(_)
            | BackendError::PageIndex { .. }
            | BackendError::Redaction(_)
            | BackendError::Insertion(_)) => PdfError::Backend(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_parse() {
        let err = BackendError::Parse("invalid xref table".to_string());
        assert_eq!(err.to_string(), "PDF parse error: invalid xref table");
    }

    #[test]
    fn backend_error_io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: BackendError = io_err.into();
        assert!(matches!(err, BackendError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn parse_becomes_document_open() {
        let pdf_err: PdfError = BackendError::Parse("bad header".to_string()).into();
        assert_eq!(pdf_err, PdfError::DocumentOpen("bad header".to_string()));
    }

    #[test]
    fn write_becomes_serialization() {
        let pdf_err: PdfError = BackendError::Write("disk full".to_string()).into();
        assert_eq!(pdf_err, PdfError::Serialization("disk full".to_string()));
    }

    #[test]
    fn page_level_errors_become_backend() {
        let pdf_err: PdfError = BackendError::Redaction("inverted box".to_string()).into();
        assert_eq!(
            pdf_err,
            PdfError::Backend("redaction error: inverted box".to_string())
        );
        let pdf_err: PdfError = BackendError::Insertion("no font".to_string()).into();
        assert!(matches!(pdf_err, PdfError::Backend(_)));
    }

    #[test]
    fn page_index_message() {
        let err = BackendError::PageIndex { index: 5, count: 2 };
        let pdf_err: PdfError = err.into();
        assert_eq!(
            pdf_err,
            PdfError::Backend("page index 5 out of range (0..2)".to_string())
        );
    }

    #[test]
    fn core_error_passes_through() {
        let original = PdfError::ResourceLimitExceeded {
            limit_name: "max_input_bytes".to_string(),
            limit_value: 1024,
            actual_value: 2048,
        };
        let backend = BackendError::Core(original.clone());
        let pdf_err: PdfError = backend.into();
        assert_eq!(pdf_err, original);
    }

    #[test]
    fn backend_error_implements_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(BackendError::Font("x".to_string()));
        assert_eq!(err.to_string(), "font error: x");
    }
}
