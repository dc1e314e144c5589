//! Error and warning types for reword.
//!
//! Provides [`PdfError`] for fatal errors that stop processing,
//! [`EditWarning`] for non-fatal issues that the rewriter absorbs while
//! applying edits, and [`ApplyReport`] for collecting them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fatal error types for PDF processing.
///
/// These stop the current operation. Everything else is absorbed and
/// reported as an [`EditWarning`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PdfError {
    /// The input bytes are not an openable PDF document.
    #[error("failed to open document: {0}")]
    DocumentOpen(String),
    /// The PDF is encrypted and requires a password to open.
    #[error("PDF is encrypted and requires a password")]
    PasswordRequired,
    /// A configured resource limit was exceeded.
    #[error(
        "resource limit exceeded: {limit_name} (limit: {limit_value}, actual: {actual_value})"
    )]
    ResourceLimitExceeded {
        /// Name of the limit that was exceeded (e.g., "max_input_bytes").
        limit_name: String,
        /// The configured limit value.
        limit_value: usize,
        /// The actual value that exceeded the limit.
        actual_value: usize,
    },
    /// Writing the modified document failed. No partial output is produced.
    #[error("failed to serialize document: {0}")]
    Serialization(String),
    /// I/O error reading PDF data.
    #[error("I/O error: {0}")]
    Io(String),
    /// A backend failure outside the open and save paths.
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<std::io::Error> for PdfError {
    fn from(err: std::io::Error) -> Self {
        PdfError::Io(err.to_string())
    }
}

/// Error parsing an edit set payload.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditSetError {
    /// The payload is not valid JSON.
    #[error("edit set is not valid JSON: {0}")]
    InvalidJson(String),
    /// The top-level JSON value is not an object.
    #[error("edit set must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Machine-readable code for a non-fatal edit issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditWarningCode {
    /// An edit-set key did not parse as a non-negative integer.
    MalformedKey,
    /// A fragment index is outside the page's fragment list.
    EditIndex,
    /// The targeted fragment has no bounding box.
    MissingBBox,
    /// Marking a fragment's area for redaction failed.
    Redaction,
    /// Committing the page's redactions failed.
    Commit,
    /// Drawing replacement text failed.
    Insertion,
    /// A page's content could not be interpreted.
    PageInterpretation,
    /// An edit targets a page the document does not have.
    PageOutOfRange,
}

impl EditWarningCode {
    /// Returns the string tag for this warning code.
    pub fn as_str(&self) -> &'static str {
        match self {
            EditWarningCode::MalformedKey => "MALFORMED_KEY",
            EditWarningCode::EditIndex => "EDIT_INDEX",
            EditWarningCode::MissingBBox => "MISSING_BBOX",
            EditWarningCode::Redaction => "REDACTION",
            EditWarningCode::Commit => "COMMIT",
            EditWarningCode::Insertion => "INSERTION",
            EditWarningCode::PageInterpretation => "PAGE_INTERPRETATION",
            EditWarningCode::PageOutOfRange => "PAGE_OUT_OF_RANGE",
        }
    }
}

impl fmt::Display for EditWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal issue encountered while applying edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditWarning {
    /// Machine-readable warning code.
    pub code: EditWarningCode,
    /// Page index (0-based) the warning refers to, if any.
    pub page: Option<usize>,
    /// Fragment index within the page, if any.
    pub fragment: Option<usize>,
    /// Human-readable description.
    pub description: String,
}

impl EditWarning {
    /// Create a warning with a code and description.
    pub fn new(code: EditWarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            page: None,
            fragment: None,
            description: description.into(),
        }
    }

    /// Create a warning attached to a page.
    pub fn on_page(code: EditWarningCode, page: usize, description: impl Into<String>) -> Self {
        Self {
            page: Some(page),
            ..Self::new(code, description)
        }
    }

    /// Create a warning attached to a single fragment on a page.
    pub fn on_fragment(
        code: EditWarningCode,
        page: usize,
        fragment: usize,
        description: impl Into<String>,
    ) -> Self {
        Self {
            page: Some(page),
            fragment: Some(fragment),
            ..Self::new(code, description)
        }
    }
}

impl fmt::Display for EditWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)?;
        if let Some(page) = self.page {
            write!(f, " (page {page}")?;
            if let Some(fragment) = self.fragment {
                write!(f, ", fragment {fragment}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Outcome of applying an edit set: what was drawn and what was skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyReport {
    /// Number of fragments whose original glyphs were redacted.
    pub redacted: usize,
    /// Number of replacement strings drawn onto pages.
    pub inserted: usize,
    /// Pages that were rewritten (0-based).
    pub pages_touched: Vec<usize>,
    /// Non-fatal issues, in the order they occurred.
    pub warnings: Vec<EditWarning>,
}

impl ApplyReport {
    /// Returns true if there are no warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Number of warnings carrying the given code.
    pub fn count(&self, code: EditWarningCode) -> usize {
        self.warnings.iter().filter(|w| w.code == code).count()
    }
}
