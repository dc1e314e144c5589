//! reword-core: Backend-independent data types for reword.
//!
//! This crate provides the geometry, color, and text-model types shared by
//! extraction and rewriting: [`TextFragment`] and [`FragmentModel`] for the
//! editable text of a document, [`EditSet`] for sparse replacements,
//! [`TextPage`] for the structured text a backend reports, and the error,
//! warning, and option types used across the workspace.

pub mod color;
pub mod edit_set;
pub mod error;
pub mod fragment;
pub mod geometry;
pub mod options;
pub mod structured;

pub use color::Color;
pub use edit_set::EditSet;
pub use error::{ApplyReport, EditSetError, EditWarning, EditWarningCode, PdfError};
pub use fragment::{FragmentModel, TextFragment};
pub use geometry::{BBox, Ctm, Point};
pub use options::{DEFAULT_MAX_INPUT_BYTES, EditorOptions, FontFallback};
pub use structured::{Block, ImageBlock, Line, Span, TextBlock, TextPage};
