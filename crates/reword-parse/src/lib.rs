//! reword-parse: PDF backend for reword.
//!
//! This crate implements the [`PdfBackend`] trait and its lopdf-based
//! implementation: content stream decoding and interpretation, font and
//! encoding handling, the structured-text builder, area redaction, and text
//! insertion with the standard 14 fonts. It depends on reword-core for
//! shared data types.

pub mod backend;
pub mod cmap;
pub mod content;
pub mod encoding;
pub mod error;
pub mod fonts;
pub mod handler;
pub mod interpreter;
pub mod lopdf_backend;
mod objects;
pub mod redaction;
pub mod standard_fonts;
pub mod text_builder;
pub mod text_state;
pub mod writer;

#[cfg(test)]
mod test_pdf;

pub use backend::PdfBackend;
pub use error::BackendError;
pub use handler::{ContentHandler, GlyphEvent, ImageEvent};
pub use lopdf_backend::{LopdfBackend, LopdfDocument};
pub use objects::PageSpace;
pub use reword_core;
pub use standard_fonts::Base14;
pub use text_builder::{TextPageBuilder, extract_text_page};
pub use writer::{InsertOutcome, InsertRequest};
