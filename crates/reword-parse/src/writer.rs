//! Text insertion with the standard 14 fonts.
//!
//! Inserted text is drawn in black from a baseline origin, through a
//! Type1 font resource added to the page's own `/Resources`. Characters
//! the font's encoding cannot represent are written as `?`.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use reword_core::{FontFallback, Point};
use tracing::warn;

use crate::content::{self, Operand, Operation};
use crate::encoding::win_ansi_encode;
use crate::error::BackendError;
use crate::objects::{PageSpace, content_stream_ids, get_dict, page_resources};
use crate::redaction::page_dict_mut;
use crate::standard_fonts::Base14;

/// Prefix of the font resource names this module adds.
const RESOURCE_PREFIX: &str = "Rw";

/// Text to draw on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertRequest {
    /// Baseline start in top-left page space.
    pub origin: Point,
    pub text: String,
    /// Font name as reported by extraction, or a short alias such as `helv`.
    pub font: String,
    pub size: f64,
}

/// What an insertion actually used.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOutcome {
    /// PostScript name of the standard font drawn with.
    pub font: String,
    /// Characters written as `?`.
    pub replaced_chars: usize,
}

/// Pick the standard font for a requested name.
///
/// # Errors
///
/// With [`FontFallback::Strict`], a name that is not a standard font or
/// alias is an insertion error.
pub fn resolve_font(name: &str, fallback: FontFallback) -> Result<Base14, BackendError> {
    if let Some(font) = Base14::from_name(name) {
        return Ok(font);
    }
    match fallback {
        FontFallback::Substitute => {
            let font = Base14::substitute(name);
            warn!(requested = name, used = font.pdf_name(), "font substituted");
            Ok(font)
        }
        FontFallback::Strict => Err(BackendError::Insertion(format!(
            "font {name:?} is not one of the standard 14 fonts"
        ))),
    }
}

/// Encode text for a standard font. Returns the bytes and how many
/// characters became `?`.
pub fn encode_text(font: Base14, text: &str) -> (Vec<u8>, usize) {
    let mut replaced = 0;
    let bytes = text
        .chars()
        .map(|ch| {
            let byte = if font.uses_win_ansi() {
                win_ansi_encode(ch)
            } else {
                u8::try_from(u32::from(ch)).ok().filter(u8::is_ascii)
            };
            byte.unwrap_or_else(|| {
                replaced += 1;
                b'?'
            })
        })
        .collect();
    (bytes, replaced)
}

/// Add a Type1 font resource for `font` to the page and return its name.
///
/// Inherited resources are copied onto the page first so other pages are
/// not affected.
pub fn add_font_resource(
    doc: &mut Document,
    page_id: ObjectId,
    font: Base14,
) -> Result<Vec<u8>, BackendError> {
    let mut resources = page_resources(doc, page_id)?;
    let mut fonts = get_dict(doc, &resources, b"Font").cloned().unwrap_or_default();

    let name = (1..)
        .map(|n| format!("{RESOURCE_PREFIX}{n}").into_bytes())
        .find(|candidate| !fonts.has(candidate))
        .unwrap_or_else(|| RESOURCE_PREFIX.as_bytes().to_vec());

    let mut font_dict = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.pdf_name(),
    };
    if font.uses_win_ansi() {
        font_dict.set("Encoding", "WinAnsiEncoding");
    }
    let font_id = doc.add_object(font_dict);
    fonts.set(name.clone(), Object::Reference(font_id));
    resources.set("Font", fonts);
    page_dict_mut(doc, page_id)?.set("Resources", resources);
    Ok(name)
}

/// Draw `text` in black with the named font resource.
pub fn draw_text(
    doc: &mut Document,
    page_id: ObjectId,
    resource: &[u8],
    request: &InsertRequest,
    bytes: Vec<u8>,
) -> Result<(), BackendError> {
    let space = PageSpace::for_page(doc, page_id)?;
    let at = space.to_pdf(request.origin);
    let ops = [
        Operation::new("q", Vec::new()),
        Operation::new("BT", Vec::new()),
        Operation::new(
            "Tf",
            vec![Operand::Name(resource.to_vec()), Operand::Real(request.size)],
        ),
        Operation::new("g", vec![Operand::Integer(0)]),
        Operation::new(
            "Tm",
            vec![
                Operand::Integer(1),
                Operand::Integer(0),
                Operand::Integer(0),
                Operand::Integer(1),
                Operand::Real(at.x),
                Operand::Real(at.y),
            ],
        ),
        Operation::new("Tj", vec![Operand::String(bytes)]),
        Operation::new("ET", Vec::new()),
        Operation::new("Q", Vec::new()),
    ];
    append_stream(doc, page_id, content::encode(&ops)?)
}

/// Bracket the page's existing content in `q`/`Q` so later streams start
/// from a clean graphics state.
pub fn wrap_contents(doc: &mut Document, page_id: ObjectId) -> Result<(), BackendError> {
    let ids = content_stream_ids(doc, page_id)?;
    if ids.is_empty() {
        return Ok(());
    }
    let open = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let close = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
    let contents = std::iter::once(open)
        .chain(ids)
        .chain(std::iter::once(close))
        .map(Object::Reference)
        .collect();
    page_dict_mut(doc, page_id)?.set("Contents", Object::Array(contents));
    Ok(())
}

fn append_stream(
    doc: &mut Document,
    page_id: ObjectId,
    bytes: Vec<u8>,
) -> Result<(), BackendError> {
    let mut ids = content_stream_ids(doc, page_id)?;
    ids.push(doc.add_object(Stream::new(Dictionary::new(), bytes)));
    let contents = ids.into_iter().map(Object::Reference).collect();
    page_dict_mut(doc, page_id)?.set("Contents", Object::Array(contents));
    Ok(())
}
