//! lopdf object helpers shared by the interpreter, font loader, and writers.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use reword_core::{BBox, Point};

use crate::error::BackendError;

/// Convert a lopdf numeric object (Integer or Real) to f64.
pub(crate) fn object_to_f64(obj: &Object) -> Result<f64, BackendError> {
    match obj {
        Object::Integer(i) => Ok(*i as f64),
        Object::Real(f) => Ok(f64::from(*f)),
        _ => Err(BackendError::Parse(format!("expected number, got {obj:?}"))),
    }
}

/// Numeric value of an operand, `None` for non-numbers.
pub(crate) fn number(obj: &Object) -> Option<f64> {
    object_to_f64(obj).ok()
}

/// Resolve an indirect reference, returning the referenced object.
///
/// A dangling reference resolves to itself.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Look up `key` in `dict` and resolve it to a dictionary.
pub(crate) fn get_dict<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    dict.get(key)
        .ok()
        .map(|o| resolve(doc, o))
        .and_then(|o| match o {
            Object::Dictionary(d) => Some(d),
            Object::Stream(s) => Some(&s.dict),
            _ => None,
        })
}

/// Look up `key` in `dict` and resolve it to an array.
pub(crate) fn get_array<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a [Object]> {
    dict.get(key)
        .ok()
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_array().ok())
        .map(Vec::as_slice)
}

/// Look up `key` in `dict` and resolve it to a number.
pub(crate) fn get_number(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<f64> {
    dict.get(key).ok().and_then(|o| number(resolve(doc, o)))
}

/// Look up `key` in `dict` and return it as a name.
pub(crate) fn get_name<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a [u8]> {
    dict.get(key)
        .ok()
        .and_then(|o| resolve(doc, o).as_name().ok())
}

/// Look up a key in the page dictionary, walking up the page tree
/// (via /Parent) if the key is not found on the page itself.
///
/// Returns `None` if the key is not found anywhere in the tree.
pub(crate) fn resolve_inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, BackendError> {
    let mut current_id = page_id;
    // Bounded walk so a /Parent cycle cannot loop forever.
    for _ in 0..64 {
        let dict = doc
            .get_object(current_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }

        match dict.get(b"Parent") {
            Ok(parent_obj) => {
                current_id = parent_obj
                    .as_reference()
                    .map_err(|e| BackendError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

/// A page rectangle (`MediaBox`, `CropBox`) in PDF space, `[x0, y0, x1, y1]`
/// normalized so `x0 <= x1` and `y0 <= y1`. `None` when absent.
fn page_box(
    doc: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<[f64; 4]>, BackendError> {
    let name = String::from_utf8_lossy(key);
    let Some(obj) = resolve_inherited(doc, page_id, key)? else {
        return Ok(None);
    };
    let array = resolve(doc, obj)
        .as_array()
        .map_err(|e| BackendError::Parse(format!("{name} is not an array: {e}")))?;
    if array.len() != 4 {
        return Err(BackendError::Parse(format!(
            "expected 4-element array for {name}, got {}",
            array.len()
        )));
    }
    let mut v = [0.0; 4];
    for (slot, item) in v.iter_mut().zip(array) {
        *slot = object_to_f64(resolve(doc, item))?;
    }
    Ok(Some([v[0].min(v[2]), v[1].min(v[3]), v[0].max(v[2]), v[1].max(v[3])]))
}

/// The page's MediaBox. Defaults to US Letter when absent.
pub(crate) fn page_media_box(
    doc: &Document,
    page_id: ObjectId,
) -> Result<[f64; 4], BackendError> {
    Ok(page_box(doc, page_id, b"MediaBox")?.unwrap_or([0.0, 0.0, 612.0, 792.0]))
}

/// The visible region: the CropBox clipped to the MediaBox, or the MediaBox
/// when there is no CropBox or it does not overlap.
pub(crate) fn page_crop_box(
    doc: &Document,
    page_id: ObjectId,
) -> Result<[f64; 4], BackendError> {
    let media = page_media_box(doc, page_id)?;
    let Some(crop) = page_box(doc, page_id, b"CropBox")? else {
        return Ok(media);
    };
    let clipped = [
        crop[0].max(media[0]),
        crop[1].max(media[1]),
        crop[2].min(media[2]),
        crop[3].min(media[3]),
    ];
    if clipped[0] < clipped[2] && clipped[1] < clipped[3] {
        Ok(clipped)
    } else {
        Ok(media)
    }
}

/// Mapping between PDF user space (bottom-left origin) and the top-left
/// origin page space that fragments use.
///
/// The origin is the top-left corner of the visible (crop) box. `/Rotate`
/// is not applied: coordinates are those of the unrotated page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpace {
    /// Left edge of the crop box.
    pub x0: f64,
    /// Top edge of the crop box.
    pub y1: f64,
}

impl PageSpace {
    pub(crate) fn from_box(rect: [f64; 4]) -> Self {
        Self {
            x0: rect[0],
            y1: rect[3],
        }
    }

    pub(crate) fn for_page(doc: &Document, page_id: ObjectId) -> Result<Self, BackendError> {
        Ok(Self::from_box(page_crop_box(doc, page_id)?))
    }

    /// PDF user space → top-left space.
    pub fn to_top_left(&self, p: Point) -> Point {
        Point::new(p.x - self.x0, self.y1 - p.y)
    }

    /// Top-left space → PDF user space.
    pub fn to_pdf(&self, p: Point) -> Point {
        Point::new(p.x + self.x0, self.y1 - p.y)
    }

    /// Convert a top-left space box to a PDF rectangle `(x, y, w, h)`.
    pub fn rect_to_pdf(&self, b: &BBox) -> (f64, f64, f64, f64) {
        let bottom_left = self.to_pdf(Point::new(b.x0, b.bottom));
        (bottom_left.x, bottom_left.y, b.width(), b.height())
    }
}

/// Get the resources dictionary for a page, handling inheritance.
///
/// A page without resources yields an empty dictionary.
pub(crate) fn page_resources(
    doc: &Document,
    page_id: ObjectId,
) -> Result<Dictionary, BackendError> {
    match resolve_inherited(doc, page_id, b"Resources")? {
        Some(obj) => match resolve(doc, obj) {
            Object::Dictionary(d) => Ok(d.clone()),
            _ => Err(BackendError::Parse("/Resources is not a dictionary".to_string())),
        },
        None => Ok(Dictionary::new()),
    }
}

/// Decode a content stream, decompressing if needed.
pub(crate) fn decode_content_stream(stream: &Stream) -> Result<Vec<u8>, BackendError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| BackendError::Parse(format!("failed to decompress content stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}

/// Object ids of the page's content streams, in order.
pub(crate) fn content_stream_ids(
    doc: &Document,
    page_id: ObjectId,
) -> Result<Vec<ObjectId>, BackendError> {
    let page = doc
        .get_object(page_id)
        .and_then(|o| o.as_dict())
        .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;
    let Ok(contents) = page.get(b"Contents") else {
        return Ok(Vec::new());
    };
    match contents {
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => collect_refs(items),
            Ok(_) => Ok(vec![*id]),
            Err(e) => Err(BackendError::Parse(format!("failed to resolve /Contents: {e}"))),
        },
        Object::Array(items) => collect_refs(items),
        _ => Err(BackendError::Parse(
            "/Contents is not a reference or array".to_string(),
        )),
    }
}

fn collect_refs(items: &[Object]) -> Result<Vec<ObjectId>, BackendError> {
    items
        .iter()
        .map(|item| {
            item.as_reference().map_err(|e| {
                BackendError::Parse(format!("/Contents array item is not a reference: {e}"))
            })
        })
        .collect()
}

/// Concatenated, decoded content of all the page's content streams.
pub(crate) fn page_content_bytes(
    doc: &Document,
    page_id: ObjectId,
) -> Result<Vec<u8>, BackendError> {
    let mut content = Vec::new();
    for id in content_stream_ids(doc, page_id)? {
        let stream = doc
            .get_object(id)
            .and_then(|o| o.as_stream())
            .map_err(|e| BackendError::Parse(format!("/Contents item is not a stream: {e}")))?;
        let bytes = decode_content_stream(stream)?;
        if !content.is_empty() {
            content.push(b'\n');
        }
        content.extend_from_slice(&bytes);
    }
    Ok(content)
}
