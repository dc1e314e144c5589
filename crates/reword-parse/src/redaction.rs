//! Area redaction.
//!
//! Committing removes every glyph whose box centre falls inside a marked
//! area. Each removed glyph is replaced by a TJ adjustment of the same
//! width, so the glyphs around it stay where they were. The rewritten
//! content is wrapped in `q … Q` and an opaque white rectangle is painted
//! over each area.
//!
//! A form XObject that loses glyphs is copied with its rewritten content and
//! painted under a fresh `RwFm<n>` name, so other pages that paint the same
//! form are left alone.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use reword_core::BBox;
use tracing::debug;

use crate::content::{self, Operand, Operation};
use crate::error::BackendError;
use crate::handler::ContentHandler;
use crate::interpreter::{FormCall, PageInterpreter, Step, TextPiece};
use crate::objects::{PageSpace, content_stream_ids, get_dict, page_content_bytes, page_resources};

const FORM_PREFIX: &str = "RwFm";

/// Check that an area can be marked for redaction.
///
/// Zero-area boxes are accepted.
///
/// # Errors
///
/// Returns [`BackendError::Redaction`] for non-finite or inverted boxes.
pub fn validate_area(area: &BBox) -> Result<(), BackendError> {
    if !area.is_finite() {
        return Err(BackendError::Redaction(format!(
            "area {:?} has non-finite coordinates",
            <[f64; 4]>::from(*area)
        )));
    }
    if area.is_inverted() {
        return Err(BackendError::Redaction(format!(
            "area {:?} is inverted",
            <[f64; 4]>::from(*area)
        )));
    }
    Ok(())
}

/// Remove the glyphs under `areas` from a page and cover the areas.
///
/// Returns the number of glyphs removed. The page ends up with a single
/// content stream.
pub fn redact_page(
    doc: &mut Document,
    page_id: ObjectId,
    areas: &[BBox],
) -> Result<usize, BackendError> {
    let rewrite = rewrite_page(doc, page_id, areas)?;
    if !rewrite.forms.is_empty() {
        let mut resources = page_resources(doc, page_id)?;
        let originals = add_forms(doc, &mut resources, &rewrite)?;
        page_dict_mut(doc, page_id)?.set("Resources", resources);
        for id in originals.into_iter().rev() {
            if !is_referenced(doc, id) {
                doc.objects.remove(&id);
            }
        }
    }
    replace_contents(doc, page_id, content::encode(&rewrite.ops)?)?;
    debug!(
        page = ?page_id,
        areas = areas.len(),
        removed = rewrite.removed,
        forms = rewrite.forms.len(),
        "redactions committed"
    );
    Ok(rewrite.removed)
}

/// Rewritten operations of one content stream.
#[derive(Debug, Default)]
struct Rewrite {
    ops: Vec<Operation>,
    removed: usize,
    /// Forms painted by `ops` that lost glyphs.
    forms: Vec<FormRewrite>,
}

/// A form copy to store under `name`.
#[derive(Debug)]
struct FormRewrite {
    name: Vec<u8>,
    /// Name the original form was painted under.
    original: Vec<u8>,
    call: FormCall,
    content: Rewrite,
}

impl FormRewrite {
    /// Whether names in the form resolve against its own resources.
    fn has_own_resources(&self) -> bool {
        self.call.dict.has(b"Resources")
    }
}

fn rewrite_page(
    doc: &Document,
    page_id: ObjectId,
    areas: &[BBox],
) -> Result<Rewrite, BackendError> {
    let ops = content::decode(&page_content_bytes(doc, page_id)?)?;
    let mut interpreter = PageInterpreter::for_page(doc, page_id)?;

    let mut next_name = 0;
    let mut rewrite = rewrite_ops(doc, &mut interpreter, &ops, areas, &mut next_name);
    rewrite.ops.insert(0, Operation::new("q", Vec::new()));
    rewrite.ops.push(Operation::new("Q", Vec::new()));
    let space = interpreter.space();
    for area in areas {
        rewrite.ops.extend(cover(area, &space));
    }
    Ok(rewrite)
}

fn rewrite_ops(
    doc: &Document,
    interpreter: &mut PageInterpreter<'_>,
    ops: &[Operation],
    areas: &[BBox],
    next_name: &mut usize,
) -> Rewrite {
    let mut out = Rewrite::default();
    for op in ops {
        match interpreter.step(op, &mut Ignore) {
            Step::Text { pieces, scale } => {
                let hits = pieces
                    .iter()
                    .filter(|p| {
                        matches!(p, TextPiece::Glyph { glyph, .. } if covered(areas, &glyph.bbox))
                    })
                    .count();
                if hits == 0 {
                    out.ops.push(op.clone());
                } else {
                    out.removed += hits;
                    out.ops.extend(rewrite_show(op, &pieces, scale, areas));
                }
            }
            Step::Form(call) => {
                interpreter.enter_form(&call);
                let content = rewrite_ops(doc, interpreter, &call.ops, areas, next_name);
                interpreter.leave_form();
                if content.removed == 0 {
                    out.ops.push(op.clone());
                    continue;
                }
                let name = fresh_form_name(doc, interpreter.resources(), next_name);
                out.removed += content.removed;
                out.ops.push(Operation::new("Do", vec![Operand::Name(name.clone())]));
                out.forms.push(FormRewrite {
                    name,
                    original: call.name.clone(),
                    call,
                    content,
                });
            }
            Step::Other => out.ops.push(op.clone()),
        }
    }
    out
}

/// `RwFm<n>` with the lowest `n` above `next` not already an XObject name.
fn fresh_form_name(doc: &Document, resources: &Dictionary, next: &mut usize) -> Vec<u8> {
    let taken = get_dict(doc, resources, b"XObject");
    loop {
        *next += 1;
        let name = format!("{FORM_PREFIX}{next}").into_bytes();
        if taken.is_none_or(|xobjects| !xobjects.has(&name)) {
            return name;
        }
    }
}

/// Store the form copies of `rewrite` and register them in `resources`,
/// dropping names its content no longer paints.
///
/// Returns the ids of the original forms that were replaced.
fn add_forms(
    doc: &mut Document,
    resources: &mut Dictionary,
    rewrite: &Rewrite,
) -> Result<Vec<ObjectId>, BackendError> {
    let mut originals = Vec::new();
    register_forms(doc, resources, &rewrite.forms, &mut originals)?;

    let mut xobjects = get_dict(doc, resources, b"XObject").cloned().unwrap_or_default();
    for name in replaced_names(rewrite) {
        if !paints(rewrite, &name) {
            xobjects.remove(&name);
        }
    }
    resources.set("XObject", xobjects);
    Ok(originals)
}

fn register_forms(
    doc: &mut Document,
    resources: &mut Dictionary,
    forms: &[FormRewrite],
    originals: &mut Vec<ObjectId>,
) -> Result<(), BackendError> {
    for form in forms {
        let mut dict = form.call.dict.clone();
        for key in ["Filter", "DecodeParms", "Length"] {
            dict.remove(key.as_bytes());
        }
        match get_dict(doc, &dict, b"Resources").cloned() {
            Some(mut own) => {
                originals.extend(add_forms(doc, &mut own, &form.content)?);
                dict.set("Resources", own);
            }
            None => register_forms(doc, resources, &form.content.forms, originals)?,
        }
        let bytes = content::encode(&form.content.ops)?;
        let id = doc.add_object(Stream::new(dict, bytes));

        let mut xobjects = get_dict(doc, resources, b"XObject").cloned().unwrap_or_default();
        xobjects.set(form.name.clone(), Object::Reference(id));
        resources.set("XObject", xobjects);
        originals.extend(form.call.id);
    }
    Ok(())
}

/// Original names of the forms replaced in `rewrite`, including those in
/// forms that share its resources.
fn replaced_names(rewrite: &Rewrite) -> Vec<Vec<u8>> {
    let mut names = Vec::new();
    for form in &rewrite.forms {
        names.push(form.original.clone());
        if !form.has_own_resources() {
            names.extend(replaced_names(&form.content));
        }
    }
    names
}

/// Whether `rewrite` still paints the XObject `name` from its resources.
fn paints(rewrite: &Rewrite, name: &[u8]) -> bool {
    let direct = rewrite.ops.iter().any(|op| {
        op.operator == "Do" && op.operands.first().and_then(Operand::as_name) == Some(name)
    });
    direct
        || rewrite
            .forms
            .iter()
            .any(|form| !form.has_own_resources() && paints(&form.content, name))
}

/// Whether any object other than `id` itself refers to `id`.
fn is_referenced(doc: &Document, id: ObjectId) -> bool {
    fn refers(obj: &Object, id: ObjectId) -> bool {
        match obj {
            Object::Reference(r) => *r == id,
            Object::Array(items) => items.iter().any(|o| refers(o, id)),
            Object::Dictionary(dict) => dict.iter().any(|(_, o)| refers(o, id)),
            Object::Stream(stream) => stream.dict.iter().any(|(_, o)| refers(o, id)),
            _ => false,
        }
    }
    doc.trailer.iter().any(|(_, o)| refers(o, id))
        || doc.objects.iter().any(|(key, o)| *key != id && refers(o, id))
}

struct Ignore;
impl ContentHandler for Ignore {}

fn covered(areas: &[BBox], glyph: &BBox) -> bool {
    let centre = glyph.center();
    areas.iter().any(|a| a.contains(centre))
}

/// Rebuild a text-showing operation as a `TJ` without the covered glyphs.
///
/// `'` and `"` keep their line move and spacing as separate operations.
fn rewrite_show(
    op: &Operation,
    pieces: &[TextPiece],
    scale: f64,
    areas: &[BBox],
) -> Vec<Operation> {
    let mut out = Vec::new();
    match op.operator.as_str() {
        "'" => out.push(Operation::new("T*", Vec::new())),
        "\"" => {
            if let [aw, ac, ..] = op.operands.as_slice() {
                out.push(Operation::new("Tw", vec![aw.clone()]));
                out.push(Operation::new("Tc", vec![ac.clone()]));
            }
            out.push(Operation::new("T*", Vec::new()));
        }
        _ => {}
    }

    let mut items: Vec<Operand> = Vec::new();
    for piece in pieces {
        match piece {
            TextPiece::Glyph { glyph, hex } if !covered(areas, &glyph.bbox) => {
                push_bytes(&mut items, &glyph.bytes, *hex);
            }
            TextPiece::Glyph { glyph, .. } => {
                let adjustment = -glyph.advance * 1000.0 / scale;
                if adjustment.is_finite() {
                    push_number(&mut items, adjustment);
                }
            }
            TextPiece::Adjust(n) => push_number(&mut items, *n),
        }
    }
    out.push(Operation::new("TJ", vec![Operand::Array(items)]));
    out
}

fn push_bytes(items: &mut Vec<Operand>, bytes: &[u8], hex: bool) {
    match items.last_mut() {
        Some(Operand::HexString(s)) if hex => s.extend_from_slice(bytes),
        Some(Operand::String(s)) if !hex => s.extend_from_slice(bytes),
        _ if hex => items.push(Operand::HexString(bytes.to_vec())),
        _ => items.push(Operand::String(bytes.to_vec())),
    }
}

fn push_number(items: &mut Vec<Operand>, n: f64) {
    match items.last_mut() {
        Some(Operand::Real(last)) => *last += n,
        _ => items.push(Operand::Real(n)),
    }
}

/// `q 1 1 1 rg x y w h re f Q` over one area.
fn cover(area: &BBox, space: &PageSpace) -> Vec<Operation> {
    let (x, y, w, h) = space.rect_to_pdf(area);
    let white = || Operand::Integer(1);
    vec![
        Operation::new("q", Vec::new()),
        Operation::new("rg", vec![white(), white(), white()]),
        Operation::new(
            "re",
            vec![
                Operand::Real(x),
                Operand::Real(y),
                Operand::Real(w),
                Operand::Real(h),
            ],
        ),
        Operation::new("f", Vec::new()),
        Operation::new("Q", Vec::new()),
    ]
}

/// Point the page at a single new content stream.
///
/// Old streams that no other page uses are dropped from the document so the
/// removed text does not survive in the file.
fn replace_contents(
    doc: &mut Document,
    page_id: ObjectId,
    bytes: Vec<u8>,
) -> Result<(), BackendError> {
    let old = content_stream_ids(doc, page_id)?;
    let stream_id = doc.add_object(Stream::new(Dictionary::new(), bytes));
    page_dict_mut(doc, page_id)?.set("Contents", Object::Reference(stream_id));

    let in_use: Vec<ObjectId> = doc
        .get_pages()
        .into_values()
        .filter(|id| *id != page_id)
        .filter_map(|id| content_stream_ids(doc, id).ok())
        .flatten()
        .collect();
    for id in old {
        if !in_use.contains(&id) {
            doc.objects.remove(&id);
        }
    }
    Ok(())
}

pub(crate) fn page_dict_mut(
    doc: &mut Document,
    page_id: ObjectId,
) -> Result<&mut Dictionary, BackendError> {
    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))
}
