//! Content stream interpreter.
//!
//! Executes decoded content stream operations against the graphics and text
//! state, computing every shown glyph's box in top-left page space. The same
//! [`PageInterpreter::step`] drives both extraction (through a
//! [`ContentHandler`]) and redaction, which rewrites the text-showing
//! operations it returns.
//!
//! Painting a form XObject returns a [`FormCall`]. The caller enters it,
//! steps through its operations under the form's matrix and resources, and
//! leaves it again, so form content is reported in stream order.

use std::collections::HashMap;
use std::rc::Rc;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use reword_core::{BBox, Color, Ctm, Point};
use tracing::{debug, warn};

use crate::content::{self, Operand, Operation};
use crate::error::BackendError;
use crate::fonts::LoadedFont;
use crate::handler::{ContentHandler, GlyphEvent, ImageEvent};
use crate::objects::{
    PageSpace, decode_content_stream, get_array, get_dict, get_name, get_number, number,
    page_content_bytes, page_resources, resolve,
};
use crate::text_state::{StateStack, TextObject};

/// A piece of a text-showing operation, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum TextPiece {
    /// A painted glyph. `hex` records whether it came from a hex string.
    Glyph { glyph: GlyphEvent, hex: bool },
    /// A TJ number, in thousandths of text space.
    Adjust(f64),
}

/// What one operation did.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Glyphs shown by `Tj`, `TJ`, `'` or `"`.
    Text {
        pieces: Vec<TextPiece>,
        /// `Tfs · Th` in effect while the glyphs were shown.
        scale: f64,
    },
    /// A form XObject to run with [`PageInterpreter::enter_form`].
    Form(FormCall),
    Other,
}

/// Forms nested deeper than this are not painted.
const MAX_FORM_DEPTH: usize = 12;

/// A form XObject painted by `Do`.
#[derive(Debug, Clone, PartialEq)]
pub struct FormCall {
    /// Resource name the form was painted under.
    pub name: Vec<u8>,
    /// The form's stream dictionary.
    pub dict: Dictionary,
    pub ops: Vec<Operation>,
    /// The form stream's object id, when it is an indirect object.
    pub id: Option<ObjectId>,
    matrix: Ctm,
}

/// What entering a form replaced, put back on leaving it.
struct FormFrame {
    id: Option<ObjectId>,
    depth: usize,
    resources: Option<Dictionary>,
    fonts: HashMap<Vec<u8>, Rc<LoadedFont>>,
    text: Option<TextObject>,
}

/// Interpreter state for one page.
pub struct PageInterpreter<'a> {
    doc: &'a Document,
    resources: Dictionary,
    space: PageSpace,
    state: StateStack,
    text: Option<TextObject>,
    fonts: HashMap<Vec<u8>, Rc<LoadedFont>>,
    fallback_font: Rc<LoadedFont>,
    forms: Vec<FormFrame>,
}

impl<'a> PageInterpreter<'a> {
    pub fn new(doc: &'a Document, resources: Dictionary, space: PageSpace) -> Self {
        Self {
            doc,
            resources,
            space,
            state: StateStack::new(),
            text: None,
            fonts: HashMap::new(),
            fallback_font: Rc::new(LoadedFont::unknown()),
            forms: Vec::new(),
        }
    }

    /// Interpreter for a page, with its inherited resources and MediaBox.
    pub fn for_page(doc: &'a Document, page_id: ObjectId) -> Result<Self, BackendError> {
        let resources = page_resources(doc, page_id)?;
        let space = PageSpace::for_page(doc, page_id)?;
        Ok(Self::new(doc, resources, space))
    }

    pub fn space(&self) -> PageSpace {
        self.space
    }

    /// Resources that names in the current content resolve against.
    pub fn resources(&self) -> &Dictionary {
        &self.resources
    }

    /// Execute every operation, reporting to `handler`.
    pub fn run(&mut self, ops: &[Operation], handler: &mut dyn ContentHandler) {
        for op in ops {
            match self.step(op, handler) {
                Step::Text { pieces, .. } => {
                    for piece in &pieces {
                        if let TextPiece::Glyph { glyph, .. } = piece {
                            handler.on_glyph(glyph);
                        }
                    }
                }
                Step::Form(form) => {
                    self.enter_form(&form);
                    self.run(&form.ops, handler);
                    self.leave_form();
                }
                Step::Other => {}
            }
        }
    }

    /// Start running `form`: save the graphics state, apply the form
    /// matrix, and switch to the form's resources if it has its own.
    pub fn enter_form(&mut self, form: &FormCall) {
        self.state.save();
        self.state.concat(form.matrix);
        let own = get_dict(self.doc, &form.dict, b"Resources").cloned();
        let (resources, fonts) = match own {
            Some(own) => (
                Some(std::mem::replace(&mut self.resources, own)),
                std::mem::take(&mut self.fonts),
            ),
            None => (None, self.fonts.clone()),
        };
        self.forms.push(FormFrame {
            id: form.id,
            depth: self.state.depth(),
            resources,
            fonts,
            text: self.text.take(),
        });
    }

    /// Return from the innermost form, undoing any unbalanced `q` in it.
    pub fn leave_form(&mut self) {
        let Some(frame) = self.forms.pop() else {
            return;
        };
        while self.state.depth() >= frame.depth {
            self.state.restore();
        }
        if let Some(resources) = frame.resources {
            self.resources = resources;
        }
        self.fonts = frame.fonts;
        self.text = frame.text;
    }

    /// Execute one operation.
    ///
    /// Text begin/end and images go to `handler` directly. Glyphs and form
    /// calls are returned so the caller decides what to do with them.
    /// Operations with malformed operands are ignored.
    pub fn step(&mut self, op: &Operation, handler: &mut dyn ContentHandler) -> Step {
        match op.operator.as_str() {
            "q" => self.state.save(),
            "Q" => {
                let floor = self.forms.last().map_or(0, |f| f.depth);
                if self.state.depth() <= floor || !self.state.restore() {
                    debug!("unbalanced Q ignored");
                }
            }
            "cm" => {
                if let Some([a, b, c, d, e, f]) = numbers::<6>(op) {
                    self.state.concat(Ctm::new(a, b, c, d, e, f));
                }
            }

            "BT" => {
                self.text = Some(TextObject::begin());
                handler.on_text_begin();
            }
            "ET" => {
                if self.text.take().is_some() {
                    handler.on_text_end();
                }
            }

            "Tf" => {
                let name = op.operands.first().and_then(Operand::as_name);
                let size = op.operands.get(1).and_then(Operand::as_f64);
                if let (Some(name), Some(size)) = (name, size) {
                    let font = self.load_font(name);
                    let text = &mut self.state.current_mut().text;
                    text.font = Some(font);
                    text.font_size = size;
                }
            }
            "Tc" => {
                if let Some([v]) = numbers::<1>(op) {
                    self.state.current_mut().text.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some([v]) = numbers::<1>(op) {
                    self.state.current_mut().text.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some([v]) = numbers::<1>(op) {
                    self.state.current_mut().text.set_h_scaling_percent(v);
                }
            }
            "TL" => {
                if let Some([v]) = numbers::<1>(op) {
                    self.state.current_mut().text.leading = v;
                }
            }
            "Ts" => {
                if let Some([v]) = numbers::<1>(op) {
                    self.state.current_mut().text.rise = v;
                }
            }

            "Td" => {
                if let Some([tx, ty]) = numbers::<2>(op) {
                    self.text_object().move_line(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = numbers::<2>(op) {
                    self.state.current_mut().text.leading = -ty;
                    self.text_object().move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some([a, b, c, d, e, f]) = numbers::<6>(op) {
                    self.text_object().set_matrix(Ctm::new(a, b, c, d, e, f));
                }
            }
            "T*" => self.next_line(),

            "Tj" => {
                if let Some(operand) = op.operands.first() {
                    return self.show(std::slice::from_ref(operand));
                }
            }
            "'" => {
                self.next_line();
                if let Some(operand) = op.operands.first() {
                    return self.show(std::slice::from_ref(operand));
                }
            }
            "\"" => {
                if let [aw, ac, string] = op.operands.as_slice() {
                    if let (Some(aw), Some(ac)) = (aw.as_f64(), ac.as_f64()) {
                        let text = &mut self.state.current_mut().text;
                        text.word_spacing = aw;
                        text.char_spacing = ac;
                    }
                    self.next_line();
                    return self.show(std::slice::from_ref(string));
                }
            }
            "TJ" => {
                if let Some(Operand::Array(items)) = op.operands.first() {
                    return self.show(items);
                }
            }

            "g" | "rg" | "k" => {
                if let Some(color) = op.numbers().and_then(|c| Color::from_components(&c)) {
                    self.state.current_mut().fill = color;
                }
            }
            "cs" => {
                if let Some(name) = op.operands.first().and_then(Operand::as_name) {
                    let initial = self.initial_color(name);
                    self.state.current_mut().fill = initial;
                }
            }
            "sc" | "scn" => {
                let components: Vec<f64> = op.operands.iter().filter_map(Operand::as_f64).collect();
                if let Some(color) = Color::from_components(&components) {
                    self.state.current_mut().fill = color;
                }
            }

            "Do" => {
                if let Some(name) = op.operands.first().and_then(Operand::as_name) {
                    return self.paint_xobject(name, handler);
                }
            }
            "BI" => handler.on_image(ImageEvent {
                bbox: self.unit_square_bbox(),
            }),
            _ => {}
        }
        Step::Other
    }

    fn text_object(&mut self) -> &mut TextObject {
        self.text.get_or_insert_with(TextObject::begin)
    }

    fn next_line(&mut self) {
        let leading = self.state.current().text.leading;
        self.text_object().next_line(leading);
    }

    /// Show the strings and adjustments of a `Tj`/`TJ` operand list.
    fn show(&mut self, items: &[Operand]) -> Step {
        let gs = self.state.current();
        let params = gs.text.clone();
        let ctm = gs.ctm;
        let color = gs.fill;
        let font = params.font.clone().unwrap_or_else(|| self.fallback_font.clone());
        let scale = params.adjustment_scale();
        let space = self.space;

        let mut pieces = Vec::new();
        let text = self.text.get_or_insert_with(TextObject::begin);
        for item in items {
            if let Some(n) = item.as_f64() {
                text.advance(-n / 1000.0 * scale);
                pieces.push(TextPiece::Adjust(n));
                continue;
            }
            let Some(bytes) = item.as_bytes() else {
                continue;
            };
            let hex = matches!(item, Operand::HexString(_));
            for (code, range) in font.split_codes(bytes) {
                let width = font.advance(code);
                let trm = Ctm::new(
                    params.font_size * params.h_scaling,
                    0.0,
                    0.0,
                    params.font_size,
                    0.0,
                    params.rise,
                )
                .concat(text.text_matrix())
                .concat(&ctm);
                let word_space = if font.is_word_space(code, range.len()) {
                    params.word_spacing
                } else {
                    0.0
                };
                let advance = (width * params.font_size + params.char_spacing + word_space)
                    * params.h_scaling;
                let glyph = GlyphEvent {
                    text: font.decode(code),
                    code,
                    bytes: bytes[range].to_vec(),
                    bbox: glyph_bbox(&trm, width, &font, &space),
                    origin: space.to_top_left(trm.transform_point(Point::new(0.0, 0.0))),
                    font_name: font.name.clone(),
                    size: trm.c.hypot(trm.d),
                    color,
                    advance,
                };
                pieces.push(TextPiece::Glyph { glyph, hex });
                text.advance(advance);
            }
        }
        Step::Text { pieces, scale }
    }

    fn load_font(&mut self, name: &[u8]) -> Rc<LoadedFont> {
        if let Some(font) = self.fonts.get(name) {
            return font.clone();
        }
        let font = match get_dict(self.doc, &self.resources, b"Font")
            .and_then(|fonts| get_dict(self.doc, fonts, name))
        {
            Some(dict) => Rc::new(LoadedFont::load(self.doc, dict)),
            None => {
                warn!(
                    font = %String::from_utf8_lossy(name),
                    "font resource not found, using default metrics"
                );
                self.fallback_font.clone()
            }
        };
        self.fonts.insert(name.to_vec(), font.clone());
        font
    }

    /// Fill color a `cs` operator starts with: black in the space's terms.
    fn initial_color(&self, name: &[u8]) -> Color {
        let components = match name {
            b"DeviceGray" | b"CalGray" | b"G" => 1,
            b"DeviceRGB" | b"CalRGB" | b"RGB" => 3,
            b"DeviceCMYK" | b"CMYK" => 4,
            other => self.resource_color_components(other).unwrap_or(1),
        };
        match components {
            3 => Color::Rgb(0.0, 0.0, 0.0),
            4 => Color::Cmyk(0.0, 0.0, 0.0, 1.0),
            _ => Color::Gray(0.0),
        }
    }

    /// Component count of a named color space from `/ColorSpace` resources.
    fn resource_color_components(&self, name: &[u8]) -> Option<usize> {
        let spaces = get_dict(self.doc, &self.resources, b"ColorSpace")?;
        match resolve(self.doc, spaces.get(name).ok()?) {
            Object::Name(family) => Some(device_components(family)),
            Object::Array(items) => {
                let family = resolve(self.doc, items.first()?).as_name().ok()?;
                if family == b"ICCBased" {
                    let stream = resolve(self.doc, items.get(1)?).as_stream().ok()?;
                    get_number(self.doc, &stream.dict, b"N").map(|n| n as usize)
                } else {
                    Some(device_components(family))
                }
            }
            _ => None,
        }
    }

    fn paint_xobject(&mut self, name: &[u8], handler: &mut dyn ContentHandler) -> Step {
        let Some(entry) = get_dict(self.doc, &self.resources, b"XObject")
            .and_then(|xobjects| xobjects.get(name).ok())
        else {
            debug!(name = %String::from_utf8_lossy(name), "XObject not found");
            return Step::Other;
        };
        let id = match entry {
            Object::Reference(id) => Some(*id),
            _ => None,
        };
        let stream = match resolve(self.doc, entry) {
            Object::Stream(stream) => stream,
            _ => {
                debug!(name = %String::from_utf8_lossy(name), "XObject is not a stream");
                return Step::Other;
            }
        };
        match get_name(self.doc, &stream.dict, b"Subtype") {
            Some(b"Image") => {
                handler.on_image(ImageEvent {
                    bbox: self.unit_square_bbox(),
                });
                Step::Other
            }
            Some(b"Form") => self.form_call(name, id, stream),
            _ => Step::Other,
        }
    }

    fn form_call(&self, name: &[u8], id: Option<ObjectId>, stream: &Stream) -> Step {
        let label = String::from_utf8_lossy(name);
        if self.forms.len() >= MAX_FORM_DEPTH {
            warn!(name = %label, "form XObjects nested too deeply, not painted");
            return Step::Other;
        }
        if id.is_some() && self.forms.iter().any(|f| f.id == id) {
            warn!(name = %label, "form XObject paints itself, not painted");
            return Step::Other;
        }
        let ops = match decode_content_stream(stream).and_then(|bytes| content::decode(&bytes)) {
            Ok(ops) => ops,
            Err(e) => {
                warn!(name = %label, error = %e, "unreadable form XObject skipped");
                return Step::Other;
            }
        };
        Step::Form(FormCall {
            name: name.to_vec(),
            dict: stream.dict.clone(),
            ops,
            id,
            matrix: form_matrix(self.doc, &stream.dict),
        })
    }

    /// The unit square through the CTM: where an image lands.
    fn unit_square_bbox(&self) -> BBox {
        let ctm = self.state.current().ctm;
        let corners = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]
            .map(|(x, y)| self.space.to_top_left(ctm.transform_point(Point::new(x, y))));
        bounds(&corners)
    }
}

/// A form's `/Matrix`, identity when absent or malformed.
fn form_matrix(doc: &Document, dict: &Dictionary) -> Ctm {
    let values: Option<Vec<f64>> = get_array(doc, dict, b"Matrix")
        .and_then(|items| items.iter().map(|o| number(resolve(doc, o))).collect());
    match values.as_deref() {
        Some(&[a, b, c, d, e, f]) => Ctm::new(a, b, c, d, e, f),
        _ => Ctm::identity(),
    }
}

fn device_components(name: &[u8]) -> usize {
    match name {
        b"DeviceRGB" | b"CalRGB" | b"Lab" => 3,
        b"DeviceCMYK" => 4,
        _ => 1,
    }
}

/// The first `N` operands as numbers.
fn numbers<const N: usize>(op: &Operation) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    for (slot, operand) in out.iter_mut().zip(op.operands.iter()) {
        *slot = operand.as_f64()?;
    }
    (op.operands.len() >= N).then_some(out)
}

/// Box from the descent to the ascent over the glyph width, in top-left
/// page space.
fn glyph_bbox(trm: &Ctm, width: f64, font: &LoadedFont, space: &PageSpace) -> BBox {
    let descent = font.descent / 1000.0;
    let ascent = font.ascent / 1000.0;
    let corners = [(0.0, descent), (width, descent), (0.0, ascent), (width, ascent)]
        .map(|(x, y)| space.to_top_left(trm.transform_point(Point::new(x, y))));
    bounds(&corners)
}

fn bounds(points: &[Point]) -> BBox {
    let mut bbox = BBox::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        bbox.x0 = bbox.x0.min(p.x);
        bbox.x1 = bbox.x1.max(p.x);
        bbox.top = bbox.top.min(p.y);
        bbox.bottom = bbox.bottom.max(p.y);
    }
    bbox
}

/// Decode a page's content and run it through `handler`.
pub fn interpret_page(
    doc: &Document,
    page_id: ObjectId,
    handler: &mut dyn ContentHandler,
) -> Result<(), BackendError> {
    let ops = content::decode(&page_content_bytes(doc, page_id)?)?;
    PageInterpreter::for_page(doc, page_id)?.run(&ops, handler);
    Ok(())
}
