//! Font loading for text extraction.
//!
//! Reads a font resource dictionary into a [`LoadedFont`]: how to split a
//! shown string into character codes, each code's width, its Unicode text,
//! and the vertical metrics used for glyph boxes.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object};

use crate::cmap::ToUnicodeMap;
use crate::encoding::{BaseEncoding, SimpleEncoding};
use crate::objects::{get_array, get_dict, get_name, get_number, number, resolve};
use crate::standard_fonts::{Base14, strip_subset_prefix};

/// Default glyph width when a font provides none, in 1/1000 em.
const DEFAULT_WIDTH: f64 = 500.0;

#[derive(Debug, Clone)]
enum Widths {
    /// `/FirstChar` + `/Widths` of a simple font.
    Simple {
        first_char: u32,
        widths: Vec<f64>,
        missing: f64,
    },
    /// `/W` + `/DW` of a CID font.
    Cid { default: f64, map: HashMap<u32, f64> },
    /// Built-in metrics of a standard font.
    Standard(Base14),
    Fixed(f64),
}

/// A font resource ready for glyph positioning and text decoding.
#[derive(Debug, Clone)]
pub struct LoadedFont {
    /// Base font name, subset prefix removed. Empty when unknown.
    pub name: String,
    code_len: usize,
    widths: Widths,
    /// Glyph-space → text-space scale for widths (0.001 except Type3).
    width_scale: f64,
    to_unicode: Option<ToUnicodeMap>,
    encoding: Option<SimpleEncoding>,
    /// Ascent in 1/1000 em.
    pub ascent: f64,
    /// Descent in 1/1000 em (negative below the baseline).
    pub descent: f64,
}

impl LoadedFont {
    /// Stand-in for a font resource that is missing or unreadable.
    pub fn unknown() -> Self {
        Self {
            name: String::new(),
            code_len: 1,
            widths: Widths::Fixed(DEFAULT_WIDTH),
            width_scale: 0.001,
            to_unicode: None,
            encoding: Some(SimpleEncoding::new(BaseEncoding::WinAnsi)),
            ascent: 750.0,
            descent: -250.0,
        }
    }

    /// Load a font from its resource dictionary.
    pub fn load(doc: &Document, dict: &Dictionary) -> Self {
        let subtype = get_name(doc, dict, b"Subtype").unwrap_or(b"Type1".as_slice());
        let base_font = get_name(doc, dict, b"BaseFont")
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_default();
        let name = strip_subset_prefix(&base_font).to_string();
        let standard = Base14::from_name(&name);
        let to_unicode = dict
            .get(b"ToUnicode")
            .ok()
            .and_then(|o| resolve(doc, o).as_stream().ok())
            .and_then(|s| crate::objects::decode_content_stream(s).ok())
            .map(|bytes| ToUnicodeMap::parse(&bytes));

        if subtype == b"Type0" {
            let descendant = get_array(doc, dict, b"DescendantFonts")
                .and_then(|a| a.first())
                .and_then(|o| resolve(doc, o).as_dict().ok());
            let descriptor = descendant.and_then(|d| get_dict(doc, d, b"FontDescriptor"));
            let (ascent, descent) = vertical_metrics(doc, descriptor, standard);
            let widths = descendant
                .map(|d| cid_widths(doc, d))
                .unwrap_or(Widths::Cid {
                    default: 1000.0,
                    map: HashMap::new(),
                });
            let code_len = to_unicode
                .as_ref()
                .and_then(ToUnicodeMap::code_len)
                .filter(|n| (1..=4).contains(n))
                .unwrap_or(2);
            return Self {
                name,
                code_len,
                widths,
                width_scale: 0.001,
                to_unicode,
                encoding: None,
                ascent,
                descent,
            };
        }

        let descriptor = get_dict(doc, dict, b"FontDescriptor");
        let (ascent, descent) = vertical_metrics(doc, descriptor, standard);
        let missing = descriptor
            .and_then(|d| get_number(doc, d, b"MissingWidth"))
            .unwrap_or(0.0);
        let widths = match get_array(doc, dict, b"Widths") {
            Some(list) => Widths::Simple {
                first_char: get_number(doc, dict, b"FirstChar")
                    .map(|n| n.max(0.0) as u32)
                    .unwrap_or(0),
                widths: list
                    .iter()
                    .map(|o| number(resolve(doc, o)).unwrap_or(missing))
                    .collect(),
                missing,
            },
            None => match standard {
                Some(font) => Widths::Standard(font),
                None => Widths::Fixed(if missing > 0.0 { missing } else { DEFAULT_WIDTH }),
            },
        };
        let width_scale = if subtype == b"Type3" {
            get_array(doc, dict, b"FontMatrix")
                .and_then(|m| m.first())
                .and_then(|o| number(resolve(doc, o)))
                .unwrap_or(0.001)
        } else {
            0.001
        };
        let default_base = if subtype == b"TrueType" {
            BaseEncoding::WinAnsi
        } else {
            BaseEncoding::Standard
        };
        let encoding = simple_encoding(doc, dict, default_base);

        Self {
            name,
            code_len: 1,
            widths,
            width_scale,
            to_unicode,
            encoding: Some(encoding),
            ascent,
            descent,
        }
    }

    /// Bytes per character code.
    pub fn code_len(&self) -> usize {
        self.code_len
    }

    /// Split a shown string into `(code, byte range)` pairs.
    ///
    /// A trailing partial code is taken as-is.
    pub fn split_codes(&self, bytes: &[u8]) -> Vec<(u32, std::ops::Range<usize>)> {
        let step = self.code_len.max(1);
        (0..bytes.len())
            .step_by(step)
            .map(|start| {
                let end = (start + step).min(bytes.len());
                let code = bytes[start..end]
                    .iter()
                    .fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
                (code, start..end)
            })
            .collect()
    }

    /// Horizontal advance of a code in text space per unit font size.
    pub fn advance(&self, code: u32) -> f64 {
        let w = match &self.widths {
            Widths::Simple {
                first_char,
                widths,
                missing,
            } => code
                .checked_sub(*first_char)
                .and_then(|i| widths.get(i as usize))
                .copied()
                .unwrap_or(*missing),
            Widths::Cid { default, map } => map.get(&code).copied().unwrap_or(*default),
            Widths::Standard(font) => u8::try_from(code).map(|c| font.width(c)).unwrap_or(0.0),
            Widths::Fixed(w) => *w,
        };
        w * self.width_scale
    }

    /// Unicode text for a code.
    ///
    /// Tries the ToUnicode map, then the simple encoding, then Latin-1 for
    /// single-byte codes. Anything else is U+FFFD.
    pub fn decode(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.as_ref().and_then(|m| m.lookup(code)) {
            return text.to_string();
        }
        if let (Some(enc), Ok(byte)) = (&self.encoding, u8::try_from(code)) {
            if let Some(ch) = enc.decode(byte) {
                return ch.to_string();
            }
            if byte >= 0x20 {
                return char::from(byte).to_string();
            }
        }
        '\u{FFFD}'.to_string()
    }

    /// Whether `code` is the single-byte space that word spacing applies to.
    pub fn is_word_space(&self, code: u32, len: usize) -> bool {
        code == 32 && len == 1
    }
}

fn vertical_metrics(
    doc: &Document,
    descriptor: Option<&Dictionary>,
    standard: Option<Base14>,
) -> (f64, f64) {
    let from_descriptor = descriptor.map(|d| {
        (
            get_number(doc, d, b"Ascent").unwrap_or(0.0),
            get_number(doc, d, b"Descent").unwrap_or(0.0),
        )
    });
    match (from_descriptor, standard) {
        (Some((a, d)), _) if a > d && (a != 0.0 || d != 0.0) => (a, d.min(0.0)),
        (_, Some(font)) => font.ascent_descent(),
        _ => (750.0, -250.0),
    }
}

fn simple_encoding(
    doc: &Document,
    dict: &Dictionary,
    default_base: BaseEncoding,
) -> SimpleEncoding {
    let Ok(obj) = dict.get(b"Encoding") else {
        return SimpleEncoding::new(default_base);
    };
    match resolve(doc, obj) {
        Object::Name(name) => {
            SimpleEncoding::new(BaseEncoding::from_name(name).unwrap_or(default_base))
        }
        Object::Dictionary(enc) => {
            let base = get_name(doc, enc, b"BaseEncoding")
                .and_then(BaseEncoding::from_name)
                .unwrap_or(default_base);
            let mut encoding = SimpleEncoding::new(base);
            let mut code: Option<u32> = None;
            for item in get_array(doc, enc, b"Differences").unwrap_or(&[]) {
                match resolve(doc, item) {
                    Object::Integer(n) => code = u32::try_from(*n).ok(),
                    Object::Name(glyph) => {
                        if let Some(c) = code {
                            if let Ok(byte) = u8::try_from(c) {
                                encoding.set_difference(byte, &String::from_utf8_lossy(glyph));
                            }
                            code = Some(c + 1);
                        }
                    }
                    _ => {}
                }
            }
            encoding
        }
        _ => SimpleEncoding::new(default_base),
    }
}

/// Parse a CID font's `/W` array: `c [w1 w2 ...]` and `cfirst clast w` forms.
fn cid_widths(doc: &Document, font: &Dictionary) -> Widths {
    let default = get_number(doc, font, b"DW").unwrap_or(1000.0);
    let mut map = HashMap::new();
    let items = get_array(doc, font, b"W").unwrap_or(&[]);
    let mut i = 0;
    while i < items.len() {
        let Some(first) = number(resolve(doc, &items[i])) else {
            i += 1;
            continue;
        };
        let first = first.max(0.0) as u32;
        match items.get(i + 1).map(|o| resolve(doc, o)) {
            Some(Object::Array(ws)) => {
                for (offset, w) in ws.iter().enumerate() {
                    if let Some(w) = number(resolve(doc, w)) {
                        map.insert(first + offset as u32, w);
                    }
                }
                i += 2;
            }
            Some(last) => {
                let last = number(last).map(|n| n.max(0.0) as u32);
                let w = items.get(i + 2).and_then(|o| number(resolve(doc, o)));
                if let (Some(last), Some(w)) = (last, w) {
                    for code in first..=last.min(first.saturating_add(0xFFFF)) {
                        map.insert(code, w);
                    }
                }
                i += 3;
            }
            None => break,
        }
    }
    Widths::Cid { default, map }
}
