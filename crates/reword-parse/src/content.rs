//! Content stream codec.
//!
//! [`decode`] splits raw content stream bytes into [`Operation`]s, each
//! carrying the operands that preceded it. [`encode`] writes operations back
//! out through lopdf, so a page's content can be rewritten after redaction.
//! Names and strings are kept as raw bytes and inline images keep their
//! header verbatim, so operations that are not touched encode to equivalent
//! bytes.

use lopdf::content::Content;
use lopdf::{Dictionary, Object, StringFormat};

use crate::error::BackendError;

/// An operand in a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Integer(i64),
    Real(f64),
    Bool(bool),
    Null,
    /// Name without the leading `/`, `#xx` escapes decoded.
    Name(Vec<u8>),
    /// `(...)` string, escapes decoded.
    String(Vec<u8>),
    /// `<...>` string, hex decoded.
    HexString(Vec<u8>),
    Array(Vec<Operand>),
    Dictionary(Vec<(Vec<u8>, Operand)>),
    /// Payload of a `BI ... ID ... EI` sequence.
    InlineImage(InlineImage),
}

/// An inline image: the raw dictionary text between `BI` and `ID` and the
/// sample data between `ID` and `EI`.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub header: Vec<u8>,
    pub data: Vec<u8>,
}

impl Operand {
    /// Numeric value, `None` for non-numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Operand::Integer(i) => Some(*i as f64),
            Operand::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&[u8]> {
        match self {
            Operand::Name(n) => Some(n),
            _ => None,
        }
    }

    /// Bytes of either string form.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Operand::String(s) | Operand::HexString(s) => Some(s),
            _ => None,
        }
    }
}

/// An operator with its operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub operator: String,
    pub operands: Vec<Operand>,
}

impl Operation {
    pub fn new(operator: &str, operands: Vec<Operand>) -> Self {
        Self {
            operator: operator.to_string(),
            operands,
        }
    }

    /// All operands as numbers, or `None` if any is not a number.
    pub fn numbers(&self) -> Option<Vec<f64>> {
        self.operands.iter().map(Operand::as_f64).collect()
    }
}

/// Split content stream bytes into operations.
///
/// # Errors
///
/// Returns [`BackendError::Interpreter`] for unterminated strings, arrays,
/// dictionaries, or inline images, and for bad numbers or hex digits.
pub fn decode(input: &[u8]) -> Result<Vec<Operation>, BackendError> {
    let mut cursor = Cursor { input, pos: 0 };
    let mut ops = Vec::new();
    let mut stack = Vec::new();
    loop {
        cursor.skip_blank();
        let Some(b) = cursor.peek() else {
            break;
        };
        if is_regular(b) && !is_number_start(b) {
            let word = cursor.regular_token();
            match word {
                b"true" => stack.push(Operand::Bool(true)),
                b"false" => stack.push(Operand::Bool(false)),
                b"null" => stack.push(Operand::Null),
                b"BI" => {
                    let image = cursor.inline_image()?;
                    stack.clear();
                    ops.push(Operation::new("BI", vec![Operand::InlineImage(image)]));
                }
                _ => ops.push(Operation {
                    operator: String::from_utf8_lossy(word).into_owned(),
                    operands: std::mem::take(&mut stack),
                }),
            }
        } else if b == b']' || b == b')' || b == b'>' {
            return Err(BackendError::Interpreter(format!(
                "unexpected '{}' at offset {}",
                char::from(b),
                cursor.pos
            )));
        } else {
            stack.push(cursor.operand()?);
        }
    }
    Ok(ops)
}

/// Write operations as content stream bytes, one operation per line.
///
/// Ordinary operations go through lopdf's content encoder. Its `Object`
/// has no form for inline image sample data, so `BI ... ID ... EI`
/// sequences are spliced in between the encoded runs byte for byte.
///
/// # Errors
///
/// Returns [`BackendError::Write`] if lopdf fails to encode a run.
pub fn encode(ops: &[Operation]) -> Result<Vec<u8>, BackendError> {
    let mut out = Vec::new();
    let mut run = Vec::new();
    for op in ops {
        if let [Operand::InlineImage(image)] = op.operands.as_slice() {
            flush_run(&mut out, &mut run)?;
            out.extend_from_slice(b"BI ");
            out.extend_from_slice(&image.header);
            out.extend_from_slice(b" ID ");
            out.extend_from_slice(&image.data);
            out.extend_from_slice(b"\nEI\n");
            continue;
        }
        let operands = op.operands.iter().map(Operand::to_object).collect();
        run.push(lopdf::content::Operation::new(&op.operator, operands));
    }
    flush_run(&mut out, &mut run)?;
    Ok(out)
}

fn flush_run(
    out: &mut Vec<u8>,
    run: &mut Vec<lopdf::content::Operation>,
) -> Result<(), BackendError> {
    if run.is_empty() {
        return Ok(());
    }
    let content = Content {
        operations: std::mem::take(run),
    };
    let bytes = content
        .encode()
        .map_err(|e| BackendError::Write(format!("content stream: {e}")))?;
    out.extend_from_slice(&bytes);
    out.push(b'\n');
    Ok(())
}

impl Operand {
    /// The lopdf object for this operand. Reals outside `f32` become 0.
    fn to_object(&self) -> Object {
        match self {
            Operand::Integer(i) => Object::Integer(*i),
            Operand::Real(r) if r.abs() <= f64::from(f32::MAX) => Object::Real(*r as f32),
            Operand::Real(_) => Object::Integer(0),
            Operand::Bool(b) => Object::Boolean(*b),
            Operand::Null | Operand::InlineImage(_) => Object::Null,
            Operand::Name(n) => Object::Name(n.clone()),
            Operand::String(s) => Object::String(s.clone(), StringFormat::Literal),
            Operand::HexString(s) => Object::String(s.clone(), StringFormat::Hexadecimal),
            Operand::Array(items) => {
                Object::Array(items.iter().map(Operand::to_object).collect())
            }
            Operand::Dictionary(entries) => {
                let mut dict = Dictionary::new();
                for (key, value) in entries {
                    dict.set(key.clone(), value.to_object());
                }
                Object::Dictionary(dict)
            }
        }
    }
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

fn is_number_start(b: u8) -> bool {
    b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.')
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn error(&self, what: &str) -> BackendError {
        BackendError::Interpreter(format!("{what} at offset {}", self.pos))
    }

    /// Skip whitespace and `%` comments.
    fn skip_blank(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while self.peek().is_some_and(|b| b != b'\n' && b != b'\r') {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    fn regular_token(&mut self) -> &'a [u8] {
        let start = self.pos;
        while self.peek().is_some_and(is_regular) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// One operand starting at the current position.
    fn operand(&mut self) -> Result<Operand, BackendError> {
        match self.peek() {
            Some(b'(') => self.literal_string().map(Operand::String),
            Some(b'<') if self.peek_at(1) == Some(b'<') => self.dictionary(),
            Some(b'<') => self.hex_string().map(Operand::HexString),
            Some(b'[') => self.array(),
            Some(b'/') => Ok(Operand::Name(self.name())),
            Some(b) if is_number_start(b) => self.number(),
            Some(b) if is_regular(b) => {
                let word = self.regular_token();
                Ok(match word {
                    b"true" => Operand::Bool(true),
                    b"false" => Operand::Bool(false),
                    b"null" => Operand::Null,
                    other => Operand::Name(other.to_vec()),
                })
            }
            Some(b) => Err(self.error(&format!("unexpected byte 0x{b:02X}"))),
            None => Err(self.error("unexpected end of content")),
        }
    }

    fn number(&mut self) -> Result<Operand, BackendError> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let mut real = false;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.pos += 1;
            } else if b == b'.' && !real {
                real = true;
                self.pos += 1;
            } else {
                break;
            }
        }
        // Tolerate junk like "1.2.3" or "--5" by skipping the rest of the token.
        let end = self.pos;
        while self.peek().is_some_and(is_regular) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.input[start..end]).unwrap_or("");
        let text = text.trim_start_matches('+');
        if real {
            let text = if text == "." || text == "-." { "0" } else { text };
            text.parse()
                .map(Operand::Real)
                .map_err(|_| self.error(&format!("invalid number {text:?}")))
        } else if text.is_empty() || text == "-" {
            Ok(Operand::Integer(0))
        } else {
            text.parse::<i64>()
                .map(Operand::Integer)
                .or_else(|_| text.parse::<f64>().map(Operand::Real))
                .map_err(|_| self.error(&format!("invalid number {text:?}")))
        }
    }

    fn name(&mut self) -> Vec<u8> {
        self.pos += 1;
        let raw = self.regular_token();
        let mut name = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == b'#' && i + 2 < raw.len() {
                if let (Some(hi), Some(lo)) = (hex_value(raw[i + 1]), hex_value(raw[i + 2])) {
                    name.push((hi << 4) | lo);
                    i += 3;
                    continue;
                }
            }
            name.push(raw[i]);
            i += 1;
        }
        name
    }

    fn literal_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut out = Vec::new();
        let mut depth = 1u32;
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                    out.push(b);
                }
                b'\\' => self.escape(&mut out),
                _ => out.push(b),
            }
        }
        Err(self.error("unterminated string"))
    }

    /// Decode one escape sequence; the backslash is already consumed.
    fn escape(&mut self, out: &mut Vec<u8>) {
        let Some(b) = self.peek() else {
            return;
        };
        self.pos += 1;
        match b {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'\r' => {
                if self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
            }
            b'\n' => {}
            b'0'..=b'7' => {
                let mut value = u32::from(b - b'0');
                for _ in 0..2 {
                    match self.peek() {
                        Some(d @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(d - b'0');
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                out.push((value & 0xFF) as u8);
            }
            other => out.push(other),
        }
    }

    fn hex_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut digits = Vec::new();
        loop {
            match self.peek() {
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b) if is_whitespace(b) => self.pos += 1,
                Some(b) => {
                    let v = hex_value(b).ok_or_else(|| self.error("invalid hex digit"))?;
                    digits.push(v);
                    self.pos += 1;
                }
                None => return Err(self.error("unterminated hex string")),
            }
        }
        if digits.len() % 2 == 1 {
            digits.push(0);
        }
        Ok(digits.chunks(2).map(|p| (p[0] << 4) | p[1]).collect())
    }

    fn array(&mut self) -> Result<Operand, BackendError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_blank();
            match self.peek() {
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Operand::Array(items));
                }
                Some(_) => items.push(self.operand()?),
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    fn dictionary(&mut self) -> Result<Operand, BackendError> {
        self.pos += 2;
        let mut entries = Vec::new();
        loop {
            self.skip_blank();
            match (self.peek(), self.peek_at(1)) {
                (Some(b'>'), Some(b'>')) => {
                    self.pos += 2;
                    return Ok(Operand::Dictionary(entries));
                }
                (Some(b'/'), _) => {
                    let key = self.name();
                    self.skip_blank();
                    let value = self.operand()?;
                    entries.push((key, value));
                }
                (Some(_), _) => return Err(self.error("expected name key in dictionary")),
                (None, _) => return Err(self.error("unterminated dictionary")),
            }
        }
    }

    /// Read `<header> ID <data> EI` after `BI`.
    fn inline_image(&mut self) -> Result<InlineImage, BackendError> {
        let header_start = self.pos;
        let header_end = loop {
            self.skip_blank();
            let token_start = self.pos;
            match self.peek() {
                None => return Err(self.error("inline image without ID")),
                Some(b) if is_regular(b) && !is_number_start(b) => {
                    if self.regular_token() == b"ID" {
                        break token_start;
                    }
                }
                Some(_) => {
                    self.operand()?;
                }
            }
        };
        // A single whitespace byte separates ID from the data.
        if self.peek().is_some_and(is_whitespace) {
            self.pos += 1;
        }
        let data_start = self.pos;
        while self.pos < self.input.len() {
            let at_ei = self.input[self.pos..].starts_with(b"EI")
                && (self.pos == data_start || is_whitespace(self.input[self.pos - 1]))
                && self.peek_at(2).is_none_or(|b| !is_regular(b));
            if at_ei {
                let mut data_end = self.pos;
                if data_end > data_start && is_whitespace(self.input[data_end - 1]) {
                    data_end -= 1;
                }
                let header = trim(&self.input[header_start..header_end]).to_vec();
                let data = self.input[data_start..data_end].to_vec();
                self.pos += 2;
                return Ok(InlineImage { header, data });
            }
            self.pos += 1;
        }
        Err(self.error("inline image without EI"))
    }
}

fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !is_whitespace(*b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !is_whitespace(*b)).map_or(start, |i| i + 1);
    &bytes[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(src: &[u8]) -> Vec<Operation> {
        decode(src).unwrap()
    }

    #[test]
    fn operators_collect_preceding_operands() {
        let parsed = ops(b"BT /F1 12 Tf 72 720 Td (Hello) Tj ET");
        let names: Vec<&str> = parsed.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(names, vec!["BT", "Tf", "Td", "Tj", "ET"]);
        assert_eq!(
            parsed[1].operands,
            vec![Operand::Name(b"F1".to_vec()), Operand::Integer(12)]
        );
        assert_eq!(parsed[3].operands, vec![Operand::String(b"Hello".to_vec())]);
    }

    #[test]
    fn numbers() {
        let parsed = ops(b"1 -2 +3 .5 -.25 4. 0 0 cm");
        assert_eq!(
            parsed[0].numbers().unwrap(),
            vec![1.0, -2.0, 3.0, 0.5, -0.25, 4.0, 0.0, 0.0]
        );
        assert!(matches!(parsed[0].operands[3], Operand::Real(_)));
    }

    #[test]
    fn string_escapes_and_nesting() {
        let parsed = ops(b"(a\\(b\\) (c) \\\\ \\101\\n) Tj");
        assert_eq!(parsed[0].operands[0].as_bytes().unwrap(), b"a(b) (c) \\ A\n");
    }

    #[test]
    fn hex_strings_and_tj_arrays() {
        let parsed = ops(b"[<48 65> -250 (llo) 12.5] TJ <4>Tj");
        let Operand::Array(items) = &parsed[0].operands[0] else {
            panic!("expected array");
        };
        assert_eq!(items[0], Operand::HexString(b"He".to_vec()));
        assert_eq!(items[1], Operand::Integer(-250));
        assert_eq!(items[3], Operand::Real(12.5));
        assert_eq!(parsed[1].operands[0].as_bytes().unwrap(), &[0x40]);
    }

    #[test]
    fn names_with_hex_escapes() {
        let parsed = ops(b"/F#231 9 Tf");
        assert_eq!(parsed[0].operands[0].as_name().unwrap(), b"F#1");
    }

    #[test]
    fn comments_are_skipped() {
        let parsed = ops(b"% header\nq % save\nQ");
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn marked_content_dictionary() {
        let parsed = ops(b"/Span <</MCID 3 /ActualText (x)>> BDC EMC");
        assert_eq!(parsed[0].operator, "BDC");
        let Operand::Dictionary(entries) = &parsed[0].operands[1] else {
            panic!("expected dictionary");
        };
        assert_eq!(entries[0], (b"MCID".to_vec(), Operand::Integer(3)));
    }

    #[test]
    fn inline_image_is_kept_verbatim() {
        let parsed = ops(b"q BI /W 2 /H 1 /CS /G /BPC 8 ID \x00\xFF\nEI Q");
        assert_eq!(parsed.len(), 3);
        let [Operand::InlineImage(image)] = parsed[1].operands.as_slice() else {
            panic!("expected inline image");
        };
        assert_eq!(image.header, b"/W 2 /H 1 /CS /G /BPC 8");
        assert_eq!(image.data, b"\x00\xFF");
        let again = ops(&encode(&parsed).unwrap());
        assert_eq!(again, parsed);
    }

    #[test]
    fn unterminated_input_is_an_error() {
        assert!(decode(b"(abc Tj").is_err());
        assert!(decode(b"[1 2 TJ").is_err());
        assert!(decode(b"BI /W 1 ID xyz").is_err());
        assert!(decode(b"<4G> Tj").is_err());
        assert!(decode(b") Tj").is_err());
    }

    #[test]
    fn encode_reproduces_operations() {
        let src: &[u8] = b"q 1 0 0 1 10.5 -3 cm BT /F1 12 Tf [(A\\)) -120 <00FF>] TJ ET Q";
        let parsed = ops(src);
        let encoded = encode(&parsed).unwrap();
        assert_eq!(ops(&encoded), parsed);
        let text = String::from_utf8_lossy(&encoded);
        assert!(text.contains("1 0 0 1 10.5 -3 cm"));
        assert!(text.contains("/F1 12 Tf"));
        assert!(text.ends_with("Q\n"));
    }

    #[test]
    fn encoded_reals_and_dictionaries() {
        let parsed = vec![
            Operation::new("Td", vec![Operand::Real(12.0), Operand::Real(f64::NAN)]),
            Operation::new(
                "BDC",
                vec![
                    Operand::Name(b"Span".to_vec()),
                    Operand::Dictionary(vec![(b"MCID".to_vec(), Operand::Integer(3))]),
                ],
            ),
            Operation::new("EMC", vec![]),
        ];
        let encoded = encode(&parsed).unwrap();
        let text = String::from_utf8_lossy(&encoded);
        assert!(text.starts_with("12 0 Td\n"), "{text}");
        let again = ops(&encoded);
        assert_eq!(again[1], parsed[1]);
    }

    #[test]
    fn inline_image_between_runs() {
        let parsed = ops(b"q 2 0 0 2 0 0 cm BI /W 1 /H 1 ID \x80\nEI Q");
        let encoded = encode(&parsed).unwrap();
        assert!(encoded.starts_with(b"q\n2 0 0 2 0 0 cm\nBI /W 1 /H 1 ID \x80\nEI\nQ"));
        assert_eq!(ops(&encoded), parsed);
    }
}
