//! ToUnicode CMap parser.
//!
//! Reads the `bfchar`/`bfrange` mappings and the code space ranges of a
//! font's `/ToUnicode` stream. Parsing is token based so mappings may be
//! laid out on any number of lines. Malformed entries are skipped.

use std::collections::HashMap;

/// A parsed ToUnicode CMap: character code → Unicode string.
#[derive(Debug, Clone, Default)]
pub struct ToUnicodeMap {
    mappings: HashMap<u32, String>,
    /// Byte length of codes, from the first code space range.
    code_len: Option<usize>,
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Hex(&'a str),
    ArrayStart,
    ArrayEnd,
    Word(&'a str),
}

impl ToUnicodeMap {
    /// Parse CMap stream content.
    pub fn parse(data: &[u8]) -> Self {
        let text = String::from_utf8_lossy(data);
        let tokens = tokenize(&text);
        let mut map = ToUnicodeMap::default();
        let mut i = 0;
        while i < tokens.len() {
            match tokens[i] {
                Token::Word("begincodespacerange") => {
                    i = map.read_codespace(&tokens, i + 1);
                }
                Token::Word("beginbfchar") => {
                    i = map.read_bfchar(&tokens, i + 1);
                }
                Token::Word("beginbfrange") => {
                    i = map.read_bfrange(&tokens, i + 1);
                }
                _ => i += 1,
            }
        }
        map
    }

    /// Unicode text for a code, if mapped.
    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    /// Code byte length declared by the code space, if any.
    pub fn code_len(&self) -> Option<usize> {
        self.code_len
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    fn read_codespace(&mut self, tokens: &[Token<'_>], mut i: usize) -> usize {
        while let Some(tok) = tokens.get(i) {
            match tok {
                Token::Word("endcodespacerange") => return i + 1,
                Token::Hex(low) => {
                    if self.code_len.is_none() && !low.is_empty() {
                        self.code_len = Some(low.len().div_ceil(2));
                    }
                    i += 2;
                }
                _ => i += 1,
            }
        }
        i
    }

    fn read_bfchar(&mut self, tokens: &[Token<'_>], mut i: usize) -> usize {
        while let Some(tok) = tokens.get(i) {
            match (tok, tokens.get(i + 1)) {
                (Token::Word("endbfchar"), _) => return i + 1,
                (Token::Hex(src), Some(Token::Hex(dst))) => {
                    if let (Some(code), Some(text)) = (parse_code(src), decode_utf16be(dst)) {
                        self.mappings.insert(code, text);
                    }
                    i += 2;
                }
                _ => i += 1,
            }
        }
        i
    }

    fn read_bfrange(&mut self, tokens: &[Token<'_>], mut i: usize) -> usize {
        while let Some(tok) = tokens.get(i) {
            let Token::Hex(low) = tok else {
                if *tok == Token::Word("endbfrange") {
                    return i + 1;
                }
                i += 1;
                continue;
            };
            let Some(Token::Hex(high)) = tokens.get(i + 1) else {
                i += 1;
                continue;
            };
            let (Some(low), Some(high)) = (parse_code(low), parse_code(high)) else {
                i += 2;
                continue;
            };
            match tokens.get(i + 2) {
                Some(Token::Hex(dst)) => {
                    self.insert_incrementing(low, high, dst);
                    i += 3;
                }
                Some(Token::ArrayStart) => {
                    i += 3;
                    let mut code = low;
                    while let Some(Token::Hex(dst)) = tokens.get(i) {
                        if code <= high {
                            if let Some(text) = decode_utf16be(dst) {
                                self.mappings.insert(code, text);
                            }
                        }
                        code = code.saturating_add(1);
                        i += 1;
                    }
                    if tokens.get(i) == Some(&Token::ArrayEnd) {
                        i += 1;
                    }
                }
                _ => i += 2,
            }
        }
        i
    }

    /// Map `low..=high` to consecutive values, incrementing the last UTF-16
    /// unit of `dst` for each code.
    fn insert_incrementing(&mut self, low: u32, high: u32, dst: &str) {
        let Some(mut units) = utf16_units(dst) else {
            return;
        };
        if units.is_empty() || high < low || high - low > 0xFFFF {
            return;
        }
        for code in low..=high {
            if let Ok(text) = String::from_utf16(&units) {
                self.mappings.insert(code, text);
            }
            if let Some(last) = units.last_mut() {
                *last = last.wrapping_add(1);
            }
        }
    }
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => {
                let Some(len) = text[i + 1..].find('>') else {
                    break;
                };
                tokens.push(Token::Hex(&text[i + 1..i + 1 + len]));
                i += len + 2;
            }
            b'[' => {
                tokens.push(Token::ArrayStart);
                i += 1;
            }
            b']' => {
                tokens.push(Token::ArrayEnd);
                i += 1;
            }
            b'%' => {
                while i < bytes.len() && bytes[i] != b'\n' && bytes[i] != b'\r' {
                    i += 1;
                }
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                let start = i;
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'<' | b'[' | b']' | b'%')
                {
                    i += 1;
                }
                tokens.push(Token::Word(&text[start..i]));
            }
        }
    }
    tokens
}

fn hex_digits(hex: &str) -> String {
    hex.chars().filter(|c| !c.is_whitespace()).collect()
}

fn parse_code(hex: &str) -> Option<u32> {
    let digits = hex_digits(hex);
    if digits.is_empty() || digits.len() > 8 {
        return None;
    }
    u32::from_str_radix(&digits, 16).ok()
}

fn utf16_units(hex: &str) -> Option<Vec<u16>> {
    let mut digits = hex_digits(hex);
    if digits.len() % 4 == 2 {
        digits.insert_str(0, "00");
    }
    if digits.len() % 4 != 0 {
        return None;
    }
    digits
        .as_bytes()
        .chunks(4)
        .map(|chunk| {
            std::str::from_utf8(chunk)
                .ok()
                .and_then(|s| u16::from_str_radix(s, 16).ok())
        })
        .collect()
}

fn decode_utf16be(hex: &str) -> Option<String> {
    String::from_utf16(&utf16_units(hex)?).ok()
}
