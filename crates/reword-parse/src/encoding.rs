//! Single-byte font encodings and glyph names.
//!
//! Used to map character codes of simple fonts to Unicode when a font has
//! no ToUnicode CMap, and to encode replacement text for the standard fonts.

use std::collections::HashMap;

/// A base encoding named by a simple font's `/Encoding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseEncoding {
    #[default]
    Standard,
    WinAnsi,
    MacRoman,
}

impl BaseEncoding {
    /// Parse an encoding name such as `WinAnsiEncoding`.
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"StandardEncoding" => Some(BaseEncoding::Standard),
            b"WinAnsiEncoding" => Some(BaseEncoding::WinAnsi),
            b"MacRomanEncoding" => Some(BaseEncoding::MacRoman),
            _ => None,
        }
    }

    /// Decode one code, `None` when the code is unassigned.
    pub fn decode(self, code: u8) -> Option<char> {
        match self {
            BaseEncoding::WinAnsi => win_ansi_decode(code),
            BaseEncoding::MacRoman => mac_roman_decode(code),
            BaseEncoding::Standard => standard_decode(code),
        }
    }
}

/// A simple font's code → Unicode table: a base encoding plus `/Differences`.
#[derive(Debug, Clone, Default)]
pub struct SimpleEncoding {
    base: BaseEncoding,
    differences: HashMap<u8, char>,
}

impl SimpleEncoding {
    pub fn new(base: BaseEncoding) -> Self {
        Self {
            base,
            differences: HashMap::new(),
        }
    }

    /// Override one code with a glyph name. Unknown names are ignored.
    pub fn set_difference(&mut self, code: u8, glyph_name: &str) {
        if let Some(ch) = glyph_name_to_char(glyph_name) {
            self.differences.insert(code, ch);
        }
    }

    pub fn decode(&self, code: u8) -> Option<char> {
        self.differences
            .get(&code)
            .copied()
            .or_else(|| self.base.decode(code))
    }
}

const WIN_ANSI_HIGH: [Option<char>; 32] = [
    Some('€'),
    None,
    Some('‚'),
    Some('ƒ'),
    Some('„'),
    Some('…'),
    Some('†'),
    Some('‡'),
    Some('ˆ'),
    Some('‰'),
    Some('Š'),
    Some('‹'),
    Some('Œ'),
    None,
    Some('Ž'),
    None,
    None,
    Some('‘'),
    Some('’'),
    Some('“'),
    Some('”'),
    Some('•'),
    Some('–'),
    Some('—'),
    Some('˜'),
    Some('™'),
    Some('š'),
    Some('›'),
    Some('œ'),
    None,
    Some('ž'),
    Some('Ÿ'),
];

/// Decode a WinAnsiEncoding code.
pub fn win_ansi_decode(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(char::from(code)),
        0x80..=0x9F => WIN_ANSI_HIGH[usize::from(code - 0x80)],
        _ => None,
    }
}

/// Encode a character into WinAnsiEncoding, `None` if it has no code.
pub fn win_ansi_encode(ch: char) -> Option<u8> {
    let cp = u32::from(ch);
    match cp {
        0x20..=0x7E | 0xA0..=0xFF => u8::try_from(cp).ok(),
        _ => WIN_ANSI_HIGH
            .iter()
            .position(|c| *c == Some(ch))
            .and_then(|i| u8::try_from(0x80 + i).ok()),
    }
}

const MAC_ROMAN_HIGH: &str = "ÄÅÇÉÑÖÜáàâäãåçéèêëíìîïñóòôöõúùûü†°¢£§•¶ß®©™´¨≠ÆØ∞±≤≥¥µ∂∑∏π∫ªºΩæø¿¡¬√ƒ≈∆«»…\u{A0}ÀÃÕŒœ–—“”‘’÷◊ÿŸ⁄€‹›ﬁﬂ‡·‚„‰ÂÊÁËÈÍÎÏÌÓÔ\u{F8FF}ÒÚÛÙıˆ˜¯˘˙˚¸˝˛ˇ";

fn mac_roman_decode(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E => Some(char::from(code)),
        0x80..=0xFF => MAC_ROMAN_HIGH.chars().nth(usize::from(code - 0x80)),
        _ => None,
    }
}

const STANDARD_DIFFERENCES: [(u8, char); 56] = [
    (0xA1, '¡'),
    (0xA2, '¢'),
    (0xA3, '£'),
    (0xA4, '⁄'),
    (0xA5, '¥'),
    (0xA6, 'ƒ'),
    (0xA7, '§'),
    (0xA8, '¤'),
    (0xA9, '\''),
    (0xAA, '“'),
    (0xAB, '«'),
    (0xAC, '‹'),
    (0xAD, '›'),
    (0xAE, 'ﬁ'),
    (0xAF, 'ﬂ'),
    (0xB1, '–'),
    (0xB2, '†'),
    (0xB3, '‡'),
    (0xB4, '·'),
    (0xB6, '¶'),
    (0xB7, '•'),
    (0xB8, '‚'),
    (0xB9, '„'),
    (0xBA, '”'),
    (0xBB, '»'),
    (0xBC, '…'),
    (0xBD, '‰'),
    (0xBF, '¿'),
    (0xC1, '`'),
    (0xC2, '´'),
    (0xC3, 'ˆ'),
    (0xC4, '˜'),
    (0xC5, '¯'),
    (0xC6, '˘'),
    (0xC7, '˙'),
    (0xC8, '¨'),
    (0xCA, '˚'),
    (0xCB, '¸'),
    (0xCD, '˝'),
    (0xCE, '˛'),
    (0xCF, 'ˇ'),
    (0xD0, '—'),
    (0xE1, 'Æ'),
    (0xE3, 'ª'),
    (0xE8, 'Ł'),
    (0xE9, 'Ø'),
    (0xEA, 'Œ'),
    (0xEB, 'º'),
    (0xF1, 'æ'),
    (0xF5, 'ı'),
    (0xF8, 'ł'),
    (0xF9, 'ø'),
    (0xFA, 'œ'),
    (0xFB, 'ß'),
    (0x27, '’'),
    (0x60, '‘'),
];

fn standard_decode(code: u8) -> Option<char> {
    if let Some((_, ch)) = STANDARD_DIFFERENCES.iter().find(|(c, _)| *c == code) {
        return Some(*ch);
    }
    match code {
        0x20..=0x7E => Some(char::from(code)),
        _ => None,
    }
}

const GLYPH_NAMES: &[(&str, char)] = &[
    ("space", ' '),
    ("exclam", '!'),
    ("quotedbl", '"'),
    ("numbersign", '#'),
    ("dollar", '$'),
    ("percent", '%'),
    ("ampersand", '&'),
    ("quotesingle", '\''),
    ("quoteright", '’'),
    ("parenleft", '('),
    ("parenright", ')'),
    ("asterisk", '*'),
    ("plus", '+'),
    ("comma", ','),
    ("hyphen", '-'),
    ("minus", '−'),
    ("period", '.'),
    ("slash", '/'),
    ("zero", '0'),
    ("one", '1'),
    ("two", '2'),
    ("three", '3'),
    ("four", '4'),
    ("five", '5'),
    ("six", '6'),
    ("seven", '7'),
    ("eight", '8'),
    ("nine", '9'),
    ("colon", ':'),
    ("semicolon", ';'),
    ("less", '<'),
    ("equal", '='),
    ("greater", '>'),
    ("question", '?'),
    ("at", '@'),
    ("bracketleft", '['),
    ("backslash", '\\'),
    ("bracketright", ']'),
    ("asciicircum", '^'),
    ("underscore", '_'),
    ("grave", '`'),
    ("quoteleft", '‘'),
    ("braceleft", '{'),
    ("bar", '|'),
    ("braceright", '}'),
    ("asciitilde", '~'),
    ("bullet", '•'),
    ("endash", '–'),
    ("emdash", '—'),
    ("ellipsis", '…'),
    ("quotedblleft", '“'),
    ("quotedblright", '”'),
    ("quotesinglbase", '‚'),
    ("quotedblbase", '„'),
    ("guillemotleft", '«'),
    ("guillemotright", '»'),
    ("guilsinglleft", '‹'),
    ("guilsinglright", '›'),
    ("dagger", '†'),
    ("daggerdbl", '‡'),
    ("trademark", '™'),
    ("copyright", '©'),
    ("registered", '®'),
    ("degree", '°'),
    ("section", '§'),
    ("paragraph", '¶'),
    ("Euro", '€'),
    ("sterling", '£'),
    ("yen", '¥'),
    ("cent", '¢'),
    ("fi", 'ﬁ'),
    ("fl", 'ﬂ'),
    ("ff", 'ﬀ'),
    ("ffi", 'ﬃ'),
    ("ffl", 'ﬄ'),
    ("germandbls", 'ß'),
    ("AE", 'Æ'),
    ("ae", 'æ'),
    ("OE", 'Œ'),
    ("oe", 'œ'),
    ("Oslash", 'Ø'),
    ("oslash", 'ø'),
    ("dotlessi", 'ı'),
    ("nbspace", '\u{A0}'),
    ("multiply", '×'),
    ("divide", '÷'),
    ("plusminus", '±'),
];

const ACCENTS: &[(&str, [char; 2])] = &[
    ("acute", ['\u{301}', '´']),
    ("grave", ['\u{300}', '`']),
    ("circumflex", ['\u{302}', 'ˆ']),
    ("dieresis", ['\u{308}', '¨']),
    ("tilde", ['\u{303}', '˜']),
    ("cedilla", ['\u{327}', '¸']),
    ("ring", ['\u{30A}', '˚']),
    ("caron", ['\u{30C}', 'ˇ']),
];

/// Map a glyph name to a character.
///
/// Handles single letters, `uniXXXX` and `uXXXX` forms, a table of common
/// names, and Latin letters with a named accent (`eacute`, `Ccedilla`).
pub fn glyph_name_to_char(name: &str) -> Option<char> {
    let name = name.split('.').next().unwrap_or(name);
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphabetic() {
            return Some(c);
        }
    }
    if let Some(hex) = name.strip_prefix("uni") {
        if hex.len() == 4 {
            return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
        }
    }
    if let Some(hex) = name.strip_prefix('u') {
        if (4..=6).contains(&hex.len()) && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
        }
    }
    if let Some((_, ch)) = GLYPH_NAMES.iter().find(|(n, _)| *n == name) {
        return Some(*ch);
    }
    accented(name)
}

fn accented(name: &str) -> Option<char> {
    let (accent, [combining, spacing]) = ACCENTS
        .iter()
        .find(|(suffix, _)| name.ends_with(suffix))
        .copied()?;
    let base = &name[..name.len() - accent.len()];
    if base.is_empty() {
        return Some(spacing);
    }
    let mut it = base.chars();
    let letter = it.next()?;
    if it.next().is_some() || !letter.is_ascii_alphabetic() {
        return None;
    }
    compose(letter, combining)
}

/// Compose a Latin-1 letter with a combining accent, when the precomposed
/// form exists in Latin-1 or Latin Extended-A.
fn compose(letter: char, combining: char) -> Option<char> {
    const TABLE: &[(char, char, char)] = &[
        ('A', '\u{300}', 'À'),
        ('A', '\u{301}', 'Á'),
        ('A', '\u{302}', 'Â'),
        ('A', '\u{303}', 'Ã'),
        ('A', '\u{308}', 'Ä'),
        ('A', '\u{30A}', 'Å'),
        ('C', '\u{327}', 'Ç'),
        ('C', '\u{30C}', 'Č'),
        ('E', '\u{300}', 'È'),
        ('E', '\u{301}', 'É'),
        ('E', '\u{302}', 'Ê'),
        ('E', '\u{308}', 'Ë'),
        ('E', '\u{30C}', 'Ě'),
        ('I', '\u{300}', 'Ì'),
        ('I', '\u{301}', 'Í'),
        ('I', '\u{302}', 'Î'),
        ('I', '\u{308}', 'Ï'),
        ('N', '\u{303}', 'Ñ'),
        ('O', '\u{300}', 'Ò'),
        ('O', '\u{301}', 'Ó'),
        ('O', '\u{302}', 'Ô'),
        ('O', '\u{303}', 'Õ'),
        ('O', '\u{308}', 'Ö'),
        ('S', '\u{30C}', 'Š'),
        ('U', '\u{300}', 'Ù'),
        ('U', '\u{301}', 'Ú'),
        ('U', '\u{302}', 'Û'),
        ('U', '\u{308}', 'Ü'),
        ('Y', '\u{301}', 'Ý'),
        ('Y', '\u{308}', 'Ÿ'),
        ('Z', '\u{30C}', 'Ž'),
    ];
    let upper = letter.to_ascii_uppercase();
    let (_, _, composed) = TABLE
        .iter()
        .find(|(l, c, _)| *l == upper && *c == combining)?;
    if letter.is_ascii_lowercase() {
        composed.to_lowercase().next()
    } else {
        Some(*composed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_ansi_round_trips_printable_range() {
        for code in (0x20u8..=0x7E).chain(0xA0..=0xFF) {
            let ch = win_ansi_decode(code).unwrap();
            assert_eq!(win_ansi_encode(ch), Some(code));
        }
    }

    #[test]
    fn win_ansi_high_block() {
        assert_eq!(win_ansi_decode(0x80), Some('€'));
        assert_eq!(win_ansi_decode(0x81), None);
        assert_eq!(win_ansi_encode('€'), Some(0x80));
        assert_eq!(win_ansi_encode('—'), Some(0x97));
        assert_eq!(win_ansi_encode('Ÿ'), Some(0x9F));
        assert_eq!(win_ansi_encode('漢'), None);
        assert_eq!(win_ansi_encode('\n'), None);
    }

    #[test]
    fn mac_roman_high_block() {
        assert_eq!(MAC_ROMAN_HIGH.chars().count(), 128);
        assert_eq!(mac_roman_decode(0x80), Some('Ä'));
        assert_eq!(mac_roman_decode(0x8E), Some('é'));
        assert_eq!(mac_roman_decode(0xD2), Some('“'));
        assert_eq!(mac_roman_decode(0xFF), Some('ˇ'));
    }

    #[test]
    fn standard_encoding_quotes() {
        assert_eq!(BaseEncoding::Standard.decode(0x27), Some('’'));
        assert_eq!(BaseEncoding::Standard.decode(0x60), Some('‘'));
        assert_eq!(BaseEncoding::Standard.decode(b'A'), Some('A'));
        assert_eq!(BaseEncoding::Standard.decode(0xAE), Some('ﬁ'));
        assert_eq!(BaseEncoding::Standard.decode(0xB5), None);
        assert_eq!(BaseEncoding::Standard.decode(0x90), None);
    }

    #[test]
    fn glyph_names() {
        assert_eq!(glyph_name_to_char("A"), Some('A'));
        assert_eq!(glyph_name_to_char("space"), Some(' '));
        assert_eq!(glyph_name_to_char("uni20AC"), Some('€'));
        assert_eq!(glyph_name_to_char("u1F600"), Some('😀'));
        assert_eq!(glyph_name_to_char("eacute"), Some('é'));
        assert_eq!(glyph_name_to_char("Ccedilla"), Some('Ç'));
        assert_eq!(glyph_name_to_char("scaron"), Some('š'));
        assert_eq!(glyph_name_to_char("acute"), Some('´'));
        assert_eq!(glyph_name_to_char("a.sc"), Some('a'));
        assert_eq!(glyph_name_to_char("g123"), None);
    }

    #[test]
    fn differences_override_base() {
        let mut enc = SimpleEncoding::new(BaseEncoding::WinAnsi);
        enc.set_difference(65, "Euro");
        enc.set_difference(66, "not-a-glyph");
        assert_eq!(enc.decode(65), Some('€'));
        assert_eq!(enc.decode(66), Some('B'));
        assert_eq!(enc.decode(0xE9), Some('é'));
    }

    #[test]
    fn encoding_names() {
        assert_eq!(
            BaseEncoding::from_name(b"WinAnsiEncoding"),
            Some(BaseEncoding::WinAnsi)
        );
        assert_eq!(BaseEncoding::from_name(b"Identity-H"), None);
    }
}
