//! The 14 standard Type1 fonts: name resolution and glyph widths.
//!
//! Every conforming reader ships these fonts, so replacement text is drawn
//! with one of them. Widths (1/1000 em) cover printable ASCII; other codes
//! use a per-family average, which is close enough for layout of short
//! replacement runs and for sizing spans of unembedded standard fonts.

/// One of the 14 standard Type1 fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base14 {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    Symbol,
    ZapfDingbats,
}

const ALL: [Base14; 14] = [
    Base14::Helvetica,
    Base14::HelveticaBold,
    Base14::HelveticaOblique,
    Base14::HelveticaBoldOblique,
    Base14::TimesRoman,
    Base14::TimesBold,
    Base14::TimesItalic,
    Base14::TimesBoldItalic,
    Base14::Courier,
    Base14::CourierBold,
    Base14::CourierOblique,
    Base14::CourierBoldOblique,
    Base14::Symbol,
    Base14::ZapfDingbats,
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Family {
    Helvetica,
    Times,
    Courier,
}

impl Base14 {
    /// PostScript name used as the font's `/BaseFont`.
    pub fn pdf_name(self) -> &'static str {
        match self {
            Base14::Helvetica => "Helvetica",
            Base14::HelveticaBold => "Helvetica-Bold",
            Base14::HelveticaOblique => "Helvetica-Oblique",
            Base14::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Base14::TimesRoman => "Times-Roman",
            Base14::TimesBold => "Times-Bold",
            Base14::TimesItalic => "Times-Italic",
            Base14::TimesBoldItalic => "Times-BoldItalic",
            Base14::Courier => "Courier",
            Base14::CourierBold => "Courier-Bold",
            Base14::CourierOblique => "Courier-Oblique",
            Base14::CourierBoldOblique => "Courier-BoldOblique",
            Base14::Symbol => "Symbol",
            Base14::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Four-letter short alias (`helv`, `tibo`, ...).
    pub fn alias(self) -> &'static str {
        match self {
            Base14::Helvetica => "helv",
            Base14::HelveticaBold => "hebo",
            Base14::HelveticaOblique => "heit",
            Base14::HelveticaBoldOblique => "hebi",
            Base14::TimesRoman => "tiro",
            Base14::TimesBold => "tibo",
            Base14::TimesItalic => "tiit",
            Base14::TimesBoldItalic => "tibi",
            Base14::Courier => "cour",
            Base14::CourierBold => "cobo",
            Base14::CourierOblique => "coit",
            Base14::CourierBoldOblique => "cobi",
            Base14::Symbol => "symb",
            Base14::ZapfDingbats => "zadb",
        }
    }

    /// Resolve an exact PostScript name or short alias.
    ///
    /// A subset prefix (`ABCDEF+`) is ignored. Aliases match
    /// case-insensitively, PostScript names exactly.
    pub fn from_name(name: &str) -> Option<Base14> {
        let name = strip_subset_prefix(name.trim());
        ALL.into_iter()
            .find(|f| f.pdf_name() == name || f.alias().eq_ignore_ascii_case(name))
            .or_else(|| match name {
                "Times" => Some(Base14::TimesRoman),
                "Helvetica-Italic" => Some(Base14::HelveticaOblique),
                "Helvetica-BoldItalic" => Some(Base14::HelveticaBoldOblique),
                "Courier-Italic" => Some(Base14::CourierOblique),
                "Courier-BoldItalic" => Some(Base14::CourierBoldOblique),
                _ => None,
            })
    }

    /// Closest standard font for an arbitrary font name.
    ///
    /// Picks the family from name hints (serif, mono, symbol), then the
    /// weight and slant. Anything unrecognized becomes Helvetica.
    pub fn substitute(name: &str) -> Base14 {
        if let Some(exact) = Base14::from_name(name) {
            return exact;
        }
        let lower = strip_subset_prefix(name.trim()).to_ascii_lowercase();
        if lower.contains("dingbat") {
            return Base14::ZapfDingbats;
        }
        if lower.contains("symbol") {
            return Base14::Symbol;
        }
        let family = if ["cour", "mono", "consol", "typewriter"]
            .iter()
            .any(|h| lower.contains(h))
        {
            Family::Courier
        } else if ["times", "roman", "georgia", "garamond", "minion", "cambria"]
            .iter()
            .any(|h| lower.contains(h))
            || (lower.contains("serif") && !lower.contains("sans"))
        {
            Family::Times
        } else {
            Family::Helvetica
        };
        let bold = ["bold", "black", "heavy", "semibold", "demi"]
            .iter()
            .any(|h| lower.contains(h));
        let italic = lower.contains("italic") || lower.contains("oblique");
        Base14::styled(family, bold, italic)
    }

    fn styled(family: Family, bold: bool, italic: bool) -> Base14 {
        match (family, bold, italic) {
            (Family::Helvetica, false, false) => Base14::Helvetica,
            (Family::Helvetica, true, false) => Base14::HelveticaBold,
            (Family::Helvetica, false, true) => Base14::HelveticaOblique,
            (Family::Helvetica, true, true) => Base14::HelveticaBoldOblique,
            (Family::Times, false, false) => Base14::TimesRoman,
            (Family::Times, true, false) => Base14::TimesBold,
            (Family::Times, false, true) => Base14::TimesItalic,
            (Family::Times, true, true) => Base14::TimesBoldItalic,
            (Family::Courier, false, false) => Base14::Courier,
            (Family::Courier, true, false) => Base14::CourierBold,
            (Family::Courier, false, true) => Base14::CourierOblique,
            (Family::Courier, true, true) => Base14::CourierBoldOblique,
        }
    }

    /// Whether text is written through WinAnsiEncoding.
    ///
    /// Symbol and ZapfDingbats use their built-in encodings.
    pub fn uses_win_ansi(self) -> bool {
        !matches!(self, Base14::Symbol | Base14::ZapfDingbats)
    }

    /// Glyph width in 1/1000 em for a single-byte code.
    pub fn width(self, code: u8) -> f64 {
        let metrics = self.metrics();
        let w = match code {
            32..=126 => metrics.ascii[usize::from(code - 32)],
            _ => metrics.other,
        };
        f64::from(w)
    }

    /// Width of a byte string at the given size, in text space units.
    pub fn string_width(self, bytes: &[u8], size: f64) -> f64 {
        bytes.iter().map(|&b| self.width(b)).sum::<f64>() * size / 1000.0
    }

    /// Ascent and descent in 1/1000 em.
    pub fn ascent_descent(self) -> (f64, f64) {
        match self {
            Base14::Helvetica
            | Base14::HelveticaBold
            | Base14::HelveticaOblique
            | Base14::HelveticaBoldOblique => (718.0, -207.0),
            Base14::TimesRoman
            | Base14::TimesBold
            | Base14::TimesItalic
            | Base14::TimesBoldItalic => (683.0, -217.0),
            Base14::Courier
            | Base14::CourierBold
            | Base14::CourierOblique
            | Base14::CourierBoldOblique => (629.0, -157.0),
            Base14::Symbol | Base14::ZapfDingbats => (800.0, -200.0),
        }
    }

    fn metrics(self) -> &'static Metrics {
        match self {
            Base14::Helvetica | Base14::HelveticaOblique => &HELVETICA,
            Base14::HelveticaBold | Base14::HelveticaBoldOblique => &HELVETICA_BOLD,
            Base14::TimesRoman => &TIMES_ROMAN,
            Base14::TimesBold => &TIMES_BOLD,
            Base14::TimesItalic => &TIMES_ITALIC,
            Base14::TimesBoldItalic => &TIMES_BOLD_ITALIC,
            Base14::Courier
            | Base14::CourierBold
            | Base14::CourierOblique
            | Base14::CourierBoldOblique => &COURIER,
            Base14::Symbol => &SYMBOL,
            Base14::ZapfDingbats => &ZAPF_DINGBATS,
        }
    }
}

/// Remove a six-letter subset tag such as `ABCDEF+` from a font name.
pub fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => {
            rest
        }
        _ => name,
    }
}

struct Metrics {
    /// Widths for codes 32..=126.
    ascii: [u16; 95],
    /// Width used for every other code.
    other: u16,
}

static COURIER: Metrics = Metrics {
    ascii: [600; 95],
    other: 600,
};

static SYMBOL: Metrics = Metrics {
    ascii: [600; 95],
    other: 600,
};

static ZAPF_DINGBATS: Metrics = Metrics {
    ascii: [788; 95],
    other: 788,
};

#[rustfmt::skip]
static HELVETICA: Metrics = Metrics {
    ascii: [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
        1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
        667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
        333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
        556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
    ],
    other: 556,
};

#[rustfmt::skip]
static HELVETICA_BOLD: Metrics = Metrics {
    ascii: [
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
        975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
        667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
        333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
        611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
    ],
    other: 611,
};

#[rustfmt::skip]
static TIMES_ROMAN: Metrics = Metrics {
    ascii: [
        250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
        921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
        556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
        333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
        500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
    ],
    other: 500,
};

#[rustfmt::skip]
static TIMES_BOLD: Metrics = Metrics {
    ascii: [
        250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
        930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
        611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
        333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
        556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
    ],
    other: 556,
};

#[rustfmt::skip]
static TIMES_ITALIC: Metrics = Metrics {
    ascii: [
        250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 675, 675, 675, 500,
        920, 611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722,
        611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389, 278, 389, 422, 500,
        333, 500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500,
        500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541,
    ],
    other: 500,
};

#[rustfmt::skip]
static TIMES_BOLD_ITALIC: Metrics = Metrics {
    ascii: [
        250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333, 250, 278,
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
        832, 667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889, 722, 722,
        611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611, 333, 278, 333, 570, 500,
        333, 500, 500, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778, 556, 500,
        500, 500, 389, 389, 278, 556, 444, 667, 500, 444, 389, 348, 220, 348, 570,
    ],
    other: 500,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_postscript_names_and_aliases() {
        assert_eq!(Base14::from_name("Helvetica"), Some(Base14::Helvetica));
        assert_eq!(Base14::from_name("helv"), Some(Base14::Helvetica));
        assert_eq!(Base14::from_name("HELV"), Some(Base14::Helvetica));
        assert_eq!(Base14::from_name("tibo"), Some(Base14::TimesBold));
        assert_eq!(Base14::from_name("cobi"), Some(Base14::CourierBoldOblique));
        assert_eq!(Base14::from_name("zadb"), Some(Base14::ZapfDingbats));
        assert_eq!(Base14::from_name("Times"), Some(Base14::TimesRoman));
        assert_eq!(Base14::from_name("helvetica"), None);
        assert_eq!(Base14::from_name("ArialMT"), None);
    }

    #[test]
    fn subset_prefix_is_ignored() {
        assert_eq!(
            Base14::from_name("ABCDEF+Times-Bold"),
            Some(Base14::TimesBold)
        );
        assert_eq!(strip_subset_prefix("ABCDEF+Arial"), "Arial");
        assert_eq!(strip_subset_prefix("abcdef+Arial"), "abcdef+Arial");
        assert_eq!(strip_subset_prefix("AB+Arial"), "AB+Arial");
        assert_eq!(strip_subset_prefix("Arial"), "Arial");
    }

    #[test]
    fn substitutes_by_family_and_style() {
        assert_eq!(Base14::substitute("ArialMT"), Base14::Helvetica);
        assert_eq!(Base14::substitute("Arial-BoldMT"), Base14::HelveticaBold);
        assert_eq!(
            Base14::substitute("TimesNewRomanPS-BoldItalicMT"),
            Base14::TimesBoldItalic
        );
        assert_eq!(Base14::substitute("XYZABC+CourierNewPSMT"), Base14::Courier);
        assert_eq!(Base14::substitute("DejaVuSans-Oblique"), Base14::HelveticaOblique);
        assert_eq!(Base14::substitute("NotoSerif"), Base14::TimesRoman);
        assert_eq!(Base14::substitute("Wingdings-Dingbats"), Base14::ZapfDingbats);
        assert_eq!(Base14::substitute(""), Base14::Helvetica);
    }

    #[test]
    fn aliases_round_trip() {
        for font in ALL {
            assert_eq!(Base14::from_name(font.alias()), Some(font));
            assert_eq!(Base14::from_name(font.pdf_name()), Some(font));
        }
    }

    #[test]
    fn helvetica_widths() {
        assert_eq!(Base14::Helvetica.width(b' '), 278.0);
        assert_eq!(Base14::Helvetica.width(b'A'), 667.0);
        assert_eq!(Base14::Helvetica.width(b'~'), 584.0);
        assert_eq!(Base14::Helvetica.width(0xE9), 556.0);
        assert_eq!(Base14::CourierBold.width(b'i'), 600.0);
    }

    #[test]
    fn string_width_scales_with_size() {
        // H=722 e=556 l=222 l=222 o=556 → 2278
        let w = Base14::Helvetica.string_width(b"Hello", 10.0);
        assert!((w - 22.78).abs() < 1e-9);
    }

    #[test]
    fn win_ansi_usage() {
        assert!(Base14::TimesRoman.uses_win_ansi());
        assert!(!Base14::Symbol.uses_win_ansi());
        assert!(!Base14::ZapfDingbats.uses_win_ansi());
    }
}
