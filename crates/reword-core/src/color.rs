//! Fill colors as they appear in content streams, and their packed sRGB form.

/// A fill color in one of the device color spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// DeviceGray, 0.0 (black) to 1.0 (white).
    Gray(f64),
    /// DeviceRGB components, each 0.0 to 1.0.
    Rgb(f64, f64, f64),
    /// DeviceCMYK components, each 0.0 to 1.0.
    Cmyk(f64, f64, f64, f64),
}

impl Default for Color {
    fn default() -> Self {
        Color::black()
    }
}

impl Color {
    pub fn black() -> Self {
        Color::Gray(0.0)
    }

    /// Build a color from operand components, choosing the space by arity.
    ///
    /// One component is gray, three RGB, four CMYK. Other arities (pattern
    /// or unusual color spaces) return `None`.
    pub fn from_components(c: &[f64]) -> Option<Self> {
        match *c {
            [g] => Some(Color::Gray(g)),
            [r, g, b] => Some(Color::Rgb(r, g, b)),
            [c, m, y, k] => Some(Color::Cmyk(c, m, y, k)),
            _ => None,
        }
    }

    /// Convert to `(r, g, b)` in 0.0..=1.0.
    ///
    /// CMYK uses the naive `(1 - c) * (1 - k)` conversion.
    pub fn to_rgb(&self) -> (f64, f64, f64) {
        match *self {
            Color::Gray(g) => (g, g, g),
            Color::Rgb(r, g, b) => (r, g, b),
            Color::Cmyk(c, m, y, k) => (
                (1.0 - c) * (1.0 - k),
                (1.0 - m) * (1.0 - k),
                (1.0 - y) * (1.0 - k),
            ),
        }
    }

    /// Pack into a `0xRRGGBB` integer.
    pub fn to_packed_rgb(&self) -> u32 {
        let (r, g, b) = self.to_rgb();
        (channel(r) << 16) | (channel(g) << 8) | channel(b)
    }
}

fn channel(v: f64) -> u32 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u32
}
