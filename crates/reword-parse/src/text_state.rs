//! Graphics and text state for the content stream interpreter.
//!
//! [`GraphicsState`] is what `q`/`Q` save and restore: the CTM, the fill
//! color, and the text parameters. The text and line matrices live on
//! [`TextObject`] because they only exist between `BT` and `ET`.

use std::rc::Rc;

use reword_core::{Color, Ctm};

use crate::fonts::LoadedFont;

/// Text parameters set by `Tc`, `Tw`, `Tz`, `TL`, `Ts` and `Tf`.
#[derive(Debug, Clone)]
pub struct TextParams {
    /// Character spacing (`Tc`), unscaled text space units.
    pub char_spacing: f64,
    /// Word spacing (`Tw`), applied to single-byte code 32.
    pub word_spacing: f64,
    /// Horizontal scaling as a fraction (`Tz 100` = 1.0).
    pub h_scaling: f64,
    /// Leading (`TL`).
    pub leading: f64,
    /// Rise (`Ts`).
    pub rise: f64,
    /// Font size (`Tf`).
    pub font_size: f64,
    /// The loaded current font. `None` until the first `Tf`.
    pub font: Option<Rc<LoadedFont>>,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
            font_size: 0.0,
            font: None,
        }
    }
}

impl TextParams {
    /// `Tz`: set horizontal scaling from a percentage.
    pub fn set_h_scaling_percent(&mut self, percent: f64) {
        self.h_scaling = percent / 100.0;
    }

    /// `Tfs · Th`: the factor that turns thousandths of an em into text
    /// space displacement. Also the divisor for TJ adjustments.
    pub fn adjustment_scale(&self) -> f64 {
        self.font_size * self.h_scaling
    }
}

/// State saved by `q` and restored by `Q`.
#[derive(Debug, Clone, Default)]
pub struct GraphicsState {
    pub ctm: Ctm,
    /// Non-stroking (fill) color, used for text.
    pub fill: Color,
    pub text: TextParams,
}

/// Graphics state stack.
#[derive(Debug, Default)]
pub struct StateStack {
    current: GraphicsState,
    saved: Vec<GraphicsState>,
}

impl StateStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &GraphicsState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut GraphicsState {
        &mut self.current
    }

    /// `q`.
    pub fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    /// `Q`. An unbalanced `Q` leaves the state alone and returns `false`.
    pub fn restore(&mut self) -> bool {
        match self.saved.pop() {
            Some(state) => {
                self.current = state;
                true
            }
            None => false,
        }
    }

    /// `cm`: pre-multiply the CTM.
    pub fn concat(&mut self, m: Ctm) {
        self.current.ctm = m.concat(&self.current.ctm);
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}

/// Text and line matrices of the open text object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextObject {
    text_matrix: Ctm,
    line_matrix: Ctm,
}

impl Default for TextObject {
    fn default() -> Self {
        Self::begin()
    }
}

impl TextObject {
    /// `BT`: both matrices start at identity.
    pub fn begin() -> Self {
        Self {
            text_matrix: Ctm::identity(),
            line_matrix: Ctm::identity(),
        }
    }

    pub fn text_matrix(&self) -> &Ctm {
        &self.text_matrix
    }

    pub fn line_matrix(&self) -> &Ctm {
        &self.line_matrix
    }

    /// `Tm`: replace both matrices.
    pub fn set_matrix(&mut self, m: Ctm) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    /// `Td`: offset the start of the next line from the current line start.
    pub fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Ctm::translation(tx, ty).concat(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// `T*`: `0 -TL Td`.
    pub fn next_line(&mut self, leading: f64) {
        self.move_line(0.0, -leading);
    }

    /// Move the text matrix by `tx` text space units after a glyph or a TJ
    /// adjustment.
    pub fn advance(&mut self, tx: f64) {
        self.text_matrix = Ctm::translation(tx, 0.0).concat(&self.text_matrix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_matrix(m: &Ctm, expected: [f64; 6]) {
        let actual = [m.a, m.b, m.c, m.d, m.e, m.f];
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn td_is_relative_to_line_start() {
        let mut obj = TextObject::begin();
        obj.move_line(100.0, 700.0);
        obj.advance(30.0);
        obj.move_line(0.0, -14.0);
        assert_matrix(obj.text_matrix(), [1.0, 0.0, 0.0, 1.0, 100.0, 686.0]);
        assert_matrix(obj.line_matrix(), [1.0, 0.0, 0.0, 1.0, 100.0, 686.0]);
    }

    #[test]
    fn td_after_scaled_tm() {
        let mut obj = TextObject::begin();
        obj.set_matrix(Ctm::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0));
        obj.move_line(50.0, 100.0);
        assert_matrix(obj.text_matrix(), [2.0, 0.0, 0.0, 2.0, 100.0, 200.0]);
    }

    #[test]
    fn advance_moves_only_text_matrix() {
        let mut obj = TextObject::begin();
        obj.set_matrix(Ctm::new(12.0, 0.0, 0.0, 12.0, 72.0, 720.0));
        obj.advance(0.5);
        assert_matrix(obj.text_matrix(), [12.0, 0.0, 0.0, 12.0, 78.0, 720.0]);
        assert_matrix(obj.line_matrix(), [12.0, 0.0, 0.0, 12.0, 72.0, 720.0]);
    }

    #[test]
    fn next_line_uses_leading() {
        let mut obj = TextObject::begin();
        obj.move_line(10.0, 100.0);
        obj.next_line(12.0);
        assert_matrix(obj.text_matrix(), [1.0, 0.0, 0.0, 1.0, 10.0, 88.0]);
    }

    #[test]
    fn save_restore_round_trip() {
        let mut stack = StateStack::new();
        stack.current_mut().fill = Color::Gray(0.5);
        stack.save();
        stack.current_mut().fill = Color::Rgb(1.0, 0.0, 0.0);
        stack.current_mut().text.font_size = 24.0;
        stack.concat(Ctm::translation(5.0, 5.0));
        assert_eq!(stack.depth(), 1);
        assert!(stack.restore());
        assert_eq!(stack.current().fill, Color::Gray(0.5));
        assert_eq!(stack.current().text.font_size, 0.0);
        assert_eq!(stack.current().ctm, Ctm::identity());
    }

    #[test]
    fn unbalanced_restore_is_ignored() {
        let mut stack = StateStack::new();
        stack.current_mut().text.char_spacing = 2.0;
        assert!(!stack.restore());
        assert_eq!(stack.current().text.char_spacing, 2.0);
    }

    #[test]
    fn cm_premultiplies() {
        let mut stack = StateStack::new();
        stack.concat(Ctm::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0));
        stack.concat(Ctm::translation(10.0, 0.0));
        assert_matrix(&stack.current().ctm, [2.0, 0.0, 0.0, 2.0, 20.0, 0.0]);
    }

    #[test]
    fn h_scaling_from_percent() {
        let mut params = TextParams::default();
        params.font_size = 10.0;
        params.set_h_scaling_percent(50.0);
        assert_eq!(params.adjustment_scale(), 5.0);
    }
}
