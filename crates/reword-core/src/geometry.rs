//! Geometry primitives: points, affine matrices, and bounding boxes.

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Affine transformation matrix `[a b c d e f]` as used by PDF content streams.
///
/// Maps `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ctm {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Ctm {
    fn default() -> Self {
        Self::identity()
    }
}

impl Ctm {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// The identity matrix.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// A pure translation.
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Matrix product `self × other`: apply `self` first, then `other`.
    pub fn concat(&self, other: &Ctm) -> Ctm {
        Ctm {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point through this matrix.
    pub fn transform_point(&self, p: Point) -> Point {
        Point {
            x: self.a * p.x + self.c * p.y + self.e,
            y: self.b * p.x + self.d * p.y + self.f,
        }
    }
}

/// Bounding box with top-left origin coordinate system.
///
/// - `x0`: left edge
/// - `top`: top edge (distance from top of page)
/// - `x1`: right edge
/// - `bottom`: bottom edge (distance from top of page)
///
/// Serialized as a 4-element array `[x0, top, x1, bottom]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[f64; 4]")]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Width of the bounding box.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the bounding box.
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Compute the union of two bounding boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            top: self.top.min(other.top),
            x1: self.x1.max(other.x1),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Centre point of the box.
    pub fn center(&self) -> Point {
        Point::new((self.x0 + self.x1) / 2.0, (self.top + self.bottom) / 2.0)
    }

    /// Whether `p` lies inside the box (edges inclusive).
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.top && p.y <= self.bottom
    }

    /// True when every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        [self.x0, self.top, self.x1, self.bottom]
            .iter()
            .all(|v| v.is_finite())
    }

    /// True when the edges are swapped (`x0 > x1` or `top > bottom`).
    pub fn is_inverted(&self) -> bool {
        self.x0 > self.x1 || self.top > self.bottom
    }

    /// Bottom-left corner in top-left origin space.
    pub fn bottom_left(&self) -> Point {
        Point::new(self.x0, self.bottom)
    }
}

impl From<[f64; 4]> for BBox {
    fn from(v: [f64; 4]) -> Self {
        BBox::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f64; 4] {
    fn from(b: BBox) -> Self {
        [b.x0, b.top, b.x1, b.bottom]
    }
}

impl Serialize for BBox {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut seq = s.serialize_tuple(4)?;
        for v in <[f64; 4]>::from(*self) {
            seq.serialize_element(&WireNumber(v))?;
        }
        seq.end()
    }
}

struct WireNumber(f64);

impl Serialize for WireNumber {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        serialize_number(&self.0, s)
    }
}

/// Write a number without a fraction as a JSON integer (`12`, not `12.0`).
///
/// Values beyond 2^53 and non-finite values are written as floats.
pub fn serialize_number<S: Serializer>(n: &f64, s: S) -> Result<S::Ok, S::Error> {
    if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER {
        s.serialize_i64(*n as i64)
    } else {
        s.serialize_f64(*n)
    }
}

const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Serde adapter for `Option<BBox>` that writes `None` as `[]`.
///
/// Accepts `[]`, `null`, or a 4-element array when reading.
pub mod optional_bbox {
    use super::BBox;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<BBox>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(b) => b.serialize(s),
            None => <[f64; 0]>::default().serialize(s),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<BBox>, D::Error> {
        let raw: Option<Vec<f64>> = Option::deserialize(d)?;
        match raw.as_deref() {
            None | Some([]) => Ok(None),
            Some(&[x0, top, x1, bottom]) => Ok(Some(BBox::new(x0, top, x1, bottom))),
            Some(other) => Err(D::Error::invalid_length(
                other.len(),
                &"an empty array or 4 numbers",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_new() {
        let bbox = BBox::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(bbox.x0, 10.0);
        assert_eq!(bbox.top, 20.0);
        assert_eq!(bbox.x1, 30.0);
        assert_eq!(bbox.bottom, 40.0);
    }

    #[test]
    fn test_bbox_dimensions() {
        let bbox = BBox::new(10.0, 20.0, 50.0, 60.0);
        assert_eq!(bbox.width(), 40.0);
        assert_eq!(bbox.height(), 40.0);
    }

    #[test]
    fn test_bbox_union() {
        let a = BBox::new(10.0, 20.0, 30.0, 40.0);
        let b = BBox::new(5.0, 25.0, 35.0, 45.0);
        assert_eq!(a.union(&b), BBox::new(5.0, 20.0, 35.0, 45.0));
    }

    #[test]
    fn test_bbox_contains_edges() {
        let b = BBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(b.contains(Point::new(0.0, 10.0)));
        assert!(b.contains(b.center()));
        assert!(!b.contains(Point::new(10.5, 5.0)));
    }

    #[test]
    fn test_bbox_inverted_and_finite() {
        assert!(BBox::new(5.0, 0.0, 1.0, 1.0).is_inverted());
        assert!(!BBox::new(1.0, 1.0, 1.0, 1.0).is_inverted());
        assert!(!BBox::new(f64::NAN, 0.0, 1.0, 1.0).is_finite());
    }

    #[test]
    fn test_bbox_serializes_as_array() {
        let json = serde_json::to_string(&BBox::new(10.0, 10.0, 50.0, 20.0)).unwrap();
        assert_eq!(json, "[10,10,50,20]");
        let json = serde_json::to_string(&BBox::new(-0.5, 0.0, 72.25, 1e300)).unwrap();
        assert_eq!(json, "[-0.5,0,72.25,1e300]");
        let back: BBox = serde_json::from_str("[10,10,50,20]").unwrap();
        assert_eq!(back, BBox::new(10.0, 10.0, 50.0, 20.0));
    }

    #[test]
    fn test_ctm_concat_applies_left_first() {
        let scale = Ctm::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let shift = Ctm::translation(10.0, 5.0);
        let m = scale.concat(&shift);
        assert_eq!(m.transform_point(Point::new(1.0, 1.0)), Point::new(12.0, 7.0));
    }

    #[test]
    fn test_ctm_identity_is_neutral() {
        let m = Ctm::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        assert_eq!(m.concat(&Ctm::identity()), m);
        assert_eq!(Ctm::identity().concat(&m), m);
    }
}
