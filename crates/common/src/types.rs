use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CommonError;

/// Unique identifier for an observed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, for log lines and markup attributes.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

/// Axis-aligned rectangle in CSS pixels. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Grow each side outward by the given amounts. Negative values shrink;
    /// the size never drops below zero.
    pub fn expand(&self, top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            x: self.x - left,
            y: self.y - top,
            width: (self.width + left + right).max(0.0),
            height: (self.height + top + bottom).max(0.0),
        }
    }

    /// Inclusive intersection: rectangles that only share an edge yield a
    /// zero-area rect rather than `None`.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 < x0 || y1 < y0 {
            return None;
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// Fraction of an element that must be visible, within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Threshold(f32);

impl Threshold {
    /// Any intersection at all, one pixel is enough.
    pub const ANY: Threshold = Threshold(0.0);

    pub fn new(value: f32) -> Result<Self, CommonError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(CommonError::ThresholdOutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    pub fn is_any(&self) -> bool {
        self.0 == 0.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(0.1)
    }
}

impl TryFrom<f32> for Threshold {
    type Error = CommonError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for f32 {
    fn from(t: Threshold) -> f32 {
        t.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_id_uniqueness() {
        let a = ElementId::new();
        let b = ElementId::new();
        assert_ne!(a, b);
        assert_eq!(a.short().len(), 8);
    }

    #[test]
    fn intersection_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);
        let i = a.intersection(&b).unwrap();
        assert_eq!(i, Rect::new(50.0, 50.0, 50.0, 50.0));
        assert_eq!(i.area(), 2500.0);
    }

    #[test]
    fn intersection_edge_touch_is_zero_area() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(0.0, 100.0, 100.0, 50.0);
        let i = a.intersection(&b).unwrap();
        assert_eq!(i.area(), 0.0);
    }

    #[test]
    fn intersection_disjoint() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(0.0, 10.5, 10.0, 10.0);
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn expand_grows_each_side() {
        let r = Rect::new(0.0, 0.0, 100.0, 100.0).expand(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r, Rect::new(-40.0, -10.0, 160.0, 140.0));
    }

    #[test]
    fn expand_negative_never_inverts() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).expand(-20.0, -20.0, -20.0, -20.0);
        assert_eq!(r.width, 0.0);
        assert_eq!(r.height, 0.0);
    }

    #[test]
    fn threshold_bounds() {
        assert!(Threshold::new(0.0).is_ok());
        assert!(Threshold::new(1.0).is_ok());
        assert_eq!(
            Threshold::new(1.5),
            Err(CommonError::ThresholdOutOfRange(1.5))
        );
        assert!(Threshold::new(-0.1).is_err());
        assert!(Threshold::new(f32::NAN).is_err());
        assert_eq!(Threshold::default().value(), 0.1);
    }

    #[test]
    fn threshold_deserialize_rejects_out_of_range() {
        let ok: Threshold = serde_json::from_str("0.25").unwrap();
        assert_eq!(ok.value(), 0.25);
        assert!(serde_json::from_str::<Threshold>("2.0").is_err());
    }
}
