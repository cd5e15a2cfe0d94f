//! Points on the snapped pixel grid.
use std::hash::{Hash, Hasher};

use glam::DVec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 2D point in canvas coordinates.
///
/// Equality and hashing compare the bit patterns of both coordinates (with `-0.0`
/// folded into `0.0`), so points produced by [`Point::rotate`] can be used as set keys.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns both coordinates as a tuple.
    pub fn value(self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn as_dvec2(self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Rotates this point around `base` by `angle` radians (counter-clockwise for positive
    /// angles) and snaps the result to the nearest integer coordinates.
    pub fn rotate(self, base: Point, angle: f64) -> Point {
        let pivot = base.as_dvec2();
        let rotated = DVec2::from_angle(angle).rotate(self.as_dvec2() - pivot) + pivot;
        Point::new(snap(rotated.x), snap(rotated.y))
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Point) -> f64 {
        self.as_dvec2().distance(other.as_dvec2())
    }

    /// Coordinates rounded to integers, as used for pixel placement.
    pub fn rounded(self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }

    fn bits(self) -> (u64, u64) {
        ((self.x + 0.0).to_bits(), (self.y + 0.0).to_bits())
    }
}

#[inline]
fn snap(v: f64) -> f64 {
    // `+ 0.0` folds negative zero
    v.round() + 0.0
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

impl From<DVec2> for Point {
    fn from(v: DVec2) -> Self {
        Point::new(v.x, v.y)
    }
}

impl From<Point> for DVec2 {
    fn from(p: Point) -> Self {
        p.as_dvec2()
    }
}

impl From<mint::Point2<f64>> for Point {
    fn from(p: mint::Point2<f64>) -> Self {
        Point::new(p.x, p.y)
    }
}

impl From<Point> for mint::Point2<f64> {
    fn from(p: Point) -> Self {
        mint::Point2 { x: p.x, y: p.y }
    }
}
