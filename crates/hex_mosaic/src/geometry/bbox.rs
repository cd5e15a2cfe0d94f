//! Axis-aligned bounding boxes read through rounding accessors.
use imageproc::rect::Rect;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Axis-aligned box spanned by a start corner and a (signed) size.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BBox {
    /// Creates the box spanning `start` to `end`; the size is `end - start`.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            x: start.x,
            y: start.y,
            w: end.x - start.x,
            h: end.y - start.y,
        }
    }

    /// Smallest box containing every point, or `None` for an empty slice.
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min, mut max) = (*first, *first);
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self::new(min, max))
    }

    /// `(x, y, w, h)`, each rounded to the nearest integer.
    pub fn values(&self) -> (f64, f64, f64, f64) {
        (self.x.round(), self.y.round(), self.w.round(), self.h.round())
    }

    pub fn start(&self) -> (i32, i32) {
        let (x, y, _, _) = self.values();
        (x as i32, y as i32)
    }

    pub fn end(&self) -> (i32, i32) {
        let (x, y, w, h) = self.values();
        ((x + w) as i32, (y + h) as i32)
    }

    pub fn size(&self) -> (i32, i32) {
        let (_, _, w, h) = self.values();
        (w as i32, h as i32)
    }

    /// Raster view of the rounded box. Degenerate sizes are widened to one pixel.
    pub fn rect(&self) -> Rect {
        let (x, y) = self.start();
        let (w, h) = self.size();
        Rect::at(x, y).of_size(w.max(1) as u32, h.max(1) as u32)
    }
}
