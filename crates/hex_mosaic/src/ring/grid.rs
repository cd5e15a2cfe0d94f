//! Spatial hash used to answer "is this cell already taken" without exact float equality.
use std::collections::HashSet;

use crate::geometry::Point;

/// Quantized bucket of the occupancy grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridKey(
    /// Bucket index along the X axis.
    pub i64,
    /// Bucket index along the Y axis.
    pub i64,
);

/// Grow-only set of occupied buckets with bucket size `radius`.
///
/// Two points share a bucket iff `round(x / radius)` and `round(y / radius)` agree.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    occupied: HashSet<GridKey>,
    radius: f64,
}

impl OccupancyGrid {
    pub fn new(radius: f64) -> Self {
        debug_assert!(radius > 0.0, "radius must be > 0");
        Self {
            occupied: HashSet::new(),
            radius,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Bucket containing `p`.
    pub fn key(&self, p: Point) -> GridKey {
        GridKey(
            (p.x / self.radius).round() as i64,
            (p.y / self.radius).round() as i64,
        )
    }

    pub fn is_occupied(&self, p: Point) -> bool {
        self.occupied.contains(&self.key(p))
    }

    pub fn mark_occupied(&mut self, p: Point) {
        self.occupied.insert(self.key(p));
    }

    /// Number of occupied buckets.
    pub fn len(&self) -> usize {
        self.occupied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }
}
