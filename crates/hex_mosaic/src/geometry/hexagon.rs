//! Regular hexagons and their tiling neighbors.
use std::f64::consts::{FRAC_PI_3, FRAC_PI_6};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{closed_path, BBox, Point};

/// A regular hexagon with vertex 0 at `angle` from the positive X axis.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hexagon {
    pub center: Point,
    /// Circumradius (center to vertex).
    pub radius: f64,
    /// Rotation in radians.
    pub angle: f64,
    /// Vertices in counter-clockwise order, snapped to integers.
    pub vertices: [Point; 6],
}

impl Hexagon {
    /// Creates a hexagon centered at `(x, y)`.
    ///
    /// Vertex `i` is `(x + radius, y)` rotated about the center by `angle + i·60°`.
    pub fn new(x: f64, y: f64, radius: f64, angle: f64) -> Self {
        let center = Point::new(x, y);
        let start = Point::new(x + radius, y);
        let vertices =
            std::array::from_fn(|i| start.rotate(center, angle + (i as f64) * FRAC_PI_3));

        Self {
            center,
            radius,
            angle,
            vertices,
        }
    }

    /// Length of the edge between vertices 0 and 1. Matches `radius` up to snapping.
    pub fn side(&self) -> f64 {
        self.vertices[0].distance(self.vertices[1])
    }

    pub fn bbox(&self) -> BBox {
        // vertices is never empty
        BBox::enclosing(&self.vertices).unwrap_or(BBox::new(self.center, self.center))
    }

    /// Distance between the centers of two edge-adjacent hexagons.
    pub fn neighbor_distance(&self) -> f64 {
        2.0 * self.radius * FRAC_PI_6.cos()
    }

    /// Centers of the six hexagons that tile edge-to-edge around this one.
    pub fn neighbors(&self) -> [Point; 6] {
        let start = Point::new(self.center.x + self.neighbor_distance(), self.center.y);
        std::array::from_fn(|i| {
            start.rotate(self.center, self.angle + FRAC_PI_6 + (i as f64) * FRAC_PI_3)
        })
    }

    /// Outline edges in vertex order, closing back to vertex 0.
    pub fn path(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        closed_path(&self.vertices)
    }
}
