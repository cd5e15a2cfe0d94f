//! Planar geometry used by ring packing and compositing.
//!
//! All derived points are snapped to the integer pixel grid, which keeps repeated
//! rotations stable and lets the occupancy grid and the raster surface agree on positions.
pub mod bbox;
pub mod hexagon;
pub mod point;

pub use bbox::BBox;
pub use hexagon::Hexagon;
pub use point::Point;

/// Iterates the edges of the closed polygon through `points`, ending with the edge
/// from the last point back to the first.
pub fn closed_path(points: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let n = points.len();
    (0..n).map(move |i| (points[i], points[(i + 1) % n]))
}
