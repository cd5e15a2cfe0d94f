//! Ring packing: place N hexagons around a center, nearest cells first.
//!
//! [`generate_ring`] grows a greedy frontier from a seed hexagon, using the hexagon
//! neighbor relation to propose candidate centers and an [`OccupancyGrid`] to reject
//! cells that are already taken. The output is sorted by distance from the center, so
//! index `i` can be paired with the entity of rank `i`.
use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::geometry::{Hexagon, Point};

pub mod grid;

pub use grid::{GridKey, OccupancyGrid};

/// Smallest radius at which snapped neighbor points still land on distinct lattice cells.
///
/// Below two pixels the rounding of chained neighbor offsets dominates the lattice
/// spacing and the nearest-first order degrades.
pub const MIN_CELL_RADIUS: f64 = 2.0;

/// Generates `n` non-overlapping hexagons of `radius` around `(center_x, center_y)`.
///
/// The first hexagon is the seed at the center; the remaining `n - 1` are taken from the
/// frontier in order of distance from the seed. Returns an empty vector for `n <= 1` and
/// for non-positive or non-finite radii. Radii below [`MIN_CELL_RADIUS`] still yield `n`
/// cells, but the second cell is no longer guaranteed to touch the seed.
pub fn generate_ring(n: usize, center_x: f64, center_y: f64, radius: f64) -> Vec<Hexagon> {
    if n <= 1 {
        return Vec::new();
    }
    if !radius.is_finite() || radius <= 0.0 {
        warn!("Ring radius must be positive and finite, got {radius}; nothing to place.");
        return Vec::new();
    }

    let seed = Hexagon::new(center_x, center_y, radius, 0.0);
    let origin = seed.center;

    let mut grid = OccupancyGrid::new(radius);
    grid.mark_occupied(origin);

    let mut frontier: HashSet<Point> = seed.neighbors().into_iter().collect();
    let mut hexagons = Vec::with_capacity(n);
    hexagons.push(seed);

    while hexagons.len() < n {
        let Some(candidate) = nearest(&frontier, origin) else {
            warn!(
                "Frontier exhausted after {} of {n} hexagons.",
                hexagons.len()
            );
            break;
        };
        frontier.remove(&candidate);

        let hex = Hexagon::new(candidate.x, candidate.y, radius, 0.0);
        grid.mark_occupied(candidate);
        hexagons.push(hex);

        for p in hex.neighbors() {
            if grid.is_occupied(p) {
                continue;
            }
            if is_claimed(p, &hexagons, &frontier, radius) {
                trace!("Skipping {p:?}: cell already placed or queued.");
                continue;
            }
            frontier.insert(p);
        }
        frontier.retain(|p| !grid.is_occupied(*p));
    }

    // Greedy selection is only locally nearest-first.
    hexagons.sort_by(|a, b| {
        a.center
            .distance(origin)
            .total_cmp(&b.center.distance(origin))
    });

    debug!(
        "Generated ring of {} hexagons (radius {radius}) around ({center_x}, {center_y}).",
        hexagons.len()
    );
    hexagons
}

/// Like [`generate_ring`], but a single item gets the lone center hexagon.
pub fn ring_layout(n: usize, center_x: f64, center_y: f64, radius: f64) -> Vec<Hexagon> {
    match n {
        0 => Vec::new(),
        1 => vec![Hexagon::new(center_x, center_y, radius, 0.0)],
        _ => generate_ring(n, center_x, center_y, radius),
    }
}

/// Whether a cell lies within `radius` of a placed center or a queued candidate.
///
/// Chained neighbor offsets are snapped independently, so one lattice cell can be reached
/// as two points a pixel or two apart that fall into different grid buckets. The first
/// point seen for a cell wins.
fn is_claimed(p: Point, placed: &[Hexagon], frontier: &HashSet<Point>, radius: f64) -> bool {
    placed.iter().any(|h| h.center.distance(p) < radius)
        || frontier.iter().any(|q| q.distance(p) < radius)
}

/// Frontier point closest to `origin`; ties fall back to `y`, then `x`.
fn nearest(frontier: &HashSet<Point>, origin: Point) -> Option<Point> {
    frontier.iter().copied().min_by(|a, b| {
        a.distance(origin)
            .total_cmp(&b.distance(origin))
            .then_with(|| a.y.total_cmp(&b.y))
            .then_with(|| a.x.total_cmp(&b.x))
    })
}
