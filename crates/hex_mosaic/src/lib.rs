#![forbid(unsafe_code)]
//! hex_mosaic: hexagonal ring packing and concurrent compositing of ranked picture mosaics.
//!
//! Modules:
//! - geometry: snapped points, bounding boxes, regular hexagons
//! - ring: occupancy grid and the nearest-first ring generator
//! - pipeline: scoring/aggregation of ranked entities and the bounded render pipeline
//! - source, images, canvas: collaborator traits plus reference implementations
//! - runner: end-to-end driver configured by [`config::MosaicConfig`]
pub mod canvas;
pub mod config;
pub mod error;
pub mod geometry;
pub mod images;
pub mod pipeline;
pub mod ring;
pub mod runner;
pub mod source;

/// Convenient re-exports for common types. Import with `use hex_mosaic::prelude::*;`.
pub mod prelude {
    pub use crate::canvas::{ImageCanvas, RasterSurface};
    pub use crate::config::MosaicConfig;
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{BBox, Hexagon, Point};
    pub use crate::images::{DiskCache, ImageSource, LocalFiles};
    pub use crate::pipeline::render::{
        render, zip_placements, Placement, RenderFailure, RenderOptions, RenderReport, Stroke,
    };
    pub use crate::pipeline::scoring::{
        merge_lists, rank_entities, score, sort_ranked, RankedEntity, FAVOURITE_CHARACTER_SCORE,
        PRIMARY_SCORE,
    };
    pub use crate::ring::{generate_ring, ring_layout, OccupancyGrid, MIN_CELL_RADIUS};
    pub use crate::runner::MosaicRunner;
    pub use crate::source::{EntitySource, ImageRef, ListEntry, ListKind, Status};
}
