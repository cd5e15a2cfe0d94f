//! Configuration for a mosaic run.
use std::path::PathBuf;

use image::Rgba;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pipeline::render::{default_workers, RenderOptions, Stroke};
use crate::ring::MIN_CELL_RADIUS;

/// Canvas, layout and styling inputs for [`crate::runner::MosaicRunner`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MosaicConfig {
    /// Canvas width and height in pixels.
    pub canvas_size: (u32, u32),
    /// Ring center in canvas pixels. `None` centers the ring on the canvas.
    pub center: Option<(f64, f64)>,
    /// Circumradius of every cell.
    pub cell_radius: f64,
    pub stroke_width: f32,
    /// RGBA outline color.
    pub stroke_color: [u8; 4],
    /// RGBA fill for unpainted pixels.
    pub background: [u8; 4],
    /// Render pool size. `None` uses the available parallelism.
    pub workers: Option<usize>,
    /// Where the PNG is written.
    pub output: PathBuf,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            canvas_size: (2000, 2000),
            center: None,
            cell_radius: 100.0,
            stroke_width: 10.0,
            stroke_color: [0, 0, 0, 255],
            background: [255, 255, 255, 255],
            workers: None,
            output: PathBuf::from("mosaic.png"),
        }
    }
}

impl MosaicConfig {
    /// Creates a new [`MosaicConfig`] with the specified canvas size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas_size: (width, height),
            ..Default::default()
        }
    }

    pub fn with_center(mut self, x: f64, y: f64) -> Self {
        self.center = Some((x, y));
        self
    }

    pub fn with_cell_radius(mut self, cell_radius: f64) -> Self {
        self.cell_radius = cell_radius;
        self
    }

    /// Sets the outline width and color.
    pub fn with_stroke(mut self, width: f32, color: [u8; 4]) -> Self {
        self.stroke_width = width;
        self.stroke_color = color;
        self
    }

    pub fn with_background(mut self, background: [u8; 4]) -> Self {
        self.background = background;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Ring center, defaulting to the middle of the canvas.
    pub fn center(&self) -> (f64, f64) {
        self.center.unwrap_or((
            f64::from(self.canvas_size.0) / 2.0,
            f64::from(self.canvas_size.1) / 2.0,
        ))
    }

    pub fn workers(&self) -> usize {
        self.workers.unwrap_or_else(default_workers)
    }

    pub fn background_color(&self) -> Rgba<u8> {
        Rgba(self.background)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::new(self.workers()).with_stroke(Stroke {
            width: self.stroke_width,
            color: Rgba(self.stroke_color),
        })
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.canvas_size.0 == 0 || self.canvas_size.1 == 0 {
            return Err(Error::InvalidConfig(
                "canvas_size must be > 0 in both components".into(),
            ));
        }
        if !self.cell_radius.is_finite() || self.cell_radius < MIN_CELL_RADIUS {
            return Err(Error::InvalidConfig(format!(
                "cell_radius must be >= {MIN_CELL_RADIUS}"
            )));
        }
        if !self.stroke_width.is_finite() || self.stroke_width < 0.0 {
            return Err(Error::InvalidConfig("stroke_width must be >= 0".into()));
        }
        if let Some((x, y)) = self.center {
            if !x.is_finite() || !y.is_finite() {
                return Err(Error::InvalidConfig("center must be finite".into()));
            }
        }
        if self.workers == Some(0) {
            return Err(Error::InvalidConfig("workers must be > 0".into()));
        }
        if self.output.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("output path must not be empty".into()));
        }

        Ok(())
    }
}
