//! High-level runner that turns an entity source into a saved mosaic.
use std::sync::{Mutex, PoisonError};

use tracing::{debug, info};

use crate::canvas::{ImageCanvas, RasterSurface};
use crate::config::MosaicConfig;
use crate::error::{Error, Result};
use crate::geometry::Hexagon;
use crate::images::ImageSource;
use crate::pipeline::render::{render, zip_placements, RenderReport};
use crate::pipeline::scoring::{rank_entities, RankedEntity};
use crate::ring::{ring_layout, MIN_CELL_RADIUS};
use crate::source::EntitySource;

pub struct MosaicRunner {
    /// Run configuration applied to this runner.
    pub config: MosaicConfig,
}

impl MosaicRunner {
    pub fn try_new(config: MosaicConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn new(config: MosaicConfig) -> Self {
        debug_assert!(
            config.canvas_size.0 > 0 && config.canvas_size.1 > 0,
            "canvas_size must be > 0 in both components"
        );
        debug_assert!(
            config.cell_radius.is_finite() && config.cell_radius >= MIN_CELL_RADIUS,
            "cell_radius must be finite and >= {MIN_CELL_RADIUS}"
        );

        Self { config }
    }

    /// One cell per item, nearest to the configured center first.
    pub fn layout(&self, count: usize) -> Vec<Hexagon> {
        let (cx, cy) = self.config.center();
        ring_layout(count, cx, cy, self.config.cell_radius)
    }

    fn blank_canvas(&self) -> ImageCanvas {
        let (w, h) = self.config.canvas_size;
        ImageCanvas::new(w, h, self.config.background_color())
    }

    /// Strokes the outlines of a `count`-cell ring without any images.
    pub fn outline(&self, count: usize) -> ImageCanvas {
        let mut canvas = self.blank_canvas();
        let stroke = self.config.render_options().stroke;
        for hexagon in self.layout(count) {
            canvas.stroke_polygon(&hexagon.vertices, stroke.width, stroke.color);
        }
        canvas
    }

    /// Lays out and paints already-ranked entities onto a fresh canvas.
    ///
    /// Fails with [`Error::InvalidConfig`] when the configured radius cannot produce one
    /// cell per entity.
    pub fn render_ranked<I: ImageSource + ?Sized>(
        &self,
        ranked: Vec<RankedEntity>,
        images: &I,
    ) -> Result<(ImageCanvas, RenderReport)> {
        let layout = self.layout(ranked.len());
        if layout.len() != ranked.len() {
            return Err(Error::InvalidConfig(format!(
                "cell_radius {} yields {} cells for {} entities",
                self.config.cell_radius,
                layout.len(),
                ranked.len()
            )));
        }
        let placements = zip_placements(layout, ranked);
        debug!("Laid out {} placements.", placements.len());

        let canvas = Mutex::new(self.blank_canvas());
        let report = render(
            &placements,
            images,
            &canvas,
            &self.config.render_options(),
        );
        let canvas = canvas.into_inner().unwrap_or_else(PoisonError::into_inner);
        Ok((canvas, report))
    }

    /// Ranks, lays out, renders and saves the mosaic to the configured output path.
    ///
    /// Source errors abort the run before anything is drawn. Image failures only skip
    /// their cell.
    pub fn run<E, I>(&self, entities: &E, images: &I) -> Result<RenderReport>
    where
        E: EntitySource + ?Sized,
        I: ImageSource + ?Sized,
    {
        let ranked = rank_entities(entities)?;
        let (canvas, report) = self.render_ranked(ranked, images)?;

        if let Some(parent) = self.config.output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        canvas.save_png(&self.config.output)?;
        info!("Saved mosaic to {}.", self.config.output.display());
        Ok(report)
    }
}
