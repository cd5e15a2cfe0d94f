//! Raster surface collaborator and an `image`-backed implementation.
//!
//! The render pipeline only needs the five operations of [`RasterSurface`]. [`ImageCanvas`]
//! provides them over an [`RgbaImage`], rasterizing clip polygons and strokes with
//! `imageproc`.
use std::path::Path;

use image::{GrayImage, ImageFormat, Luma, Pixel, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
use imageproc::point::Point as RasterPoint;

use crate::error::Result;
use crate::geometry::{closed_path, Point};

/// Drawing operations the render pipeline performs on the shared canvas.
///
/// Implementations are not expected to be safe for concurrent use; callers serialize
/// access.
pub trait RasterSurface {
    /// Restricts subsequent [`RasterSurface::blit`] calls to the polygon's interior.
    fn clip_to_polygon(&mut self, points: &[Point]);

    /// Draws `image` with its top-left corner at `(origin_x, origin_y)`.
    fn blit(&mut self, image: &RgbaImage, origin_x: i32, origin_y: i32);

    fn reset_clip(&mut self);

    /// Outlines the closed polygon through `points`.
    fn stroke_polygon(&mut self, points: &[Point], width: f32, color: Rgba<u8>);

    fn save_png(&self, path: &Path) -> Result<()>;
}

/// In-memory RGBA canvas with an optional polygon clip mask.
#[derive(Clone, Debug)]
pub struct ImageCanvas {
    image: RgbaImage,
    clip: Option<ClipMask>,
}

/// Rasterized polygon covering only the polygon's bounding box.
#[derive(Clone, Debug)]
struct ClipMask {
    origin: (i64, i64),
    mask: GrayImage,
}

impl ClipMask {
    fn from_polygon(points: &[Point]) -> Self {
        let mut poly: Vec<RasterPoint<i32>> = Vec::with_capacity(points.len());
        for p in points {
            let (x, y) = p.rounded();
            let q = RasterPoint::new(x, y);
            if poly.last() != Some(&q) {
                poly.push(q);
            }
        }
        // draw_polygon_mut rejects explicitly closed polygons
        while poly.len() > 1 && poly.first() == poly.last() {
            poly.pop();
        }
        if poly.len() < 3 {
            return Self {
                origin: (0, 0),
                mask: GrayImage::new(0, 0),
            };
        }

        let min_x = poly.iter().map(|p| p.x).min().unwrap_or(0);
        let min_y = poly.iter().map(|p| p.y).min().unwrap_or(0);
        let max_x = poly.iter().map(|p| p.x).max().unwrap_or(0);
        let max_y = poly.iter().map(|p| p.y).max().unwrap_or(0);
        let width = (i64::from(max_x) - i64::from(min_x) + 1) as u32;
        let height = (i64::from(max_y) - i64::from(min_y) + 1) as u32;

        let local: Vec<RasterPoint<i32>> = poly
            .iter()
            .map(|p| RasterPoint::new(p.x - min_x, p.y - min_y))
            .collect();
        let mut mask = GrayImage::new(width, height);
        draw_polygon_mut(&mut mask, &local, Luma([255u8]));

        Self {
            origin: (i64::from(min_x), i64::from(min_y)),
            mask,
        }
    }

    fn contains(&self, x: u32, y: u32) -> bool {
        let lx = i64::from(x) - self.origin.0;
        let ly = i64::from(y) - self.origin.1;
        let (w, h) = (i64::from(self.mask.width()), i64::from(self.mask.height()));
        if lx < 0 || ly < 0 || lx >= w || ly >= h {
            return false;
        }
        self.mask.get_pixel(lx as u32, ly as u32)[0] > 0
    }
}

impl ImageCanvas {
    /// Creates a canvas filled with `background`.
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, background),
            clip: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    fn allows(&self, x: u32, y: u32) -> bool {
        self.clip
            .as_ref()
            .is_none_or(|clip| clip.contains(x, y))
    }
}

impl RasterSurface for ImageCanvas {
    fn clip_to_polygon(&mut self, points: &[Point]) {
        self.clip = Some(ClipMask::from_polygon(points));
    }

    fn blit(&mut self, image: &RgbaImage, origin_x: i32, origin_y: i32) {
        let (w, h) = (self.image.width() as i64, self.image.height() as i64);
        for (px, py, pixel) in image.enumerate_pixels() {
            let x = origin_x as i64 + px as i64;
            let y = origin_y as i64 + py as i64;
            if x < 0 || y < 0 || x >= w || y >= h {
                continue;
            }
            let (x, y) = (x as u32, y as u32);
            if self.allows(x, y) {
                self.image.get_pixel_mut(x, y).blend(pixel);
            }
        }
    }

    fn reset_clip(&mut self) {
        self.clip = None;
    }

    fn stroke_polygon(&mut self, points: &[Point], width: f32, color: Rgba<u8>) {
        if width.is_nan() || width <= 0.0 || points.len() < 2 {
            return;
        }
        let brush = ((width / 2.0).round() as i32).max(0);
        for (a, b) in closed_path(points) {
            let steps = a.distance(b).ceil().max(1.0) as usize;
            for s in 0..=steps {
                let t = s as f64 / steps as f64;
                let p = Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
                draw_filled_circle_mut(&mut self.image, p.rounded(), brush, color);
            }
        }
    }

    fn save_png(&self, path: &Path) -> Result<()> {
        self.image.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}
