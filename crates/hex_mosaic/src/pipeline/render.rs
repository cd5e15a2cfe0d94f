//! Bounded-concurrency render pipeline.
//!
//! Each [`Placement`] goes through two phases:
//! - prepare: load the entity's image bytes, decode, and center-crop/resize to the
//!   hexagon's bounding box. Runs in parallel on a fixed pool of worker threads.
//! - composite: clip to the hexagon, blit, reset the clip, stroke the outline. Runs under
//!   the single lock that guards the shared canvas.
//!
//! A placement whose preparation fails (or panics) is logged and skipped; its cell stays
//! unpainted.
use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};
use std::thread;

use crossbeam_channel::{bounded, unbounded};
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use tracing::{debug, info, warn};

use crate::canvas::RasterSurface;
use crate::error::{Error, Result};
use crate::geometry::Hexagon;
use crate::images::ImageSource;
use crate::pipeline::scoring::RankedEntity;
use crate::source::ImageRef;

/// A ranked entity assigned to a cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub hexagon: Hexagon,
    pub entity: RankedEntity,
}

/// Pairs rank `i` with hexagon `i`.
///
/// # Panics
/// If the lengths differ. The ring layout is always generated for `ranked.len()` items,
/// so a mismatch is a bug in the caller.
pub fn zip_placements(hexagons: Vec<Hexagon>, ranked: Vec<RankedEntity>) -> Vec<Placement> {
    assert_eq!(
        hexagons.len(),
        ranked.len(),
        "ring layout must provide exactly one hexagon per ranked entity"
    );
    hexagons
        .into_iter()
        .zip(ranked)
        .map(|(hexagon, entity)| Placement { hexagon, entity })
        .collect()
}

/// Outline style for composited cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub color: Rgba<u8>,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            width: 10.0,
            color: Rgba([0, 0, 0, 255]),
        }
    }
}

/// Options for [`render`].
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Worker pool size; also the number of prepare operations in flight.
    pub workers: usize,
    pub stroke: Stroke,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            stroke: Stroke::default(),
        }
    }
}

impl RenderOptions {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            ..Default::default()
        }
    }

    pub fn with_stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = stroke;
        self
    }
}

/// Available parallelism, or 1 when it cannot be queried.
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// A placement that could not be painted.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderFailure {
    /// Index of the placement (its rank).
    pub index: usize,
    pub image: ImageRef,
    pub message: String,
}

/// Outcome of a [`render`] call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderReport {
    /// Number of cells composited onto the canvas.
    pub painted: usize,
    /// Skipped placements, ordered by index.
    pub failures: Vec<RenderFailure>,
}

impl RenderReport {
    pub fn attempted(&self) -> usize {
        self.painted + self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Loads, decodes and center-crops the entity image to exactly fill the hexagon's bounds.
pub fn prepare_cell<I: ImageSource + ?Sized>(
    images: &I,
    placement: &Placement,
) -> Result<RgbaImage> {
    let (w, h) = placement.hexagon.bbox().size();
    if w <= 0 || h <= 0 {
        return Err(Error::Other(format!("cell bounds are empty ({w}x{h})")));
    }

    let bytes = images.load(&placement.entity.image)?;
    let decoded = image::load_from_memory(&bytes)?;
    Ok(decoded
        .resize_to_fill(w as u32, h as u32, FilterType::Triangle)
        .to_rgba8())
}

/// Draws a prepared cell: clip, blit at the bounding-box origin, unclip, stroke.
pub fn composite<S: RasterSurface + ?Sized>(
    surface: &mut S,
    hexagon: &Hexagon,
    cell: &RgbaImage,
    stroke: &Stroke,
) {
    let (x, y) = hexagon.bbox().start();
    surface.clip_to_polygon(&hexagon.vertices);
    surface.blit(cell, x, y);
    surface.reset_clip();
    surface.stroke_polygon(&hexagon.vertices, stroke.width, stroke.color);
}

enum Outcome {
    Painted,
    Failed(RenderFailure),
}

/// Paints every placement onto `canvas` and returns once all of them were attempted.
pub fn render<I, S>(
    placements: &[Placement],
    images: &I,
    canvas: &Mutex<S>,
    options: &RenderOptions,
) -> RenderReport
where
    I: ImageSource + ?Sized,
    S: RasterSurface + Send,
{
    if placements.is_empty() {
        return RenderReport::default();
    }
    let workers = options.workers.clamp(1, placements.len());
    info!(
        "Rendering {} placements with {workers} workers.",
        placements.len()
    );

    // Zero-capacity queue: a placement is admitted only when a worker is free to take it.
    let (jobs_tx, jobs_rx) = bounded::<(usize, &Placement)>(0);
    let (outcome_tx, outcome_rx) = unbounded::<Outcome>();

    thread::scope(|scope| {
        for worker in 0..workers {
            let jobs = jobs_rx.clone();
            let outcomes = outcome_tx.clone();
            scope.spawn(move || {
                for (index, placement) in jobs.iter() {
                    let outcome = render_one(index, placement, images, canvas, &options.stroke);
                    // The receiver outlives the scope.
                    let _ = outcomes.send(outcome);
                }
                debug!("Render worker {worker} drained its queue.");
            });
        }
        drop(jobs_rx);
        drop(outcome_tx);

        for job in placements.iter().enumerate() {
            if jobs_tx.send(job).is_err() {
                break;
            }
        }
        drop(jobs_tx);
    });

    let mut report = RenderReport::default();
    for outcome in outcome_rx.try_iter() {
        match outcome {
            Outcome::Painted => report.painted += 1,
            Outcome::Failed(failure) => report.failures.push(failure),
        }
    }
    report.failures.sort_by_key(|f| f.index);

    info!(
        "Painted {} of {} placements ({} skipped).",
        report.painted,
        placements.len(),
        report.failures.len()
    );
    report
}

fn render_one<I, S>(
    index: usize,
    placement: &Placement,
    images: &I,
    canvas: &Mutex<S>,
    stroke: &Stroke,
) -> Outcome
where
    I: ImageSource + ?Sized,
    S: RasterSurface,
{
    let painted = contain(|| prepare_cell(images, placement)).and_then(|cell| {
        let mut surface = canvas.lock().unwrap_or_else(PoisonError::into_inner);
        contain(|| {
            composite(&mut *surface, &placement.hexagon, &cell, stroke);
            Ok(())
        })
    });

    match painted {
        Ok(()) => Outcome::Painted,
        Err(err) => {
            warn!(
                "Skipping placement {index} ({}): {err}",
                placement.entity.image
            );
            Outcome::Failed(RenderFailure {
                index,
                image: placement.entity.image.clone(),
                message: err.to_string(),
            })
        }
    }
}

/// Runs `f`, turning a panic into an error so the worker keeps draining its queue.
fn contain<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(Error::Other(format!(
            "panicked: {}",
            panic_message(payload.as_ref())
        )))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use image::ImageFormat;

    use super::*;
    use crate::canvas::ImageCanvas;
    use crate::geometry::Point;
    use crate::ring::ring_layout;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn png(color: Rgba<u8>) -> Vec<u8> {
        let mut bytes = Vec::new();
        RgbaImage::from_pixel(16, 12, color)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    fn color_for(i: usize) -> Rgba<u8> {
        Rgba([(i * 40 % 256) as u8, (i * 90 % 256) as u8, 200, 255])
    }

    struct MemoryImages {
        images: HashMap<ImageRef, Vec<u8>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl MemoryImages {
        fn new(images: HashMap<ImageRef, Vec<u8>>) -> Self {
            Self {
                images,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    impl ImageSource for MemoryImages {
        fn load(&self, image: &ImageRef) -> Result<Vec<u8>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(2));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.images
                .get(image)
                .cloned()
                .ok_or_else(|| Error::fetch(image.as_str(), "status code 404"))
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Clip,
        Blit(i32, i32, u32, u32),
        Reset,
        Stroke,
    }

    #[derive(Default)]
    struct RecordingSurface {
        ops: Vec<Op>,
    }

    impl RasterSurface for RecordingSurface {
        fn clip_to_polygon(&mut self, _points: &[Point]) {
            self.ops.push(Op::Clip);
        }

        fn blit(&mut self, image: &RgbaImage, origin_x: i32, origin_y: i32) {
            self.ops
                .push(Op::Blit(origin_x, origin_y, image.width(), image.height()));
        }

        fn reset_clip(&mut self) {
            self.ops.push(Op::Reset);
        }

        fn stroke_polygon(&mut self, _points: &[Point], _width: f32, _color: Rgba<u8>) {
            self.ops.push(Op::Stroke);
        }

        fn save_png(&self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    /// Ring placements for `n` entities named `cell-<i>.png`; `broken` indices get no image.
    fn fixture(n: usize, broken: &[usize]) -> (Vec<Placement>, MemoryImages) {
        let ranked: Vec<RankedEntity> = (0..n)
            .map(|i| RankedEntity::new(format!("cell-{i}.png"), (n - i) as i64))
            .collect();
        let images = ranked
            .iter()
            .enumerate()
            .filter(|(i, _)| !broken.contains(i))
            .map(|(i, r)| (r.image.clone(), png(color_for(i))))
            .collect();
        let placements = zip_placements(ring_layout(n, 300.0, 300.0, 40.0), ranked);
        (placements, MemoryImages::new(images))
    }

    #[test]
    #[should_panic(expected = "one hexagon per ranked entity")]
    fn zip_rejects_length_mismatch() {
        let hexes = ring_layout(3, 0.0, 0.0, 10.0);
        let ranked = vec![RankedEntity::new("a.png", 1)];
        let _ = zip_placements(hexes, ranked);
    }

    #[test]
    fn zip_pairs_by_index() {
        let hexes = ring_layout(3, 0.0, 0.0, 10.0);
        let ranked: Vec<_> = (0..3)
            .map(|i| RankedEntity::new(format!("{i}.png"), 10 - i))
            .collect();
        let placements = zip_placements(hexes.clone(), ranked.clone());
        for i in 0..3 {
            assert_eq!(placements[i].hexagon, hexes[i]);
            assert_eq!(placements[i].entity, ranked[i]);
        }
    }

    #[test]
    fn prepare_fills_bounding_box_exactly() {
        let (placements, images) = fixture(2, &[]);
        let cell = prepare_cell(&images, &placements[1]).expect("prepare");
        let (w, h) = placements[1].hexagon.bbox().size();
        assert_eq!(cell.dimensions(), (w as u32, h as u32));
    }

    #[test]
    fn prepare_reports_decode_errors() {
        let (placements, _) = fixture(1, &[]);
        let mut images = HashMap::new();
        images.insert(placements[0].entity.image.clone(), b"not an image".to_vec());
        let images = MemoryImages::new(images);

        let err = prepare_cell(&images, &placements[0]).expect_err("garbage bytes");
        assert!(matches!(err, Error::Image(_)));
    }

    #[test]
    fn composite_runs_clip_blit_reset_stroke() {
        let hex = Hexagon::new(50.0, 50.0, 20.0, 0.0);
        let cell = RgbaImage::new(40, 34);
        let mut surface = RecordingSurface::default();
        composite(&mut surface, &hex, &cell, &Stroke::default());

        let (x, y) = hex.bbox().start();
        assert_eq!(
            surface.ops,
            vec![Op::Clip, Op::Blit(x, y, 40, 34), Op::Reset, Op::Stroke]
        );
    }

    #[test]
    fn every_placement_is_composited() {
        let (placements, images) = fixture(25, &[]);
        let canvas = Mutex::new(RecordingSurface::default());
        let report = render(&placements, &images, &canvas, &RenderOptions::new(4));

        assert_eq!(report.painted, 25);
        assert!(report.is_complete());

        let ops = canvas.into_inner().expect("not poisoned").ops;
        assert_eq!(ops.len(), 25 * 4);
        for chunk in ops.chunks(4) {
            assert_eq!(chunk[0], Op::Clip);
            assert!(matches!(chunk[1], Op::Blit(..)));
            assert_eq!(chunk[2], Op::Reset);
            assert_eq!(chunk[3], Op::Stroke);
        }
    }

    #[test]
    fn failing_placement_is_contained() {
        let (placements, images) = fixture(12, &[5]);
        let canvas = Mutex::new(RecordingSurface::default());
        let report = render(&placements, &images, &canvas, &RenderOptions::new(3));

        assert_eq!(report.painted, 11);
        assert_eq!(report.attempted(), 12);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 5);
        assert_eq!(report.failures[0].image.as_str(), "cell-5.png");
        assert!(report.failures[0].message.contains("404"));
    }

    struct PanickingImages {
        inner: MemoryImages,
        panics_on: ImageRef,
        loads: AtomicUsize,
    }

    impl ImageSource for PanickingImages {
        fn load(&self, image: &ImageRef) -> Result<Vec<u8>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if *image == self.panics_on {
                panic!("decoder blew up on {image}");
            }
            self.inner.load(image)
        }
    }

    #[test]
    fn panicking_prepare_does_not_stop_the_pool() {
        let (placements, inner) = fixture(8, &[]);
        let images = PanickingImages {
            inner,
            panics_on: ImageRef::new("cell-0.png"),
            loads: AtomicUsize::new(0),
        };
        let canvas = Mutex::new(RecordingSurface::default());
        let report = render(&placements, &images, &canvas, &RenderOptions::new(1));

        assert_eq!(images.loads.load(Ordering::SeqCst), 8);
        assert_eq!(report.painted, 7);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 0);
        assert!(report.failures[0].message.contains("decoder blew up"));
        assert_eq!(canvas.into_inner().expect("not poisoned").ops.len(), 7 * 4);
    }

    #[test]
    fn panic_payloads_become_messages() {
        let err = contain::<()>(|| panic!("static message")).expect_err("panic is caught");
        assert!(err.to_string().contains("static message"));

        let err = contain::<()>(|| std::panic::panic_any(7_u8)).expect_err("panic is caught");
        assert!(err.to_string().contains("unknown panic payload"));
    }

    #[test]
    fn all_failures_still_return() {
        let (placements, images) = fixture(6, &[0, 1, 2, 3, 4, 5]);
        let canvas = Mutex::new(RecordingSurface::default());
        let report = render(&placements, &images, &canvas, &RenderOptions::new(8));

        assert_eq!(report.painted, 0);
        assert_eq!(
            report.failures.iter().map(|f| f.index).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4, 5]
        );
        assert!(canvas.into_inner().expect("not poisoned").ops.is_empty());
    }

    #[test]
    fn in_flight_prepares_never_exceed_pool_size() {
        let (placements, images) = fixture(30, &[]);
        let canvas = Mutex::new(RecordingSurface::default());
        let report = render(&placements, &images, &canvas, &RenderOptions::new(3));

        assert_eq!(report.painted, 30);
        assert!(images.peak.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn single_worker_and_empty_input() {
        let (placements, images) = fixture(4, &[]);
        let canvas = Mutex::new(RecordingSurface::default());
        assert_eq!(
            render(&placements, &images, &canvas, &RenderOptions::new(0)).painted,
            4
        );
        assert_eq!(
            render(&[], &images, &canvas, &RenderOptions::new(2)),
            RenderReport::default()
        );
    }

    #[test]
    fn rank_colors_land_in_their_cells() {
        let (placements, images) = fixture(7, &[3]);
        let canvas = Mutex::new(ImageCanvas::new(600, 600, WHITE));
        let options = RenderOptions::new(4).with_stroke(Stroke {
            width: 2.0,
            color: Rgba([0, 0, 0, 255]),
        });
        let report = render(&placements, &images, &canvas, &options);
        assert_eq!(report.painted, 6);

        let canvas = canvas.into_inner().expect("not poisoned");
        for (i, placement) in placements.iter().enumerate() {
            let (x, y) = placement.hexagon.center.rounded();
            let pixel = *canvas.image().get_pixel(x as u32, y as u32);
            if i == 3 {
                assert_eq!(pixel, WHITE, "failed cell {i} must stay unpainted");
            } else {
                assert_eq!(pixel, color_for(i), "cell {i}");
            }
        }
    }
}
