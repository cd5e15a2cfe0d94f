use std::path::PathBuf;

use clap::Parser;
use hex_mosaic::prelude::*;
use hex_mosaic_examples::{default_cache_dir, init_tracing, ExportSource, HttpImages};
use tracing::{info, warn};

/// Builds a mosaic from a JSON export of a user's profile and lists.
#[derive(Parser, Debug)]
#[command(name = "mosaic-from-export", version, about)]
struct Cli {
    /// Export file with `user`, `anime` and `manga` responses
    #[arg(value_name = "FILE")]
    export: PathBuf,

    /// Read images from this directory (matched by file name) instead of downloading them
    #[arg(long, value_name = "DIR")]
    images: Option<PathBuf>,

    /// Directory where loaded images are cached [default: <user cache dir>/hex_mosaic/images]
    #[arg(long, value_name = "DIR")]
    cache: Option<PathBuf>,

    /// Canvas width and height in pixels
    #[arg(long, default_value_t = 2000)]
    size: u32,

    /// Cell circumradius in pixels
    #[arg(long, default_value_t = 100.0)]
    radius: f64,

    /// Outline width in pixels (0 disables outlines)
    #[arg(long, default_value_t = 10.0)]
    stroke: f32,

    /// Render threads (defaults to the available parallelism)
    #[arg(long)]
    workers: Option<usize>,

    /// Output PNG
    #[arg(long, short, default_value = "mosaic.png")]
    out: PathBuf,
}

impl Cli {
    fn config(&self) -> MosaicConfig {
        let mut config = MosaicConfig::new(self.size, self.size)
            .with_cell_radius(self.radius)
            .with_stroke(self.stroke, [0, 0, 0, 255])
            .with_output(&self.out);
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        config
    }

    fn image_source(&self) -> anyhow::Result<DiskCache<Box<dyn ImageSource>>> {
        let upstream: Box<dyn ImageSource> = match &self.images {
            Some(dir) => Box::new(LocalFiles::new(dir)),
            None => Box::new(HttpImages::new()?),
        };
        let cache = self.cache.clone().unwrap_or_else(default_cache_dir);
        info!("Caching images in {}.", cache.display());
        Ok(DiskCache::new(cache, upstream))
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let runner = MosaicRunner::try_new(cli.config())?;
    let source = ExportSource::from_path(&cli.export)?;
    let images = cli.image_source()?;

    let report = runner.run(&source, &images)?;
    if !report.is_complete() {
        warn!(
            "{} of {} cells could not be painted.",
            report.failures.len(),
            report.attempted()
        );
    }
    info!("Wrote {}.", runner.config.output.display());
    Ok(())
}
