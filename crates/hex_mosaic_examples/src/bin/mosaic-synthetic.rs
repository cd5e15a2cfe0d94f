use hex_mosaic::prelude::*;
use hex_mosaic_examples::{init_tracing, SolidColorImages, SyntheticSource};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let seed = 42;
    let source = SyntheticSource::generate(seed, 6, 60, 30);
    // One cover is missing on purpose; its cell stays background-colored.
    let images = SolidColorImages::new(seed).with_missing("synthetic/anime-7.png");

    let config = MosaicConfig::new(2000, 2000)
        .with_cell_radius(100.0)
        .with_stroke(6.0, [30, 30, 30, 255])
        .with_background([245, 245, 240, 255])
        .with_output("mosaic-synthetic.png");
    let runner = MosaicRunner::try_new(config)?;

    let report = runner.run(&source, &images)?;
    for failure in &report.failures {
        info!("Cell {} left empty: {}", failure.index, failure.message);
    }
    info!(
        "Painted {}/{} cells into {}.",
        report.painted,
        report.attempted(),
        runner.config.output.display()
    );
    Ok(())
}
