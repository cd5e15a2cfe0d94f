use hex_mosaic::prelude::*;
use hex_mosaic_examples::init_tracing;
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // 20 radius-100 outlines around the middle of a 2000x2000 white canvas
    let config = MosaicConfig::new(2000, 2000)
        .with_center(1000.0, 1000.0)
        .with_cell_radius(100.0)
        .with_stroke(10.0, [0, 0, 0, 255])
        .with_background([255, 255, 255, 255])
        .with_output("hexagon.png");
    let runner = MosaicRunner::try_new(config)?;

    let canvas = runner.outline(20);
    canvas.save_png(&runner.config.output)?;

    info!("Wrote {}.", runner.config.output.display());
    Ok(())
}
