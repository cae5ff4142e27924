mod caption;
mod compose;
mod config;
mod output;
mod resize;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use radar_core::{encode, quantize, ImageInfo, RgbRaster};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::compose::{composite, load_tile, saturate, stitch, to_rgb, CropBox};
use crate::config::GenConfig;
use crate::output::OutputSet;
use crate::resize::MapResizer;

#[derive(Parser)]
#[command(name = "radar-gen", about = "Composite map and rain tiles into an e-paper framebuffer")]
struct Cli {
    /// Base map tiles, row-major
    #[arg(long, required = true, num_args = 1..)]
    map: Vec<PathBuf>,

    /// Precipitation tiles, same grid as the map tiles
    #[arg(long, num_args = 1..)]
    precip: Vec<PathBuf>,

    /// Tiles per row in the grid
    #[arg(long, default_value = "1")]
    grid_cols: u32,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory (overrides the config)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Precipitation snapshot time, unix seconds (default: now)
    #[arg(long)]
    timestamp: Option<i64>,

    /// Caption shown on the panel (default: snapshot time and forecast lead)
    #[arg(long)]
    caption: Option<String>,

    /// Also copy the outputs to this directory
    #[arg(long)]
    deploy: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = GenConfig::load(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let out_dir = cli.out_dir.clone().unwrap_or_else(|| config.output.dir.clone());
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let outputs = OutputSet::in_dir(&out_dir);

    let (width, height) = (config.output.width, config.output.height);
    let mut resizer = MapResizer::new();

    // Stitch and composite
    let map_tiles = cli.map.iter().map(|p| load_tile(p)).collect::<anyhow::Result<Vec<_>>>()?;
    let map = stitch(&map_tiles, cli.grid_cols).context("stitching map tiles")?;
    info!("map: {}x{} from {} tiles", map.width(), map.height(), map_tiles.len());

    let combined = if cli.precip.is_empty() {
        map
    } else {
        let precip_tiles = cli.precip.iter().map(|p| load_tile(p)).collect::<anyhow::Result<Vec<_>>>()?;
        let precip = stitch(&precip_tiles, cli.grid_cols).context("stitching precipitation tiles")?;
        let precip = resizer.resize_rgba(&precip, map.width(), map.height())?;
        info!("precipitation: {} tiles composited", precip_tiles.len());
        composite(&map, &precip)
    };
    let combined = to_rgb(&combined);

    // Crop, zoom, resize to the panel
    let crop = CropBox::fit_aspect(combined.width(), combined.height(), width as u32, height as u32)
        .zoom(&config.zoom);
    debug!("crop box: {crop:?}");
    let panel = resizer.crop_resize(&combined, crop, width as u32, height as u32)?;
    info!("resized to {width}x{height}");

    // Quantize and encode
    let raster = RgbRaster::new(panel.width(), panel.height(), panel.as_raw().clone())?;
    let indexed = quantize(&raster, &config.palette)?;
    let fb = encode(&indexed, width, height)?;
    info!("quantized to {} colors", config.palette.len());

    output::write_framebuffer(&outputs.framebuffer, &fb)?;
    output::write_quantized_preview(&outputs.quantized_preview, &indexed, &config.palette)?;
    output::write_combined(
        &outputs.combined,
        &saturate(&panel, config.preview.saturation),
        config.preview.jpeg_quality,
    )?;

    let precip_ts = cli.timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp());
    let text = match cli.caption {
        Some(text) => text,
        None => {
            let zone = caption::parse_zone(&config.forecast.timezone)?;
            caption::forecast_caption(precip_ts, config.forecast.minutes, zone)?
        }
    };
    output::write_info(&outputs.info, &ImageInfo { precip_ts, text })?;

    if let Some(dir) = &cli.deploy {
        outputs.deploy(dir)?;
    }

    Ok(())
}
