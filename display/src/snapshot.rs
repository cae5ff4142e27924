use std::path::Path;

use anyhow::Context;
use image::RgbImage;
use radar_core::Palette;

use crate::panel::Canvas;

/// Save the panel pixels, caption and banner included, as a PNG.
pub fn save_png(canvas: &Canvas, palette: &Palette, path: &Path) -> anyhow::Result<()> {
    let img = RgbImage::from_raw(canvas.width() as u32, canvas.height() as u32, canvas.to_rgb(palette))
        .context("canvas buffer has the wrong size")?;
    img.save(path)
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    Ok(())
}
