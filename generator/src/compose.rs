use std::path::Path;

use anyhow::Context;
use image::{imageops, Rgb, RgbImage, RgbaImage};

use crate::config::ZoomConfig;

/// A crop rectangle in source pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CropBox {
    /// Largest box with the target aspect ratio. A source that is too
    /// wide is cropped around its centre; one that is too tall keeps its
    /// top edge.
    pub fn fit_aspect(src_width: u32, src_height: u32, dst_width: u32, dst_height: u32) -> Self {
        let (sw, sh) = (src_width as f64, src_height as f64);
        let target = dst_width as f64 / dst_height as f64;
        if sw / sh > target {
            let width = sh * target;
            Self {
                left: (sw - width) / 2.0,
                top: 0.0,
                width,
                height: sh,
            }
        } else {
            Self {
                left: 0.0,
                top: 0.0,
                width: sw,
                height: sw / target,
            }
        }
    }

    /// Narrow the box to `zoom.scale` of its size around the zoom centre,
    /// shifted as needed to stay inside the original box.
    pub fn zoom(self, zoom: &ZoomConfig) -> Self {
        let width = self.width * zoom.scale;
        let height = self.height * zoom.scale;
        let cx = self.left + self.width * zoom.centre_x;
        let cy = self.top + self.height * zoom.centre_y;
        Self {
            left: (cx - width / 2.0).clamp(self.left, self.left + self.width - width),
            top: (cy - height / 2.0).clamp(self.top, self.top + self.height - height),
            width,
            height,
        }
    }
}

pub fn load_tile(path: &Path) -> anyhow::Result<RgbaImage> {
    let img = image::open(path).with_context(|| format!("failed to open tile {}", path.display()))?;
    Ok(img.to_rgba8())
}

/// Lay out equally sized tiles in a grid, row-major: the first `cols`
/// tiles form the top row.
pub fn stitch(tiles: &[RgbaImage], cols: u32) -> anyhow::Result<RgbaImage> {
    let Some(first) = tiles.first() else {
        anyhow::bail!("no tiles to stitch");
    };
    if cols == 0 || tiles.len() % cols as usize != 0 {
        anyhow::bail!("{} tiles do not fill a grid {} columns wide", tiles.len(), cols);
    }
    let (tw, th) = first.dimensions();
    if let Some(odd) = tiles.iter().find(|t| t.dimensions() != (tw, th)) {
        anyhow::bail!(
            "tile sizes differ: {}x{} and {}x{}",
            tw,
            th,
            odd.width(),
            odd.height()
        );
    }

    let rows = tiles.len() as u32 / cols;
    let mut out = RgbaImage::new(tw * cols, th * rows);
    for (i, tile) in tiles.iter().enumerate() {
        let col = i as u32 % cols;
        let row = i as u32 / cols;
        imageops::replace(&mut out, tile, (col * tw) as i64, (row * th) as i64);
    }
    Ok(out)
}

/// Alpha-composite `overlay` onto `base`. Both must be the same size.
pub fn composite(base: &RgbaImage, overlay: &RgbaImage) -> RgbaImage {
    let mut out = base.clone();
    imageops::overlay(&mut out, overlay, 0, 0);
    out
}

/// Drop the alpha channel.
pub fn to_rgb(img: &RgbaImage) -> RgbImage {
    let mut out = RgbImage::new(img.width(), img.height());
    for (dst, src) in out.pixels_mut().zip(img.pixels()) {
        *dst = Rgb([src[0], src[1], src[2]]);
    }
    out
}

/// Scale saturation by blending each pixel away from its luma.
/// 1.0 leaves the image unchanged.
pub fn saturate(img: &RgbImage, factor: f32) -> RgbImage {
    let mut out = img.clone();
    for p in out.pixels_mut() {
        let [r, g, b] = p.0;
        let luma = (r as f32 * 299.0 + g as f32 * 587.0 + b as f32 * 114.0) / 1000.0;
        let boost = |c: u8| (luma + factor * (c as f32 - luma)).round().clamp(0.0, 255.0) as u8;
        *p = Rgb([boost(r), boost(g), boost(b)]);
    }
    out
}
