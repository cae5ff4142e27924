use anyhow::Context;
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{RgbImage, RgbaImage};

use crate::compose::CropBox;

/// Bilinear resizer for map imagery.
pub struct MapResizer {
    resizer: Resizer,
    alg: ResizeAlg,
}

impl MapResizer {
    pub fn new() -> Self {
        Self {
            resizer: Resizer::new(),
            alg: ResizeAlg::Convolution(FilterType::Bilinear),
        }
    }

    /// Resize an RGBA image, e.g. a precipitation layer onto the map's size.
    pub fn resize_rgba(&mut self, src: &RgbaImage, width: u32, height: u32) -> anyhow::Result<RgbaImage> {
        if src.dimensions() == (width, height) {
            return Ok(src.clone());
        }

        let src_image = Image::from_vec_u8(src.width(), src.height(), src.as_raw().clone(), PixelType::U8x4)
            .context("failed to create source image")?;
        let mut dst_image = Image::new(width, height, PixelType::U8x4);

        let options = ResizeOptions::new().resize_alg(self.alg);
        self.resizer
            .resize(&src_image, &mut dst_image, &options)
            .context("resize failed")?;

        RgbaImage::from_raw(width, height, dst_image.into_vec()).context("resized buffer has the wrong size")
    }

    /// Cut `crop` out of an RGB image and scale it to the panel size.
    pub fn crop_resize(&mut self, src: &RgbImage, crop: CropBox, width: u32, height: u32) -> anyhow::Result<RgbImage> {
        let src_image = Image::from_vec_u8(src.width(), src.height(), src.as_raw().clone(), PixelType::U8x3)
            .context("failed to create source image")?;
        let mut dst_image = Image::new(width, height, PixelType::U8x3);

        let options = ResizeOptions::new()
            .resize_alg(self.alg)
            .crop(crop.left, crop.top, crop.width, crop.height);
        self.resizer
            .resize(&src_image, &mut dst_image, &options)
            .context("resize failed")?;

        RgbImage::from_raw(width, height, dst_image.into_vec()).context("resized buffer has the wrong size")
    }
}
