use crate::error::FrameError;
use crate::palette::{Palette, Rgb};
use crate::raster::{IndexedRaster, RgbRaster};

/// Map every pixel to its nearest palette index with Floyd-Steinberg
/// error diffusion.
///
/// Pixels are visited in row-major order. Error is accumulated in integer
/// sixteenths, so identical inputs always give identical output. The
/// working color is clamped to 0..=255 before the nearest-color search and
/// the diffused error is taken from the clamped value.
pub fn quantize(image: &RgbRaster, palette: &Palette) -> Result<IndexedRaster, FrameError> {
    if palette.is_empty() {
        return Err(FrameError::InvalidPalette { len: 0 });
    }
    if image.width() == 0 || image.height() == 0 {
        return Err(FrameError::InvalidImage {
            width: image.width(),
            height: image.height(),
        });
    }

    let w = image.width() as usize;
    let h = image.height() as usize;
    let src = image.as_bytes();

    // Slot x + 1 holds pixel x; slots 0 and w + 1 absorb error that falls off the edges.
    let mut cur = vec![[0i32; 3]; w + 2];
    let mut next = vec![[0i32; 3]; w + 2];
    let mut out = Vec::with_capacity(w * h);

    for y in 0..h {
        for x in 0..w {
            let off = (y * w + x) * 3;
            let acc = cur[x + 1];
            let work = [
                (src[off] as i32 + diffused(acc[0])).clamp(0, 255),
                (src[off + 1] as i32 + diffused(acc[1])).clamp(0, 255),
                (src[off + 2] as i32 + diffused(acc[2])).clamp(0, 255),
            ];

            let index = palette.nearest(Rgb::new(work[0] as u8, work[1] as u8, work[2] as u8));
            let chosen = palette.colors()[index as usize];
            let err = [
                work[0] - chosen.r as i32,
                work[1] - chosen.g as i32,
                work[2] - chosen.b as i32,
            ];

            for c in 0..3 {
                cur[x + 2][c] += err[c] * 7;
                next[x][c] += err[c] * 3;
                next[x + 1][c] += err[c] * 5;
                next[x + 2][c] += err[c];
            }
            out.push(index);
        }
        std::mem::swap(&mut cur, &mut next);
        next.fill([0; 3]);
    }

    IndexedRaster::new(image.width(), image.height(), out)
}

/// Round an accumulated error in sixteenths to whole intensity steps.
fn diffused(acc: i32) -> i32 {
    (acc + 8).div_euclid(16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{BLACK, WHITE};

    fn gradient(width: u32, height: u32) -> RgbRaster {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                data.push((x * 255 / (width - 1)) as u8);
                data.push((y * 255 / (height - 1)) as u8);
                data.push(((x + y) * 7 % 256) as u8);
            }
        }
        RgbRaster::new(width, height, data).unwrap()
    }

    #[test]
    fn deterministic() {
        let img = gradient(64, 40);
        let p = Palette::inky7();
        let a = quantize(&img, &p).unwrap();
        let b = quantize(&img, &p).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn flat_palette_color_is_exact() {
        let p = Palette::inky7();
        for (k, &color) in p.colors().iter().enumerate() {
            let img = RgbRaster::filled(17, 9, color);
            let out = quantize(&img, &p).unwrap();
            assert!(out.indices().iter().all(|&i| i == k as u8), "color {k}");
        }
    }

    #[test]
    fn mid_gray_dithers_black_and_white() {
        let p = Palette::new(vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)]).unwrap();
        let img = RgbRaster::filled(32, 32, Rgb::new(128, 128, 128));
        let out = quantize(&img, &p).unwrap();
        let whites = out.indices().iter().filter(|&&i| i == WHITE).count();
        let blacks = out.indices().iter().filter(|&&i| i == BLACK).count();
        assert_eq!(whites + blacks, 32 * 32);
        // Roughly half of each, as the average intensity is preserved.
        assert!(whites > 450 && whites < 575, "whites = {whites}");
    }

    #[test]
    fn output_keeps_dimensions_and_range() {
        let img = gradient(33, 7);
        let p = Palette::inky7();
        let out = quantize(&img, &p).unwrap();
        assert_eq!((out.width(), out.height()), (33, 7));
        assert!(out.indices().iter().all(|&i| (i as usize) < p.len()));
    }

    #[test]
    fn zero_sized_image_rejected() {
        let img = RgbRaster::new(0, 10, Vec::new()).unwrap();
        assert!(matches!(
            quantize(&img, &Palette::inky7()),
            Err(FrameError::InvalidImage { width: 0, height: 10 })
        ));
    }

    #[test]
    fn diffused_rounds_both_signs() {
        assert_eq!(diffused(0), 0);
        assert_eq!(diffused(7), 0);
        assert_eq!(diffused(8), 1);
        assert_eq!(diffused(-8), 0);
        assert_eq!(diffused(-9), -1);
        assert_eq!(diffused(-16 * 5), -5);
    }
}
