//! Bit-plane framebuffer layout used by the 4" and 5.7" panels.
//!
//! Superseded by the one-byte-per-pixel format in [`crate::format`], which
//! the 7.3" panel stores directly in PSRAM. Kept so older panels can still
//! be fed.
//!
//! Layout: three planes back to back. Plane `k` holds bit `k` of every
//! pixel's palette index, one bit per pixel in row-major order, packed
//! MSB first. Each plane is `ceil(width * height / 8)` bytes; unused tail
//! bits are zero.

use crate::encode::encode;
use crate::error::FrameError;
use crate::format::is_valid_index;
use crate::raster::IndexedRaster;

pub const PLANE_COUNT: usize = 3;

pub fn plane_len(width: u16, height: u16) -> usize {
    (width as usize * height as usize).div_ceil(8)
}

/// Pack an indexed raster into three bit planes.
pub fn encode_planes(image: &IndexedRaster, width: u16, height: u16) -> Result<Vec<u8>, FrameError> {
    let fb = encode(image, width, height)?;
    let plane = plane_len(width, height);
    let mut out = vec![0u8; plane * PLANE_COUNT];

    for (i, &index) in fb.as_bytes().iter().enumerate() {
        let mask = 0x80 >> (i % 8);
        for k in 0..PLANE_COUNT {
            if index & (1 << k) != 0 {
                out[k * plane + i / 8] |= mask;
            }
        }
    }
    Ok(out)
}

/// Unpack three bit planes into an indexed raster.
pub fn decode_planes(bytes: &[u8], width: u16, height: u16) -> Result<IndexedRaster, FrameError> {
    let plane = plane_len(width, height);
    let expected = plane * PLANE_COUNT;
    if bytes.len() != expected {
        return Err(FrameError::TruncatedBuffer {
            expected,
            actual: bytes.len(),
        });
    }

    let pixels = width as usize * height as usize;
    let mut indices = Vec::with_capacity(pixels);
    for i in 0..pixels {
        let mask = 0x80 >> (i % 8);
        let mut index = 0u8;
        for k in 0..PLANE_COUNT {
            if bytes[k * plane + i / 8] & mask != 0 {
                index |= 1 << k;
            }
        }
        if !is_valid_index(index) {
            return Err(FrameError::InvalidPaletteIndex {
                value: index,
                offset: i,
            });
        }
        indices.push(index);
    }
    Ok(IndexedRaster::from_parts(width as u32, height as u32, indices))
}
