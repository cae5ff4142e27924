use crate::error::FrameError;
use crate::palette::{Palette, Rgb};

/// Full-color RGB24 image, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbRaster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbRaster {
    /// Wrap RGB24 pixel data. Zero-sized rasters are representable but
    /// rejected by the quantizer.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        if data.len() != width as usize * height as usize * 3 {
            return Err(FrameError::InvalidImage { width, height });
        }
        Ok(Self { width, height, data })
    }

    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 3);
        for _ in 0..pixels {
            data.extend_from_slice(&[color.r, color.g, color.b]);
        }
        Self { width, height, data }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let off = (y as usize * self.width as usize + x as usize) * 3;
        Rgb::new(self.data[off], self.data[off + 1], self.data[off + 2])
    }
}

/// One palette index per pixel, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedRaster {
    width: u32,
    height: u32,
    indices: Vec<u8>,
}

impl IndexedRaster {
    /// Wrap index data. Index values are checked by the encoder, not here.
    pub fn new(width: u32, height: u32, indices: Vec<u8>) -> Result<Self, FrameError> {
        if indices.len() != width as usize * height as usize {
            return Err(FrameError::InvalidImage { width, height });
        }
        Ok(Self {
            width,
            height,
            indices,
        })
    }

    pub(crate) fn from_parts(width: u32, height: u32, indices: Vec<u8>) -> Self {
        debug_assert_eq!(indices.len(), width as usize * height as usize);
        Self {
            width,
            height,
            indices,
        }
    }

    pub fn filled(width: u32, height: u32, index: u8) -> Self {
        Self {
            width,
            height,
            indices: vec![index; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    pub fn into_indices(self) -> Vec<u8> {
        self.indices
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.indices[y as usize * self.width as usize + x as usize]
    }

    /// Expand indices back to palette colors, for the human-viewable preview.
    pub fn to_rgb(&self, palette: &Palette) -> Result<RgbRaster, FrameError> {
        let mut data = Vec::with_capacity(self.indices.len() * 3);
        for (offset, &i) in self.indices.iter().enumerate() {
            let c = palette
                .get(i)
                .ok_or(FrameError::InvalidPaletteIndex { value: i, offset })?;
            data.extend_from_slice(&[c.r, c.g, c.b]);
        }
        Ok(RgbRaster {
            width: self.width,
            height: self.height,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_length_checked() {
        assert!(RgbRaster::new(2, 2, vec![0; 12]).is_ok());
        assert!(matches!(
            RgbRaster::new(2, 2, vec![0; 11]),
            Err(FrameError::InvalidImage { width: 2, height: 2 })
        ));
    }

    #[test]
    fn pixel_addressing() {
        let data = (0u8..18).collect::<Vec<_>>();
        let img = RgbRaster::new(3, 2, data).unwrap();
        assert_eq!(img.pixel(0, 0), Rgb::new(0, 1, 2));
        assert_eq!(img.pixel(2, 1), Rgb::new(15, 16, 17));
    }

    #[test]
    fn to_rgb_expands_palette() {
        let p = Palette::inky7();
        let idx = IndexedRaster::new(2, 1, vec![1, 4]).unwrap();
        let rgb = idx.to_rgb(&p).unwrap();
        assert_eq!(rgb.as_bytes(), &[255, 255, 255, 255, 0, 0]);
    }

    #[test]
    fn to_rgb_rejects_unknown_index() {
        let idx = IndexedRaster::new(2, 1, vec![1, 9]).unwrap();
        assert!(matches!(
            idx.to_rgb(&Palette::inky7()),
            Err(FrameError::InvalidPaletteIndex { value: 9, offset: 1 })
        ));
    }
}
