use crate::decode::Spans;
use crate::error::FrameError;
use crate::raster::IndexedRaster;

/// Panel width in pixels.
pub const WIDTH: u16 = 800;
/// Panel height in pixels.
pub const HEIGHT: u16 = 480;
/// Bytes in a canonical framebuffer.
pub const FRAME_SIZE: usize = WIDTH as usize * HEIGHT as usize;
/// Number of colors a framebuffer byte may name (indices 0..=6).
pub const PALETTE_SIZE: usize = 7;

pub fn is_valid_index(value: u8) -> bool {
    (value as usize) < PALETTE_SIZE
}

/// A run of `len` pixels of one color starting at (`x`, `y`). Never
/// crosses a row boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorSpan {
    pub color: u8,
    pub len: u16,
    pub x: u16,
    pub y: u16,
}

impl ColorSpan {
    /// Column one past the last pixel of the span.
    pub fn end_x(&self) -> u16 {
        self.x + self.len
    }
}

/// Check that `bytes` is a complete framebuffer for `width` x `height`.
pub fn validate(bytes: &[u8], width: u16, height: u16) -> Result<(), FrameError> {
    let expected = width as usize * height as usize;
    if bytes.len() != expected {
        return Err(FrameError::TruncatedBuffer {
            expected,
            actual: bytes.len(),
        });
    }
    if let Some(offset) = bytes.iter().position(|&b| !is_valid_index(b)) {
        return Err(FrameError::InvalidPaletteIndex {
            value: bytes[offset],
            offset,
        });
    }
    Ok(())
}

/// A validated framebuffer: exactly `width * height` bytes, one palette
/// index per pixel, row-major, no header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    width: u16,
    height: u16,
    bytes: Vec<u8>,
}

impl Framebuffer {
    pub fn from_bytes(bytes: Vec<u8>, width: u16, height: u16) -> Result<Self, FrameError> {
        validate(&bytes, width, height)?;
        Ok(Self {
            width,
            height,
            bytes,
        })
    }

    pub(crate) fn from_validated(bytes: Vec<u8>, width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            bytes,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Iterate rows of `width` bytes.
    pub fn rows(&self) -> std::slice::Chunks<'_, u8> {
        self.bytes.chunks(self.width.max(1) as usize)
    }

    /// Lazily decode into color spans.
    pub fn spans(&self) -> Spans<'_> {
        Spans::new(&self.bytes, self.width)
    }

    /// Rebuild the indexed raster by painting every span.
    pub fn to_indexed(&self) -> IndexedRaster {
        let w = self.width as usize;
        let mut indices = vec![0u8; self.bytes.len()];
        for span in self.spans() {
            let start = span.y as usize * w + span.x as usize;
            indices[start..start + span.len as usize].fill(span.color);
        }
        IndexedRaster::from_parts(self.width as u32, self.height as u32, indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_size() {
        assert_eq!(FRAME_SIZE, 384_000);
    }

    #[test]
    fn validate_length_then_values() {
        assert!(validate(&[0, 1, 2, 3, 4, 5], 3, 2).is_ok());
        assert!(matches!(
            validate(&[0, 1, 2], 3, 2),
            Err(FrameError::TruncatedBuffer { expected: 6, actual: 3 })
        ));
        assert!(matches!(
            validate(&[0, 1, 2, 7, 4, 5], 3, 2),
            Err(FrameError::InvalidPaletteIndex { value: 7, offset: 3 })
        ));
    }

    #[test]
    fn rows_split_on_width() {
        let fb = Framebuffer::from_bytes(vec![0, 0, 1, 1, 1, 2], 3, 2).unwrap();
        let rows: Vec<&[u8]> = fb.rows().collect();
        assert_eq!(rows, vec![&[0, 0, 1][..], &[1, 1, 2][..]]);
    }

    #[test]
    fn to_indexed_repaints() {
        let bytes = vec![3, 3, 0, 6, 6, 6, 1, 2];
        let fb = Framebuffer::from_bytes(bytes.clone(), 4, 2).unwrap();
        let idx = fb.to_indexed();
        assert_eq!((idx.width(), idx.height()), (4, 2));
        assert_eq!(idx.indices(), &bytes[..]);
    }
}
