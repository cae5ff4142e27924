//! Error type shared by the quantizer and the framebuffer codec.
//!
//! Every check happens at a component boundary, before any scan starts,
//! except for stream-backed decoding where bytes only become visible as
//! they arrive.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    /// The palette has no entries, or more entries than a framebuffer byte may name.
    #[error("invalid palette: {len} colors (expected 1..={max})", max = crate::format::PALETTE_SIZE)]
    InvalidPalette { len: usize },

    /// The raster has a zero dimension or its pixel data does not fill it.
    #[error("invalid image: {width}x{height}")]
    InvalidImage { width: u32, height: u32 },

    /// An indexed raster does not have the framebuffer's dimensions.
    #[error("dimension mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        expected: (u16, u16),
        actual: (u32, u32),
    },

    /// A pixel or framebuffer byte is not a palette index.
    #[error("invalid palette index {value} at offset {offset}")]
    InvalidPaletteIndex { value: u8, offset: usize },

    /// The framebuffer holds fewer or more bytes than width x height.
    #[error("truncated buffer: expected {expected} bytes, got {actual}")]
    TruncatedBuffer { expected: usize, actual: usize },

    /// The stream backing a span reader failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// An image info file is missing a key or has a malformed value.
    #[error("invalid image info: {0}")]
    InvalidInfo(String),
}
