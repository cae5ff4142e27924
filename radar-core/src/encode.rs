use std::io::Write;

use crate::error::FrameError;
use crate::format::{is_valid_index, Framebuffer};
use crate::raster::IndexedRaster;

/// Encode an indexed raster as a framebuffer: one byte per pixel, all of
/// row 0 left to right, then row 1, and so on.
pub fn encode(image: &IndexedRaster, width: u16, height: u16) -> Result<Framebuffer, FrameError> {
    if image.width() != width as u32 || image.height() != height as u32 {
        return Err(FrameError::DimensionMismatch {
            expected: (width, height),
            actual: (image.width(), image.height()),
        });
    }

    let mut bytes = Vec::with_capacity(width as usize * height as usize);
    for row in image.indices().chunks(width.max(1) as usize) {
        if let Some(col) = row.iter().position(|&v| !is_valid_index(v)) {
            return Err(FrameError::InvalidPaletteIndex {
                value: row[col],
                offset: bytes.len() + col,
            });
        }
        bytes.extend_from_slice(row);
    }

    Ok(Framebuffer::from_validated(bytes, width, height))
}

/// Writes framebuffer rows to a byte sink, checking the layout as it goes.
pub struct FramebufferWriter<W: Write> {
    writer: W,
    width: u16,
    height: u16,
    rows_written: u16,
}

impl<W: Write> FramebufferWriter<W> {
    pub fn new(writer: W, width: u16, height: u16) -> Self {
        Self {
            writer,
            width,
            height,
            rows_written: 0,
        }
    }

    /// Write one row of `width` palette indices.
    pub fn write_row(&mut self, row: &[u8]) -> Result<(), FrameError> {
        let offset = self.rows_written as usize * self.width as usize;
        if row.len() != self.width as usize || self.rows_written >= self.height {
            return Err(FrameError::TruncatedBuffer {
                expected: self.width as usize * self.height as usize,
                actual: offset + row.len(),
            });
        }
        if let Some(col) = row.iter().position(|&v| !is_valid_index(v)) {
            return Err(FrameError::InvalidPaletteIndex {
                value: row[col],
                offset: offset + col,
            });
        }
        self.writer.write_all(row)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Write every row of an encoded framebuffer.
    pub fn write_framebuffer(&mut self, fb: &Framebuffer) -> Result<(), FrameError> {
        if fb.width() != self.width || fb.height() != self.height {
            return Err(FrameError::DimensionMismatch {
                expected: (self.width, self.height),
                actual: (fb.width() as u32, fb.height() as u32),
            });
        }
        for row in fb.rows() {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Check that every row was written, flush, and return the sink.
    pub fn finish(mut self) -> Result<W, FrameError> {
        if self.rows_written != self.height {
            return Err(FrameError::TruncatedBuffer {
                expected: self.width as usize * self.height as usize,
                actual: self.rows_written as usize * self.width as usize,
            });
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}
