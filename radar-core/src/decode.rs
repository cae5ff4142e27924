use std::io::{ErrorKind, Read};
use std::iter::FusedIterator;

use crate::error::FrameError;
use crate::format::{is_valid_index, validate, ColorSpan};

/// Bytes pulled from a stream per read.
pub const CHUNK_SIZE: usize = 1024;

/// Run in progress while bytes are fed in row-major order. A run is
/// always closed at the end of a row, even when the next row starts with
/// the same color.
struct RunTracker {
    width: u16,
    x: u16,
    y: u16,
    current: Option<ColorSpan>,
}

impl RunTracker {
    fn new(width: u16) -> Self {
        Self {
            width,
            x: 0,
            y: 0,
            current: None,
        }
    }

    /// Feed the next pixel. Returns the span it closed, if any.
    fn push(&mut self, color: u8) -> Option<ColorSpan> {
        let closed = match self.current.as_mut() {
            Some(run) if run.color == color && run.y == self.y => {
                run.len += 1;
                None
            }
            _ => self.current.replace(ColorSpan {
                color,
                len: 1,
                x: self.x,
                y: self.y,
            }),
        };

        self.x += 1;
        if self.x == self.width {
            self.x = 0;
            self.y += 1;
        }
        closed
    }

    fn finish(&mut self) -> Option<ColorSpan> {
        self.current.take()
    }
}

/// Decode a framebuffer held in memory.
///
/// The length and every byte are checked before the first span is
/// produced, so a returned iterator cannot fail.
pub fn spans(buffer: &[u8], width: u16, height: u16) -> Result<Spans<'_>, FrameError> {
    validate(buffer, width, height)?;
    Ok(Spans::new(buffer, width))
}

/// Lazy span iterator over a validated byte slice.
pub struct Spans<'a> {
    bytes: std::slice::Iter<'a, u8>,
    tracker: RunTracker,
}

impl<'a> Spans<'a> {
    pub(crate) fn new(bytes: &'a [u8], width: u16) -> Self {
        Self {
            bytes: bytes.iter(),
            tracker: RunTracker::new(width),
        }
    }
}

impl Iterator for Spans<'_> {
    type Item = ColorSpan;

    fn next(&mut self) -> Option<ColorSpan> {
        for &b in &mut self.bytes {
            if let Some(span) = self.tracker.push(b) {
                return Some(span);
            }
        }
        self.tracker.finish()
    }
}

impl FusedIterator for Spans<'_> {}

/// Lazy span iterator over a byte stream, e.g. a file or socket.
///
/// Bytes are read in chunks of [`CHUNK_SIZE`], so the full framebuffer
/// never has to be resident. Problems only show up as the stream is read:
/// a byte outside the palette yields `InvalidPaletteIndex`, a stream that
/// ends early yields `TruncatedBuffer`. After the last span a single byte
/// is read; if the stream runs on, `TruncatedBuffer` reports
/// `width * height + 1` as a lower bound and nothing more is read.
/// Once an error is yielded the iterator is exhausted. The reader is
/// owned, so dropping the iterator at any point releases it.
pub struct SpanReader<R: Read> {
    reader: R,
    buf: Vec<u8>,
    pos: usize,
    filled: usize,
    offset: usize,
    expected: usize,
    tracker: RunTracker,
    done: bool,
}

impl<R: Read> SpanReader<R> {
    pub fn new(reader: R, width: u16, height: u16) -> Self {
        Self {
            reader,
            buf: vec![0u8; CHUNK_SIZE],
            pos: 0,
            filled: 0,
            offset: 0,
            expected: width as usize * height as usize,
            tracker: RunTracker::new(width),
            done: false,
        }
    }

    /// Number of framebuffer bytes decoded so far.
    pub fn bytes_read(&self) -> usize {
        self.offset
    }

    /// Give back the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Refill the chunk buffer, never reading past the expected length.
    /// Returns the number of bytes read; 0 means end of stream.
    fn fill(&mut self) -> Result<usize, FrameError> {
        let want = (self.expected - self.offset).min(self.buf.len());
        loop {
            match self.reader.read(&mut self.buf[..want]) {
                Ok(n) => {
                    self.pos = 0;
                    self.filled = n;
                    return Ok(n);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Whether the stream holds at least one byte past the frame. Reads
    /// one byte at most, so an open socket is never drained.
    fn has_trailing_byte(&mut self) -> Result<bool, FrameError> {
        let mut one = [0u8; 1];
        loop {
            match self.reader.read(&mut one) {
                Ok(n) => return Ok(n > 0),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn fail(&mut self, err: FrameError) -> Option<Result<ColorSpan, FrameError>> {
        self.done = true;
        Some(Err(err))
    }
}

impl<R: Read> Iterator for SpanReader<R> {
    type Item = Result<ColorSpan, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if self.pos == self.filled {
                if self.offset == self.expected {
                    // The last span goes out before the tail is checked.
                    if let Some(span) = self.tracker.finish() {
                        return Some(Ok(span));
                    }
                    match self.has_trailing_byte() {
                        Ok(false) => {}
                        Ok(true) => {
                            let err = FrameError::TruncatedBuffer {
                                expected: self.expected,
                                actual: self.expected + 1,
                            };
                            return self.fail(err);
                        }
                        Err(e) => return self.fail(e),
                    }
                    self.done = true;
                    return None;
                }
                match self.fill() {
                    Ok(0) => {
                        let err = FrameError::TruncatedBuffer {
                            expected: self.expected,
                            actual: self.offset,
                        };
                        return self.fail(err);
                    }
                    Ok(_) => {}
                    Err(e) => return self.fail(e),
                }
            }

            let b = self.buf[self.pos];
            if !is_valid_index(b) {
                let err = FrameError::InvalidPaletteIndex {
                    value: b,
                    offset: self.offset,
                };
                return self.fail(err);
            }
            self.pos += 1;
            self.offset += 1;
            if let Some(span) = self.tracker.push(b) {
                return Some(Ok(span));
            }
        }
    }
}

impl<R: Read> FusedIterator for SpanReader<R> {}
