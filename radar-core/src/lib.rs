pub mod error;
pub mod palette;
pub mod raster;
pub mod format;
pub mod quantize;
pub mod encode;
pub mod decode;
pub mod planes;
pub mod info;

pub use decode::{spans, SpanReader, Spans};
pub use encode::{encode, FramebufferWriter};
pub use error::FrameError;
pub use format::{ColorSpan, Framebuffer, FRAME_SIZE, HEIGHT, WIDTH};
pub use info::ImageInfo;
pub use palette::{Palette, Rgb};
pub use quantize::quantize;
pub use raster::{IndexedRaster, RgbRaster};
