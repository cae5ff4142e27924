use std::convert::Infallible;
use std::io::{self, Read};

use embedded_graphics::mono_font::ascii::FONT_8X13;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use radar_core::{FrameError, SpanReader};

use crate::panel::PanelColor;

/// Height of the error banner along the bottom edge.
pub const BANNER_HEIGHT: u32 = 25;

/// Anything the refresh can draw on.
pub trait Panel: DrawTarget<Color = PanelColor, Error = Infallible> + OriginDimensions {}

impl<T: DrawTarget<Color = PanelColor, Error = Infallible> + OriginDimensions> Panel for T {}

fn text_style() -> MonoTextStyle<'static, PanelColor> {
    MonoTextStyle::new(&FONT_8X13, PanelColor::WHITE)
}

/// Stream a framebuffer onto `target`, one span at a time. Spans already
/// drawn stay drawn when the stream turns out to be bad.
pub fn draw_framebuffer<T: Panel, R: Read>(target: &mut T, reader: R) -> Result<usize, FrameError> {
    let size = target.size();
    let mut drawn = 0;
    for span in SpanReader::new(reader, size.width as u16, size.height as u16) {
        let span = span?;
        let area = Rectangle::new(
            Point::new(span.x as i32, span.y as i32),
            Size::new(span.len as u32, 1),
        );
        let _ = target.fill_solid(&area, PanelColor(span.color));
        drawn += 1;
    }
    Ok(drawn)
}

/// Red banner across the bottom right half with the message in white.
pub fn draw_error<T: Panel>(target: &mut T, message: &str) {
    let Size { width, height } = target.size();
    let banner = Rectangle::new(
        Point::new((width / 2) as i32, height.saturating_sub(BANNER_HEIGHT) as i32),
        Size::new(width - width / 2, BANNER_HEIGHT),
    );
    let _ = banner
        .into_styled(PrimitiveStyle::with_fill(PanelColor::RED))
        .draw(target);
    let origin = Point::new((width / 2 + 5) as i32, height.saturating_sub(22) as i32);
    let _ = Text::with_baseline(message, origin, text_style(), Baseline::Top).draw(target);
}

/// White caption in the lower left corner.
pub fn draw_caption<T: Panel>(target: &mut T, text: &str) {
    let origin = Point::new(5, target.size().height.saturating_sub(17) as i32);
    let _ = Text::with_baseline(text, origin, text_style(), Baseline::Top).draw(target);
}

/// One panel update: clear to white, draw the framebuffer, then the
/// caption. A source that can't be opened or decoded gets the error
/// banner instead of aborting; the error is still returned so the caller
/// can log it.
pub fn refresh<T: Panel, R: Read>(
    target: &mut T,
    source: io::Result<R>,
    caption: Option<&str>,
) -> Result<usize, FrameError> {
    let _ = target.clear(PanelColor::WHITE);

    let result = source
        .map_err(FrameError::from)
        .and_then(|reader| draw_framebuffer(target, reader));

    if let Some(text) = caption {
        draw_caption(target, text);
    }
    if let Err(e) = &result {
        draw_error(target, &e.to_string());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::Canvas;
    use radar_core::palette::{BLUE, GREEN, RED, WHITE};

    #[derive(Debug, PartialEq)]
    enum Op {
        Fill(Rectangle, u8),
        Pixels(usize),
    }

    struct Recorder {
        ops: Vec<Op>,
    }

    impl DrawTarget for Recorder {
        type Color = PanelColor;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            self.ops.push(Op::Pixels(pixels.into_iter().count()));
            Ok(())
        }

        fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
            self.ops.push(Op::Fill(*area, color.0));
            Ok(())
        }
    }

    impl OriginDimensions for Recorder {
        fn size(&self) -> Size {
            Size::new(4, 30)
        }
    }

    fn rect(x: i32, y: i32, w: u32, h: u32) -> Rectangle {
        Rectangle::new(Point::new(x, y), Size::new(w, h))
    }

    fn frame(width: usize, height: usize, fill: u8, first_row: &[u8]) -> Vec<u8> {
        let mut bytes = vec![fill; width * height];
        bytes[..first_row.len()].copy_from_slice(first_row);
        bytes
    }

    /// Count pixels of `color` inside the given rectangle.
    fn count_in(canvas: &Canvas, color: u8, x: std::ops::Range<u16>, y: std::ops::Range<u16>) -> usize {
        y.flat_map(|yy| x.clone().map(move |xx| (xx, yy)))
            .filter(|&(xx, yy)| canvas.pixel(xx, yy) == Some(color))
            .count()
    }

    #[test]
    fn spans_drawn_in_order() {
        let mut rec = Recorder { ops: Vec::new() };
        let bytes = frame(4, 30, WHITE, &[BLUE, BLUE, GREEN, WHITE]);
        let drawn = refresh(&mut rec, Ok(&bytes[..]), None).unwrap();
        assert_eq!(drawn, 3 + 29);
        assert_eq!(
            &rec.ops[..4],
            &[
                Op::Fill(rect(0, 0, 4, 30), WHITE),
                Op::Fill(rect(0, 0, 2, 1), BLUE),
                Op::Fill(rect(2, 0, 1, 1), GREEN),
                Op::Fill(rect(3, 0, 1, 1), WHITE),
            ]
        );
        assert_eq!(rec.ops.last(), Some(&Op::Fill(rect(0, 29, 4, 1), WHITE)));
    }

    #[test]
    fn caption_reaches_the_pixels() {
        let mut canvas = Canvas::new(800, 480);
        let bytes = vec![BLUE; 800 * 480];
        refresh(&mut canvas, Ok(&bytes[..]), Some("2024-10-09 13:00:00 + 10 mins forecast")).unwrap();

        // Glyphs sit in the 13 px band starting at y = 463.
        assert!(count_in(&canvas, WHITE, 5..400, 463..476) > 100);
        assert_eq!(count_in(&canvas, WHITE, 0..800, 0..463), 0);
        assert_eq!(count_in(&canvas, RED, 0..800, 0..480), 0);
    }

    #[test]
    fn bad_byte_gets_banner() {
        let mut canvas = Canvas::new(800, 480);
        let mut bytes = vec![BLUE; 800 * 480];
        bytes[1000] = 9;
        let err = refresh(&mut canvas, Ok(&bytes[..]), None).unwrap_err();
        assert!(matches!(err, FrameError::InvalidPaletteIndex { value: 9, offset: 1000 }));

        // Row 0 made it out before the bad byte; the rest stayed white.
        assert_eq!(canvas.pixel(0, 0), Some(BLUE));
        assert_eq!(canvas.pixel(0, 2), Some(WHITE));

        // Banner fills the bottom right, with the message drawn in white on it.
        assert_eq!(canvas.pixel(400, 455), Some(RED));
        assert_eq!(canvas.pixel(799, 479), Some(RED));
        assert_eq!(canvas.pixel(399, 479), Some(WHITE));
        assert!(count_in(&canvas, WHITE, 405..800, 458..471) > 100);
        assert_eq!(count_in(&canvas, WHITE, 400..800, 471..480), 0);
    }

    #[test]
    fn short_stream_gets_banner_and_caption() {
        let mut canvas = Canvas::new(800, 480);
        let bytes = frame(800, 2, BLUE, &[]);
        let err = refresh(&mut canvas, Ok(&bytes[..]), Some("caption")).unwrap_err();
        assert!(matches!(err, FrameError::TruncatedBuffer { expected: 384000, actual: 1600 }));
        assert!(count_in(&canvas, RED, 400..800, 455..480) > 0);
        // The caption is drawn white on white here, so only the banner shows.
        assert_eq!(count_in(&canvas, WHITE, 5..100, 463..476), 95 * 13);
    }

    #[test]
    fn missing_source_gets_banner() {
        let mut canvas = Canvas::new(800, 480);
        let source: io::Result<&[u8]> = Err(io::Error::new(io::ErrorKind::NotFound, "no framebuffer"));
        let err = refresh(&mut canvas, source, None).unwrap_err();
        assert!(matches!(err, FrameError::Io(_)));
        assert_eq!(canvas.pixel(790, 460), Some(RED));
        assert_eq!(canvas.pixel(0, 0), Some(WHITE));
    }
}
