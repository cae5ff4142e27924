use std::convert::Infallible;

use embedded_graphics::pixelcolor::PixelColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use radar_core::palette;
use radar_core::{Palette, Rgb};

/// A palette index as an `embedded-graphics` color. The panel stores
/// indices; RGB only appears when something is presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelColor(pub u8);

impl PanelColor {
    pub const WHITE: Self = Self(palette::WHITE);
    pub const RED: Self = Self(palette::RED);
}

impl PixelColor for PanelColor {
    type Raw = ();
}

/// In-memory indexed panel.
pub struct Canvas {
    width: u16,
    height: u16,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            pixels: vec![palette::WHITE; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u16, y: u16) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Expand to RGB. Indices the palette doesn't know render black.
    pub fn to_rgb(&self, palette: &Palette) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 3);
        for &idx in &self.pixels {
            let c = palette.get(idx).unwrap_or(Rgb::new(0, 0, 0));
            out.extend_from_slice(&[c.r, c.g, c.b]);
        }
        out
    }
}

impl DrawTarget for Canvas {
    type Color = PanelColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (w, h) = (self.width as i32, self.height as i32);
        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 || x >= w || y >= h {
                continue;
            }
            self.pixels[y as usize * self.width as usize + x as usize] = color.0;
        }
        Ok(())
    }

    // Spans and banners are solid rectangles; fill whole row slices.
    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        let stride = self.width as usize;
        let (x0, x1) = (area.top_left.x as usize, bottom_right.x as usize + 1);
        for row in area.top_left.y as usize..=bottom_right.y as usize {
            self.pixels[row * stride + x0..row * stride + x1].fill(color.0);
        }
        Ok(())
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}
