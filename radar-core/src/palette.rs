use serde::{Deserialize, Serialize};

use crate::error::FrameError;
use crate::format::PALETTE_SIZE;

pub const BLACK: u8 = 0;
pub const WHITE: u8 = 1;
pub const GREEN: u8 = 2;
pub const BLUE: u8 = 3;
pub const RED: u8 = 4;
pub const YELLOW: u8 = 5;
pub const ORANGE: u8 = 6;

/// An 8-bit RGB triple. Serializes as `[r, g, b]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Squared Euclidean distance in RGB space.
    pub fn distance_sq(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

const INKY7: [Rgb; PALETTE_SIZE] = [
    Rgb::new(0, 0, 0),
    Rgb::new(255, 255, 255),
    Rgb::new(0, 255, 0),
    Rgb::new(0, 0, 255),
    Rgb::new(255, 0, 0),
    Rgb::new(255, 255, 0),
    Rgb::new(255, 140, 0),
];

/// Ordered display colors. The position of a color is the index stored
/// in indexed rasters and framebuffers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Rgb>", into = "Vec<Rgb>")]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Result<Self, FrameError> {
        if colors.is_empty() || colors.len() > PALETTE_SIZE {
            return Err(FrameError::InvalidPalette { len: colors.len() });
        }
        Ok(Self { colors })
    }

    /// The 7-color ACeP panel palette: black, white, green, blue, red,
    /// yellow, orange.
    pub fn inky7() -> Self {
        Self {
            colors: INKY7.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn get(&self, index: u8) -> Option<Rgb> {
        self.colors.get(index as usize).copied()
    }

    /// Index of the closest color. Ties go to the lower index.
    pub fn nearest(&self, color: Rgb) -> u8 {
        self.colors
            .iter()
            .enumerate()
            .min_by_key(|(_, c)| c.distance_sq(color))
            .map(|(i, _)| i as u8)
            .unwrap_or(0)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::inky7()
    }
}

impl TryFrom<Vec<Rgb>> for Palette {
    type Error = FrameError;

    fn try_from(colors: Vec<Rgb>) -> Result<Self, Self::Error> {
        Self::new(colors)
    }
}

impl From<Palette> for Vec<Rgb> {
    fn from(p: Palette) -> Self {
        p.colors
    }
}
