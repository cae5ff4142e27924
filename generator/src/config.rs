//! Configuration for the image generator.

use std::path::{Path, PathBuf};

use anyhow::Context;
use radar_core::Palette;
use serde::{Deserialize, Serialize};

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenConfig {
    /// Display colors in framebuffer index order, as `[r, g, b]` triples.
    pub palette: Palette,
    /// Output image settings.
    pub output: OutputConfig,
    /// Zoom applied after cropping to the panel aspect ratio.
    pub zoom: ZoomConfig,
    /// Preview image settings.
    pub preview: PreviewConfig,
    /// Forecast lead time.
    pub forecast: ForecastConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Panel width in pixels.
    pub width: u16,
    /// Panel height in pixels.
    pub height: u16,
    /// Directory the generated files are written to.
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// Fraction of the cropped map kept on each axis (1.0 = no zoom).
    pub scale: f64,
    /// Zoom centre as a fraction of the cropped width.
    pub centre_x: f64,
    /// Zoom centre as a fraction of the cropped height.
    pub centre_y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Saturation multiplier for `combined.jpg`.
    pub saturation: f32,
    /// JPEG quality for `combined.jpg`.
    pub jpeg_quality: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Minutes ahead of the snapshot the precipitation tiles show.
    pub minutes: u32,
    /// IANA zone the caption's timestamp is shown in.
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            palette: Palette::inky7(),
            output: OutputConfig::default(),
            zoom: ZoomConfig::default(),
            preview: PreviewConfig::default(),
            forecast: ForecastConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: radar_core::WIDTH,
            height: radar_core::HEIGHT,
            dir: PathBuf::from("images"),
        }
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            scale: 0.7,
            centre_x: 0.38,
            centre_y: 0.35,
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            saturation: 1.3,
            jpeg_quality: 85,
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            minutes: 10,
            timezone: "Europe/London".into(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl GenConfig {
    /// Load from a TOML file. No path means defaults; a path that does
    /// not parse is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let cfg: Self = toml::from_str(&contents)
            .with_context(|| format!("invalid config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.output.width == 0 || self.output.height == 0 {
            anyhow::bail!(
                "output size must be non-zero, got {}x{}",
                self.output.width,
                self.output.height
            );
        }
        if !(self.zoom.scale > 0.0 && self.zoom.scale <= 1.0) {
            anyhow::bail!("zoom.scale must be in (0, 1], got {}", self.zoom.scale);
        }
        crate::caption::parse_zone(&self.forecast.timezone)?;
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use radar_core::Rgb;

    #[test]
    fn default_config_serializes() {
        let cfg = GenConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert!(text.contains("palette"));
        assert!(text.contains("saturation"));
    }

    #[test]
    fn roundtrip_config() {
        let cfg = GenConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed: GenConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.output.width, 800);
        assert_eq!(parsed.output.height, 480);
        assert_eq!(parsed.palette, Palette::inky7());
        assert_eq!(parsed.forecast.minutes, 10);
        assert_eq!(parsed.forecast.timezone, "Europe/London");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: GenConfig = toml::from_str(
            r#"
            palette = [[0, 0, 0], [255, 255, 255]]

            [zoom]
            scale = 1.0
            "#,
        )
        .unwrap();
        assert_eq!(parsed.palette.len(), 2);
        assert_eq!(parsed.palette.get(1), Some(Rgb::new(255, 255, 255)));
        assert_eq!(parsed.zoom.scale, 1.0);
        assert_eq!(parsed.zoom.centre_x, 0.38);
        assert_eq!(parsed.preview.jpeg_quality, 85);
    }

    #[test]
    fn empty_palette_rejected() {
        let parsed: Result<GenConfig, _> = toml::from_str("palette = []");
        assert!(parsed.is_err());
    }

    #[test]
    fn bad_timezone_rejected() {
        let mut cfg = GenConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.forecast.timezone = "Nowhere/Special".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn bad_zoom_rejected() {
        let mut cfg = GenConfig::default();
        cfg.zoom.scale = 1.5;
        assert!(cfg.validate().is_err());
    }
}
