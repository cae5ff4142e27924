use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use radar_core::{Framebuffer, FramebufferWriter, ImageInfo, IndexedRaster, Palette};
use tracing::info;

pub const FRAMEBUFFER_FILE: &str = "quantized.bin";
pub const QUANTIZED_PREVIEW_FILE: &str = "quantized.png";
pub const COMBINED_FILE: &str = "combined.jpg";
pub const INFO_FILE: &str = "image_info.txt";

/// Files produced by one generation cycle.
pub struct OutputSet {
    pub framebuffer: PathBuf,
    pub quantized_preview: PathBuf,
    pub combined: PathBuf,
    pub info: PathBuf,
}

impl OutputSet {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            framebuffer: dir.join(FRAMEBUFFER_FILE),
            quantized_preview: dir.join(QUANTIZED_PREVIEW_FILE),
            combined: dir.join(COMBINED_FILE),
            info: dir.join(INFO_FILE),
        }
    }

    fn paths(&self) -> [&Path; 4] {
        [&self.framebuffer, &self.quantized_preview, &self.combined, &self.info]
    }

    /// Copy every file into `dir`, creating it if needed.
    pub fn deploy(&self, dir: &Path) -> anyhow::Result<()> {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        for src in self.paths() {
            let Some(name) = src.file_name() else {
                continue;
            };
            let dst = dir.join(name);
            fs::copy(src, &dst)
                .with_context(|| format!("failed to copy {} to {}", src.display(), dst.display()))?;
        }
        info!("copied outputs to {}", dir.display());
        Ok(())
    }
}

pub fn write_framebuffer(path: &Path, fb: &Framebuffer) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = FramebufferWriter::new(BufWriter::new(file), fb.width(), fb.height());
    writer.write_framebuffer(fb)?;
    writer.finish()?;
    info!("wrote framebuffer {} ({} bytes)", path.display(), fb.as_bytes().len());
    Ok(())
}

/// Save the quantized image in palette colors so it can be eyeballed.
pub fn write_quantized_preview(path: &Path, indexed: &IndexedRaster, palette: &Palette) -> anyhow::Result<()> {
    let rgb = indexed.to_rgb(palette)?;
    let img = RgbImage::from_raw(rgb.width(), rgb.height(), rgb.into_bytes())
        .context("preview buffer has the wrong size")?;
    img.save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote quantized preview {}", path.display());
    Ok(())
}

pub fn write_combined(path: &Path, img: &RgbImage, quality: u8) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), quality);
    img.write_with_encoder(encoder)
        .with_context(|| format!("failed to encode {}", path.display()))?;
    info!("wrote combined image {}", path.display());
    Ok(())
}

pub fn write_info(path: &Path, info: &ImageInfo) -> anyhow::Result<()> {
    fs::write(path, info.to_text()).with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote image info {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("radar-gen-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn outputs_written_and_deployed() {
        let dir = scratch_dir("outputs");
        let set = OutputSet::in_dir(&dir);
        let palette = Palette::inky7();

        let indexed = IndexedRaster::new(4, 2, vec![0, 1, 2, 3, 4, 5, 6, 0]).unwrap();
        let fb = radar_core::encode(&indexed, 4, 2).unwrap();
        write_framebuffer(&set.framebuffer, &fb).unwrap();
        write_quantized_preview(&set.quantized_preview, &indexed, &palette).unwrap();
        write_combined(&set.combined, &RgbImage::new(4, 2), 85).unwrap();
        write_info(
            &set.info,
            &ImageInfo {
                precip_ts: 7,
                text: "+10 mins forecast".into(),
            },
        )
        .unwrap();

        assert_eq!(fs::read(&set.framebuffer).unwrap(), vec![0, 1, 2, 3, 4, 5, 6, 0]);
        let preview = image::open(&set.quantized_preview).unwrap().to_rgb8();
        assert_eq!(preview.get_pixel(0, 1).0, [255, 0, 0]);

        let public = dir.join("public");
        set.deploy(&public).unwrap();
        let info = ImageInfo::parse(&fs::read_to_string(public.join(INFO_FILE)).unwrap()).unwrap();
        assert_eq!(info.precip_ts, 7);
        assert!(public.join(COMBINED_FILE).exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
