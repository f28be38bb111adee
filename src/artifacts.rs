//! Per-episode JPEG snapshots.
//!
//! One file per alert episode, named by the episode's date and time. Written
//! once, read back once for the email attachment, never modified.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use image::RgbImage;

pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Encode an annotated RGB frame as `pothole_<date>_<time>.jpg`.
    pub fn save_snapshot(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        date: &str,
        time: &str,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create image directory {}", self.dir.display()))?;

        let image = RgbImage::from_raw(width, height, pixels.to_vec())
            .ok_or_else(|| anyhow!("frame buffer does not match {}x{} RGB", width, height))?;

        let path = self.dir.join(format!("pothole_{}_{}.jpg", date, time));
        image
            .save_with_format(&path, image::ImageFormat::Jpeg)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        Ok(path)
    }
}
