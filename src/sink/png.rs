use super::OutputSink;
use crate::frame::{Frame, FrameImage};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Writes each frame as `frame_<timestamp>.png` in a directory
pub struct PngSequenceSink {
    dir: PathBuf,
    written: u64,
}

impl PngSequenceSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        tracing::info!("Writing composited frames to {}", dir.display());
        Ok(Self { dir, written: 0 })
    }

    pub fn path_for(&self, frame: &Frame) -> PathBuf {
        self.dir
            .join(format!("frame_{:012}.png", frame.timestamp.micros()))
    }
}

impl OutputSink for PngSequenceSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let path = self.path_for(frame);
        let saved = match &frame.image {
            FrameImage::Rgb8(img) => img.save(&path),
            FrameImage::Rgba8(img) => img.save(&path),
        };
        saved.with_context(|| format!("Failed to write {}", path.display()))?;
        self.written += 1;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.written
    }
}
