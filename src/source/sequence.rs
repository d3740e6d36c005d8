use super::FramePairSource;
use crate::frame::{Frame, FrameImage, PixelFormat, Timestamp};
use crate::mask::Mask;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

/// Pairs frame images with mask images from two directories.
///
/// Files are matched by sorted file name order; both directories must hold
/// the same number of images. Masks are read as 8-bit grayscale.
pub struct ImageSequenceSource {
    frames: Vec<PathBuf>,
    masks: Vec<PathBuf>,
    format: PixelFormat,
    frame_interval_us: i64,
    index: usize,
}

impl ImageSequenceSource {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        frame_dir: P,
        mask_dir: Q,
        format: PixelFormat,
        fps: u32,
    ) -> Result<Self> {
        if fps == 0 {
            bail!("fps must be positive");
        }

        let frames = list_images(frame_dir.as_ref())?;
        let masks = list_images(mask_dir.as_ref())?;
        if frames.len() != masks.len() {
            bail!(
                "{} frames but {} masks; every frame needs exactly one mask",
                frames.len(),
                masks.len()
            );
        }

        tracing::info!(
            "Image sequence: {} pairs from {}",
            frames.len(),
            frame_dir.as_ref().display()
        );

        Ok(Self {
            frames,
            masks,
            format,
            frame_interval_us: 1_000_000 / i64::from(fps),
            index: 0,
        })
    }
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if path.is_file() && is_image {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

impl FramePairSource for ImageSequenceSource {
    fn next_pair(&mut self) -> Result<Option<(Frame, Mask)>> {
        let (Some(frame_path), Some(mask_path)) = (self.frames.get(self.index), self.masks.get(self.index))
        else {
            return Ok(None);
        };

        let decoded = image::open(frame_path)
            .with_context(|| format!("Failed to decode frame {}", frame_path.display()))?;
        let mask = image::open(mask_path)
            .with_context(|| format!("Failed to decode mask {}", mask_path.display()))?
            .to_luma8();

        let timestamp = Timestamp(self.index as i64 * self.frame_interval_us);
        self.index += 1;

        Ok(Some((
            Frame::new(timestamp, FrameImage::from_dynamic(&decoded, self.format)),
            Mask::full_range(mask),
        )))
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.frames.len() - self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn write_pair(dir: &Path, name: &str) {
        std::fs::create_dir_all(dir.join("frames")).unwrap();
        std::fs::create_dir_all(dir.join("masks")).unwrap();
        RgbImage::from_pixel(3, 2, Rgb([10, 20, 30]))
            .save(dir.join("frames").join(name))
            .unwrap();
        GrayImage::from_pixel(3, 2, Luma([255]))
            .save(dir.join("masks").join(name))
            .unwrap();
    }

    #[test]
    fn yields_pairs_in_name_order_with_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        write_pair(dir.path(), "b.png");
        write_pair(dir.path(), "a.png");
        std::fs::write(dir.path().join("frames").join("notes.txt"), "skip me").unwrap();

        let mut source =
            ImageSequenceSource::new(dir.path().join("frames"), dir.path().join("masks"), PixelFormat::Rgb8, 25)
                .unwrap();
        assert_eq!(source.remaining(), Some(2));

        let (frame, mask) = source.next_pair().unwrap().unwrap();
        assert_eq!(frame.timestamp, Timestamp(0));
        assert_eq!(mask.dimensions(), (3, 2));

        let (frame, _) = source.next_pair().unwrap().unwrap();
        assert_eq!(frame.timestamp, Timestamp(40_000));
        assert!(source.next_pair().unwrap().is_none());
    }

    #[test]
    fn unequal_counts_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_pair(dir.path(), "a.png");
        std::fs::remove_file(dir.path().join("masks").join("a.png")).unwrap();
        assert!(
            ImageSequenceSource::new(dir.path().join("frames"), dir.path().join("masks"), PixelFormat::Rgb8, 30)
                .is_err()
        );
    }
}
