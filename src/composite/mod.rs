mod blend;
mod compositor;

pub use blend::blend;
pub use compositor::{FrameProcessor, MaskCompositor};

use crate::background::{prepare_background, BackgroundSource};
use crate::config::CompositorConfig;
use crate::error::{CompositeError, Result};
use crate::frame::{Frame, FrameImage};
use crate::mask::{blend_weights, Mask};
use image::DynamicImage;

/// Replace everything outside the subject in `frame` with `background`.
///
/// Resamples the background for this call only; use [`MaskCompositor`]
/// to keep the resized copy between frames. The output carries the input
/// timestamp.
pub fn composite(
    frame: &Frame,
    mask: &Mask,
    background: &DynamicImage,
    config: &CompositorConfig,
) -> Result<Frame> {
    let _span = tracing::debug_span!("composite", ts = frame.timestamp.micros()).entered();

    config.validate()?;
    check_mask(frame, mask)?;

    let (width, height) = frame.dimensions();
    let format = frame.format();
    let resized = prepare_background(background, width, height, format, config.resize_filter);
    composite_prepared(frame, mask, &resized, config)
}

/// Like [`composite`], but resolves the background through `source` on
/// every call. A resolution failure yields an error and no frame.
pub fn composite_from_source(
    frame: &Frame,
    mask: &Mask,
    source: &dyn BackgroundSource,
    name: &str,
    config: &CompositorConfig,
) -> Result<Frame> {
    let background = source.load(name)?;
    composite(frame, mask, &background, config)
}

fn check_mask(frame: &Frame, mask: &Mask) -> Result<()> {
    let expected = frame.dimensions();
    let actual = mask.dimensions();
    if actual != expected {
        return Err(CompositeError::DimensionMismatch {
            what: "mask",
            expected,
            actual,
        });
    }
    Ok(())
}

/// Blend `frame` over an already-resized background
fn composite_prepared(
    frame: &Frame,
    mask: &Mask,
    background: &FrameImage,
    config: &CompositorConfig,
) -> Result<Frame> {
    let weights = blend_weights(mask, frame.format(), config)?;
    let image = blend(&frame.image, background, &weights)?;
    Ok(Frame::new(frame.timestamp, image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::MemorySource;
    use crate::config::FeatherConfig;
    use crate::frame::Timestamp;
    use image::{Rgb, RgbImage};

    fn unblurred() -> CompositorConfig {
        CompositorConfig {
            feather: FeatherConfig::disabled(),
            ..CompositorConfig::default()
        }
    }

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(rgb))
    }

    #[test]
    fn top_subject_bottom_background() {
        let frame = Frame::rgb(Timestamp(40_000), solid(2, 2, [255, 0, 0]));
        let mask = Mask::normalized(2, 2, vec![1.0, 1.0, 0.0, 0.0]).unwrap();
        let background = DynamicImage::ImageRgb8(solid(2, 2, [0, 0, 255]));

        let out = composite(&frame, &mask, &background, &unblurred()).unwrap();
        assert_eq!(out.timestamp, Timestamp(40_000));
        match out.image {
            FrameImage::Rgb8(img) => {
                assert_eq!(*img.get_pixel(0, 0), Rgb([255, 0, 0]));
                assert_eq!(*img.get_pixel(1, 0), Rgb([255, 0, 0]));
                assert_eq!(*img.get_pixel(0, 1), Rgb([0, 0, 255]));
                assert_eq!(*img.get_pixel(1, 1), Rgb([0, 0, 255]));
            }
            FrameImage::Rgba8(_) => panic!("format changed"),
        }
    }

    #[test]
    fn mask_size_mismatch_is_rejected() {
        let frame = Frame::rgb(Timestamp(0), solid(4, 4, [1, 2, 3]));
        let mask = Mask::uniform(2, 2, 1.0);
        let background = DynamicImage::new_rgb8(4, 4);
        assert!(matches!(
            composite(&frame, &mask, &background, &unblurred()),
            Err(CompositeError::DimensionMismatch { what: "mask", .. })
        ));
    }

    #[test]
    fn missing_background_yields_no_frame() {
        let frame = Frame::rgb(Timestamp(1), solid(2, 2, [9, 9, 9]));
        let mask = Mask::uniform(2, 2, 0.5);
        let source = MemorySource::new();
        let result = composite_from_source(&frame, &mask, &source, "dino.jpg", &unblurred());
        assert!(matches!(result, Err(CompositeError::BackgroundUnavailable { .. })));
    }

    #[test]
    fn invalid_config_is_rejected_before_work() {
        let frame = Frame::rgb(Timestamp(0), solid(2, 2, [0, 0, 0]));
        let mask = Mask::uniform(2, 2, 1.0);
        let mut config = CompositorConfig::default();
        config.feather.kernel_size = 2;
        assert!(matches!(
            composite(&frame, &mask, &DynamicImage::new_rgb8(2, 2), &config),
            Err(CompositeError::InvalidConfig(_))
        ));
    }
}
