use crate::error::{alloc_buffer, check_buffer_len, CompositeError, Result};
use crate::frame::{FrameImage, MAX_INTENSITY};
use crate::mask::BlendWeights;
use image::{ImageBuffer, Pixel};

/// `foreground * subject + background * background_weight`, per channel,
/// rounded and saturated to the 8-bit range.
pub fn blend(
    foreground: &FrameImage,
    background: &FrameImage,
    weights: &BlendWeights,
) -> Result<FrameImage> {
    let _span = tracing::debug_span!("blend").entered();

    check_geometry(foreground, background, weights)?;

    match (foreground, background) {
        (FrameImage::Rgb8(fg), FrameImage::Rgb8(bg)) => Ok(FrameImage::Rgb8(blend_buffers(fg, bg, weights)?)),
        (FrameImage::Rgba8(fg), FrameImage::Rgba8(bg)) => {
            Ok(FrameImage::Rgba8(blend_buffers(fg, bg, weights)?))
        }
        _ => Err(CompositeError::ChannelMismatch {
            expected: foreground.format().channels(),
            actual: background.format().channels(),
        }),
    }
}

fn check_geometry(foreground: &FrameImage, background: &FrameImage, weights: &BlendWeights) -> Result<()> {
    let expected = foreground.dimensions();
    if background.dimensions() != expected {
        return Err(CompositeError::DimensionMismatch {
            what: "background",
            expected,
            actual: background.dimensions(),
        });
    }
    if (weights.width, weights.height) != expected {
        return Err(CompositeError::DimensionMismatch {
            what: "mask",
            expected,
            actual: (weights.width, weights.height),
        });
    }
    let channels = foreground.format().channels();
    if weights.channels != channels {
        return Err(CompositeError::ChannelMismatch {
            expected: channels,
            actual: weights.channels,
        });
    }
    let (width, height) = expected;
    check_buffer_len("subject weight", weights.subject.len(), width, height, channels)?;
    check_buffer_len("background weight", weights.background.len(), width, height, channels)?;
    Ok(())
}

fn blend_buffers<P>(
    fg: &ImageBuffer<P, Vec<u8>>,
    bg: &ImageBuffer<P, Vec<u8>>,
    weights: &BlendWeights,
) -> Result<ImageBuffer<P, Vec<u8>>>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = fg.dimensions();
    let mut out = alloc_buffer::<u8>(width, height, usize::from(P::CHANNEL_COUNT))?;

    let max = f32::from(MAX_INTENSITY);
    let lanes = out
        .iter_mut()
        .zip(fg.as_raw().iter().zip(bg.as_raw()))
        .zip(weights.subject.iter().zip(&weights.background));
    for ((dst, (&f, &b)), (&ws, &wb)) in lanes {
        let v = f32::from(f) * ws + f32::from(b) * wb;
        *dst = v.round().clamp(0.0, max) as u8;
    }

    ImageBuffer::from_raw(width, height, out)
        .ok_or_else(|| CompositeError::Allocation("output buffer length mismatch".to_string()))
}
