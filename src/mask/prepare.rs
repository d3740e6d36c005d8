use super::types::Mask;
use crate::config::RangePolicy;
use crate::error::{alloc_buffer, Result};
use crate::frame::{PixelFormat, MAX_INTENSITY};

/// Subject and background masks at full intensity, one value per channel
/// of the target pixel format, interleaved like the frame itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedMasks {
    pub width: u32,
    pub height: u32,
    pub channels: usize,
    pub subject: Vec<u8>,
    pub background: Vec<u8>,
}

impl PreparedMasks {
    /// True when subject + background equals max intensity everywhere
    pub fn is_complementary(&self) -> bool {
        self.subject
            .iter()
            .zip(&self.background)
            .all(|(&s, &b)| u16::from(s) + u16::from(b) == u16::from(MAX_INTENSITY))
    }
}

/// Expand the raw mask to full range, replicate it across every channel
/// of `format`, and invert it for the background.
pub fn prepare_masks(mask: &Mask, format: PixelFormat, policy: RangePolicy) -> Result<PreparedMasks> {
    let _span = tracing::debug_span!("prepare_masks").entered();

    let gray = mask.to_full_range(policy)?;
    let (width, height) = gray.dimensions();
    let channels = format.channels();

    let mut subject = alloc_buffer::<u8>(width, height, channels)?;
    for (px, &v) in subject.chunks_exact_mut(channels).zip(gray.as_raw()) {
        px.fill(v);
    }

    let mut background = alloc_buffer::<u8>(width, height, channels)?;
    for (dst, &s) in background.iter_mut().zip(&subject) {
        *dst = !s;
    }

    Ok(PreparedMasks {
        width,
        height,
        channels,
        subject,
        background,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replicates_across_channels() {
        let mask = Mask::normalized(2, 1, vec![1.0, 0.0]).unwrap();
        let prepared = prepare_masks(&mask, PixelFormat::Rgb8, RangePolicy::Reject).unwrap();
        assert_eq!(prepared.channels, 3);
        assert_eq!(prepared.subject, vec![255, 255, 255, 0, 0, 0]);
        assert_eq!(prepared.background, vec![0, 0, 0, 255, 255, 255]);
    }

    #[test]
    fn complement_sums_to_max_for_every_value() {
        let values: Vec<f32> = (0..=255).map(|v| v as f32 / 255.0).collect();
        let mask = Mask::normalized(16, 16, values).unwrap();
        let prepared = prepare_masks(&mask, PixelFormat::Rgba8, RangePolicy::Reject).unwrap();
        assert_eq!(prepared.subject.len(), 16 * 16 * 4);
        assert!(prepared.is_complementary());
    }
}
