use super::prepare::PreparedMasks;
use crate::config::{FeatherConfig, WeightMode, MAX_KERNEL_SIZE};
use crate::error::{alloc_buffer, check_buffer_len, CompositeError, Result};
use crate::frame::MAX_INTENSITY;

/// Per-channel blend weights in [0, 1], interleaved like the frame
#[derive(Debug, Clone, PartialEq)]
pub struct BlendWeights {
    pub width: u32,
    pub height: u32,
    pub channels: usize,
    pub subject: Vec<f32>,
    pub background: Vec<f32>,
}

/// Blur both masks, then rescale them from full intensity to [0, 1]
pub fn feather(
    masks: &PreparedMasks,
    config: &FeatherConfig,
    mode: WeightMode,
) -> Result<BlendWeights> {
    let _span = tracing::debug_span!("feather", kernel = config.kernel_size, ?mode).entered();

    config.validate()?;
    let (width, height, channels) = (masks.width, masks.height, masks.channels);
    check_buffer_len("subject mask", masks.subject.len(), width, height, channels)?;
    check_buffer_len("background mask", masks.background.len(), width, height, channels)?;
    let kernel = gaussian_kernel(config.kernel_size, config.sigma)?;

    let subject = blur_normalized(&masks.subject, width, height, channels, &kernel)?;
    let background = match mode {
        WeightMode::Independent => {
            blur_normalized(&masks.background, width, height, channels, &kernel)?
        }
        WeightMode::Complementary => {
            let mut bg = alloc_buffer::<f32>(width, height, channels)?;
            for (dst, &s) in bg.iter_mut().zip(&subject) {
                *dst = 1.0 - s;
            }
            bg
        }
    };

    Ok(BlendWeights {
        width,
        height,
        channels,
        subject,
        background,
    })
}

/// Sigma used when the configured one is not positive
pub fn derived_sigma(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D gaussian taps of length `size`
pub fn gaussian_kernel(size: u32, sigma: f32) -> Result<Vec<f32>> {
    if size == 0 || size % 2 == 0 {
        return Err(CompositeError::invalid_config(format!(
            "kernel size must be odd and positive, got {size}"
        )));
    }
    if size > MAX_KERNEL_SIZE {
        return Err(CompositeError::invalid_config(format!(
            "kernel size {size} exceeds {MAX_KERNEL_SIZE}"
        )));
    }
    if size == 1 {
        return Ok(vec![1.0]);
    }
    if !sigma.is_finite() {
        return Err(CompositeError::invalid_config("kernel sigma must be finite"));
    }

    let sigma = f64::from(if sigma > 0.0 { sigma } else { derived_sigma(size) });
    let r = (size / 2) as i64;
    let denom = 2.0 * sigma * sigma;
    let weights: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = i as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return Err(CompositeError::invalid_config("gaussian kernel sum is zero"));
    }

    Ok(weights.iter().map(|w| (w / sum) as f32).collect())
}

/// Blur full-intensity bytes and return weights in [0, 1]
fn blur_normalized(
    src: &[u8],
    width: u32,
    height: u32,
    channels: usize,
    kernel: &[f32],
) -> Result<Vec<f32>> {
    let max = f32::from(MAX_INTENSITY);
    let mut values = alloc_buffer::<f32>(width, height, channels)?;
    for (dst, &v) in values.iter_mut().zip(src) {
        *dst = f32::from(v);
    }

    let mut blurred = if kernel.len() == 1 {
        values
    } else {
        let mut tmp = alloc_buffer::<f32>(width, height, channels)?;
        horizontal_pass(&values, &mut tmp, width, height, channels, kernel);
        vertical_pass(&tmp, &mut values, width, height, channels, kernel);
        values
    };

    for v in blurred.iter_mut() {
        *v = (*v / max).clamp(0.0, 1.0);
    }
    Ok(blurred)
}

/// Reflect an out-of-range index back into `0..n` without repeating the edge
/// pixel (`gfedcb|abcdefgh|gfedcba`).
fn reflect_101(i: i64, n: i64) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n - 1);
    let m = i.rem_euclid(period);
    (if m < n { m } else { period - m }) as usize
}

fn horizontal_pass(src: &[f32], dst: &mut [f32], width: u32, height: u32, channels: usize, k: &[f32]) {
    let radius = (k.len() / 2) as i64;
    let (w, h) = (width as usize, height as usize);
    for y in 0..h {
        let row = y * w;
        for x in 0..w {
            let out = (row + x) * channels;
            for c in 0..channels {
                let mut acc = 0.0f32;
                for (ki, &kw) in k.iter().enumerate() {
                    let sx = reflect_101(x as i64 + ki as i64 - radius, w as i64);
                    acc += kw * src[(row + sx) * channels + c];
                }
                dst[out + c] = acc;
            }
        }
    }
}

fn vertical_pass(src: &[f32], dst: &mut [f32], width: u32, height: u32, channels: usize, k: &[f32]) {
    let radius = (k.len() / 2) as i64;
    let (w, h) = (width as usize, height as usize);
    for y in 0..h {
        for x in 0..w {
            let out = (y * w + x) * channels;
            for c in 0..channels {
                let mut acc = 0.0f32;
                for (ki, &kw) in k.iter().enumerate() {
                    let sy = reflect_101(y as i64 + ki as i64 - radius, h as i64);
                    acc += kw * src[(sy * w + x) * channels + c];
                }
                dst[out + c] = acc;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RangePolicy;
    use crate::frame::PixelFormat;
    use crate::mask::{prepare_masks, Mask};

    fn step_masks(width: u32, height: u32) -> PreparedMasks {
        // left half subject, right half background
        let values = (0..height)
            .flat_map(|_| (0..width).map(move |x| if x < width / 2 { 1.0 } else { 0.0 }))
            .collect();
        let mask = Mask::normalized(width, height, values).unwrap();
        prepare_masks(&mask, PixelFormat::Rgb8, RangePolicy::Reject).unwrap()
    }

    #[test]
    fn kernel_sums_to_one_and_is_symmetric() {
        let k = gaussian_kernel(9, 7.0).unwrap();
        assert_eq!(k.len(), 9);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for i in 0..4 {
            assert!((k[i] - k[8 - i]).abs() < 1e-7);
        }
        assert!(k[4] > k[0]);
    }

    #[test]
    fn non_positive_sigma_is_derived_from_size() {
        let derived = gaussian_kernel(9, 0.0).unwrap();
        let explicit = gaussian_kernel(9, derived_sigma(9)).unwrap();
        assert_eq!(derived, explicit);
    }

    #[test]
    fn even_kernel_rejected() {
        assert!(gaussian_kernel(4, 1.0).is_err());
        assert!(gaussian_kernel(0, 1.0).is_err());
    }

    #[test]
    fn oversized_kernel_rejected() {
        assert!(matches!(
            gaussian_kernel(4_000_000_001, 7.0),
            Err(CompositeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn short_mask_buffers_are_reported() {
        let mut masks = step_masks(4, 2);
        masks.subject.truncate(3);
        assert!(matches!(
            feather(&masks, &FeatherConfig::default(), WeightMode::Independent),
            Err(CompositeError::BufferLength { what: "subject mask", expected: 24, actual: 3 })
        ));

        let mut masks = step_masks(4, 2);
        masks.background.pop();
        assert!(matches!(
            feather(&masks, &FeatherConfig::default(), WeightMode::Complementary),
            Err(CompositeError::BufferLength { what: "background mask", .. })
        ));
    }

    #[test]
    fn reflect_101_mirrors_without_edge_repeat() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(-7, 2), 1);
        assert_eq!(reflect_101(3, 1), 0);
    }

    #[test]
    fn kernel_size_one_is_identity() {
        let masks = step_masks(4, 2);
        let weights = feather(&masks, &FeatherConfig::disabled(), WeightMode::Independent).unwrap();
        let expected: Vec<f32> = masks.subject.iter().map(|&v| v as f32 / 255.0).collect();
        assert_eq!(weights.subject, expected);
    }

    #[test]
    fn uniform_mask_stays_uniform() {
        let mask = Mask::uniform(6, 5, 1.0);
        let masks = prepare_masks(&mask, PixelFormat::Rgb8, RangePolicy::Reject).unwrap();
        let weights = feather(&masks, &FeatherConfig::default(), WeightMode::Independent).unwrap();
        assert!(weights.subject.iter().all(|&w| (w - 1.0).abs() < 1e-5));
        assert!(weights.background.iter().all(|&w| w.abs() < 1e-5));
    }

    #[test]
    fn blur_softens_the_boundary() {
        let masks = step_masks(16, 3);
        let weights = feather(&masks, &FeatherConfig::default(), WeightMode::Independent).unwrap();
        // pixel just left of the edge, first channel of the middle row
        let idx = (16 + 7) * 3;
        assert!(weights.subject[idx] < 1.0);
        assert!(weights.subject[idx] > 0.5);
    }

    #[test]
    fn complementary_weights_sum_to_one() {
        let masks = step_masks(12, 4);
        let weights = feather(&masks, &FeatherConfig::default(), WeightMode::Complementary).unwrap();
        for (s, b) in weights.subject.iter().zip(&weights.background) {
            assert!((s + b - 1.0).abs() <= f32::EPSILON);
        }
    }

    #[test]
    fn independent_weights_sum_close_to_one() {
        let masks = step_masks(12, 4);
        let weights = feather(&masks, &FeatherConfig::default(), WeightMode::Independent).unwrap();
        for (s, b) in weights.subject.iter().zip(&weights.background) {
            assert!((s + b - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn wider_spread_never_sharpens_the_edge() {
        let masks = step_masks(24, 1);
        let max_step = |sigma: f32| {
            let config = FeatherConfig {
                kernel_size: 9,
                sigma,
            };
            let w = feather(&masks, &config, WeightMode::Independent).unwrap();
            w.subject
                .chunks_exact(3)
                .map(|px| px[0])
                .collect::<Vec<_>>()
                .windows(2)
                .map(|p| (p[0] - p[1]).abs())
                .fold(0.0f32, f32::max)
        };

        let steps: Vec<f32> = [0.5, 1.0, 2.0, 4.0, 7.0, 12.0].iter().map(|&s| max_step(s)).collect();
        for pair in steps.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-6, "{steps:?}");
        }
        assert!(steps[steps.len() - 1] < 1.0);
    }
}
