use crate::config::RangePolicy;
use crate::error::{alloc_buffer, CompositeError, Result};
use crate::frame::MAX_INTENSITY;
use image::GrayImage;
use ndarray::ArrayViewD;

/// Segmentation mask: per-pixel subject confidence, row-major.
///
/// The encoding is explicit rather than guessed from the values:
/// `Normalized` holds confidences in [0.0, 1.0] (what segmentation models
/// emit), `FullRange` holds 8-bit intensities where 255 is full subject.
#[derive(Debug, Clone, PartialEq)]
pub enum Mask {
    Normalized {
        width: u32,
        height: u32,
        values: Vec<f32>,
    },
    FullRange(GrayImage),
}

impl Mask {
    pub fn normalized(width: u32, height: u32, values: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if values.len() != expected {
            return Err(CompositeError::invalid_config(format!(
                "normalized mask has {} values, expected {expected} for {width}x{height}",
                values.len()
            )));
        }
        Ok(Mask::Normalized {
            width,
            height,
            values,
        })
    }

    pub fn full_range(image: GrayImage) -> Self {
        Mask::FullRange(image)
    }

    /// Uniform mask with the given confidence at every pixel
    pub fn uniform(width: u32, height: u32, confidence: f32) -> Self {
        Mask::Normalized {
            width,
            height,
            values: vec![confidence; width as usize * height as usize],
        }
    }

    /// Build a normalized mask from a model output tensor.
    ///
    /// Accepts shapes `[H, W]`, `[1, H, W]` and `[1, 1, H, W]`.
    pub fn from_tensor(tensor: ArrayViewD<'_, f32>) -> Result<Self> {
        let shape = tensor.shape();
        let (height, width) = match *shape {
            [h, w] => (h, w),
            [1, h, w] => (h, w),
            [1, 1, h, w] => (h, w),
            _ => {
                return Err(CompositeError::invalid_config(format!(
                    "unsupported mask tensor shape {shape:?}"
                )))
            }
        };
        let to_u32 = |v: usize, axis: &str| {
            u32::try_from(v).map_err(|_| {
                CompositeError::invalid_config(format!("mask tensor {axis} {v} does not fit in u32"))
            })
        };
        let (width, height) = (to_u32(width, "width")?, to_u32(height, "height")?);

        let mut values = alloc_buffer::<f32>(width, height, 1)?;
        for (dst, &v) in values.iter_mut().zip(tensor.iter()) {
            *dst = v;
        }
        Self::normalized(width, height, values)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Mask::Normalized { width, height, .. } => (*width, *height),
            Mask::FullRange(img) => img.dimensions(),
        }
    }

    /// Expand to full 8-bit range.
    ///
    /// Normalized values are scaled by 255 and rounded. Values outside
    /// [0, 1] (and NaN) are handled by `policy`; full-range masks pass
    /// through unchanged.
    pub fn to_full_range(&self, policy: RangePolicy) -> Result<GrayImage> {
        match self {
            Mask::FullRange(img) => {
                let (width, height) = img.dimensions();
                let mut out = alloc_buffer::<u8>(width, height, 1)?;
                out.copy_from_slice(img.as_raw());
                GrayImage::from_raw(width, height, out).ok_or_else(|| {
                    CompositeError::Allocation("mask buffer length mismatch".to_string())
                })
            }
            Mask::Normalized {
                width,
                height,
                values,
            } => {
                let mut out = alloc_buffer::<u8>(*width, *height, 1)?;
                let max = f32::from(MAX_INTENSITY);
                for (index, (dst, &v)) in out.iter_mut().zip(values).enumerate() {
                    let v = match policy {
                        RangePolicy::Reject => {
                            if !(0.0..=1.0).contains(&v) {
                                return Err(CompositeError::MaskOutOfRange { index, value: v });
                            }
                            v
                        }
                        RangePolicy::Clamp => {
                            if v.is_nan() {
                                0.0
                            } else {
                                v.clamp(0.0, 1.0)
                            }
                        }
                    };
                    *dst = (v * max).round() as u8;
                }
                GrayImage::from_raw(*width, *height, out).ok_or_else(|| {
                    CompositeError::Allocation("mask buffer length mismatch".to_string())
                })
            }
        }
    }
}
