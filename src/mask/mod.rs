mod feather;
mod prepare;
pub mod types;

pub use feather::{derived_sigma, feather, gaussian_kernel, BlendWeights};
pub use prepare::{prepare_masks, PreparedMasks};
pub use types::Mask;

use crate::config::CompositorConfig;
use crate::error::Result;
use crate::frame::PixelFormat;

/// Turn a raw mask into blend weights for a frame of `format`
pub fn blend_weights(mask: &Mask, format: PixelFormat, config: &CompositorConfig) -> Result<BlendWeights> {
    let prepared = prepare_masks(mask, format, config.range_policy)?;
    feather(&prepared, &config.feather, config.weight_mode)
}
