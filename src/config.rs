//! Compositor configuration

use crate::error::{CompositeError, Result};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest accepted feather kernel, in pixels
pub const MAX_KERNEL_SIZE: u32 = 255;

/// How blend weights are derived from the subject and background masks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WeightMode {
    /// Blur the subject and background masks in two independent passes
    #[default]
    Independent,
    /// Blur only the subject mask and take the background weight as its
    /// complement, so the weights sum to exactly 1 after feathering
    Complementary,
}

/// What to do with normalized mask values outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Fail the invocation, reporting the first offending pixel
    #[default]
    Reject,
    /// Clamp into [0, 1]; NaN becomes 0
    Clamp,
}

/// Resampling filter used to fit the background to the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ResizeFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Gaussian feathering parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatherConfig {
    /// Odd kernel size in pixels; 1 disables feathering
    pub kernel_size: u32,
    /// Standard deviation in pixels; zero or negative derives it from `kernel_size`
    pub sigma: f32,
}

impl Default for FeatherConfig {
    fn default() -> Self {
        Self {
            kernel_size: 9,
            sigma: 7.0,
        }
    }
}

impl FeatherConfig {
    /// Feathering switched off
    pub fn disabled() -> Self {
        Self {
            kernel_size: 1,
            sigma: 0.0,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.kernel_size == 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.kernel_size == 0 || self.kernel_size % 2 == 0 {
            return Err(CompositeError::invalid_config(format!(
                "feather kernel size must be odd and positive, got {}",
                self.kernel_size
            )));
        }
        if self.kernel_size > MAX_KERNEL_SIZE {
            return Err(CompositeError::invalid_config(format!(
                "feather kernel size {} exceeds {MAX_KERNEL_SIZE}",
                self.kernel_size
            )));
        }
        if !self.sigma.is_finite() {
            return Err(CompositeError::invalid_config("feather sigma must be finite"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    pub feather: FeatherConfig,
    pub weight_mode: WeightMode,
    pub range_policy: RangePolicy,
    pub resize_filter: ResizeFilter,
}

impl CompositorConfig {
    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            CompositeError::invalid_config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            CompositeError::invalid_config(format!("cannot parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.feather.validate()
    }
}
