//! Error types for compositing operations

use thiserror::Error;

/// Result type alias for compositing operations
pub type Result<T> = std::result::Result<T, CompositeError>;

#[derive(Error, Debug)]
pub enum CompositeError {
    /// The substitute background could not be resolved or decoded
    #[error("background '{name}' unavailable: {reason}")]
    BackgroundUnavailable { name: String, reason: String },

    /// Two buffers taking part in a per-pixel operation differ in size
    #[error("{what} dimensions {actual:?} do not match frame dimensions {expected:?}")]
    DimensionMismatch {
        what: &'static str,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("channel count mismatch: expected {expected}, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    /// A buffer's length disagrees with its stated width, height and channels
    #[error("{what} buffer holds {actual} values, expected {expected}")]
    BufferLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("mask value {value} at pixel {index} is outside [0, 1]")]
    MaskOutOfRange { index: usize, value: f32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("allocation failed: {0}")]
    Allocation(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl CompositeError {
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn background_unavailable(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::BackgroundUnavailable {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

fn buffer_len(width: u32, height: u32, channels: usize) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(channels))
        .ok_or_else(|| {
            CompositeError::Allocation(format!(
                "buffer size overflow for {width}x{height}x{channels}"
            ))
        })
}

/// Fail unless `actual` is exactly `width * height * channels`
pub(crate) fn check_buffer_len(
    what: &'static str,
    actual: usize,
    width: u32,
    height: u32,
    channels: usize,
) -> Result<()> {
    let expected = buffer_len(width, height, channels)?;
    if actual != expected {
        return Err(CompositeError::BufferLength {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Allocate a zeroed working buffer, reporting size overflow or allocator
/// refusal instead of aborting.
pub(crate) fn alloc_buffer<T: Clone + Default>(
    width: u32,
    height: u32,
    channels: usize,
) -> Result<Vec<T>> {
    let len = buffer_len(width, height, channels)?;

    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|e| {
        CompositeError::Allocation(format!("{len} elements for {width}x{height}x{channels}: {e}"))
    })?;
    buf.resize(len, T::default());
    Ok(buf)
}
