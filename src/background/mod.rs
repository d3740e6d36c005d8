mod cache;
mod source;

pub use cache::BackgroundCache;
pub use source::{DirectorySource, MemorySource};

use crate::config::ResizeFilter;
use crate::error::Result;
use crate::frame::{FrameImage, PixelFormat};
use image::{imageops, DynamicImage};
use std::sync::Arc;

/// Resolves a background asset by logical name.
///
/// Implementations decide where assets live; the compositor only reads
/// the returned image and never mutates it.
pub trait BackgroundSource {
    /// Load the named background, failing with
    /// [`CompositeError::BackgroundUnavailable`](crate::CompositeError::BackgroundUnavailable)
    /// when it cannot be resolved or decoded
    fn load(&self, name: &str) -> Result<Arc<DynamicImage>>;
}

/// Resample `background` to exactly `width` x `height` in `format`.
///
/// Stretches to fit; aspect ratio is not preserved and nothing is cropped.
/// An image that already has the target size is returned pixel-identical.
pub fn prepare_background(
    background: &DynamicImage,
    width: u32,
    height: u32,
    format: PixelFormat,
    filter: ResizeFilter,
) -> FrameImage {
    let _span = tracing::debug_span!("prepare_background", width, height).entered();

    let converted = FrameImage::from_dynamic(background, format);
    if converted.dimensions() == (width, height) {
        return converted;
    }

    let filter = filter.filter_type();
    match converted {
        FrameImage::Rgb8(img) => FrameImage::Rgb8(imageops::resize(&img, width, height, filter)),
        FrameImage::Rgba8(img) => FrameImage::Rgba8(imageops::resize(&img, width, height, filter)),
    }
}
