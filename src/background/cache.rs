use super::{prepare_background, BackgroundSource};
use crate::config::ResizeFilter;
use crate::error::Result;
use crate::frame::{FrameImage, PixelFormat};
use image::DynamicImage;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    width: u32,
    height: u32,
    format: PixelFormat,
}

/// A shared background asset plus one working copy sized for the
/// current frame geometry.
///
/// The working copy is rebuilt only when frame dimensions or format
/// change.
#[derive(Debug)]
pub struct BackgroundCache {
    asset: Arc<DynamicImage>,
    filter: ResizeFilter,
    cached: Option<(CacheKey, FrameImage)>,
}

impl BackgroundCache {
    pub fn new(asset: Arc<DynamicImage>, filter: ResizeFilter) -> Self {
        Self {
            asset,
            filter,
            cached: None,
        }
    }

    /// Resolve `name` through `source` once, up front
    pub fn load(source: &dyn BackgroundSource, name: &str, filter: ResizeFilter) -> Result<Self> {
        let asset = source.load(name)?;
        Ok(Self::new(asset, filter))
    }

    pub fn asset(&self) -> &Arc<DynamicImage> {
        &self.asset
    }

    /// Background resampled to `width` x `height` in `format`
    pub fn get(&mut self, width: u32, height: u32, format: PixelFormat) -> &FrameImage {
        let key = CacheKey {
            width,
            height,
            format,
        };

        if self.cached.as_ref().is_some_and(|(cached, _)| *cached != key) {
            self.cached = None;
        }

        let (_, image) = self.cached.get_or_insert_with(|| {
            tracing::debug!("Resizing background for {}x{} {:?}", width, height, format);
            (
                key,
                prepare_background(&self.asset, width, height, format, self.filter),
            )
        });
        image
    }

    /// Drop the working copy; the next `get` rebuilds it
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn is_cached_for(&self, width: u32, height: u32, format: PixelFormat) -> bool {
        let key = CacheKey {
            width,
            height,
            format,
        };
        self.cached.as_ref().is_some_and(|(cached, _)| *cached == key)
    }
}
