use super::{check_mask, composite_prepared};
use crate::background::{BackgroundCache, BackgroundSource};
use crate::config::CompositorConfig;
use crate::error::Result;
use crate::frame::Frame;
use crate::mask::Mask;
use image::DynamicImage;
use std::sync::Arc;

/// Trait for per-frame processors driven by a host pipeline.
///
/// The host delivers a video frame and its segmentation mask for the same
/// timestamp and collects one output frame, or a failure for that
/// timestamp.
pub trait FrameProcessor {
    /// Produce the output frame for one (frame, mask) pair
    fn process(&mut self, frame: &Frame, mask: &Mask) -> Result<Frame>;

    /// Forget per-session working data, such as a resized background copy.
    /// Processors that keep nothing between frames leave this empty.
    fn reset(&mut self) {}
}

/// Virtual-background compositor holding one background asset.
///
/// The asset is resolved once when the compositor is opened; the resized
/// working copy is kept until the frame geometry changes.
#[derive(Debug)]
pub struct MaskCompositor {
    config: CompositorConfig,
    background: BackgroundCache,
}

impl MaskCompositor {
    /// Resolve the background `name` through `source` and build a compositor
    pub fn open(source: &dyn BackgroundSource, name: &str, config: CompositorConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!("Opening compositor with background '{}'", name);
        let background = BackgroundCache::load(source, name, config.resize_filter)?;
        Ok(Self { config, background })
    }

    pub fn with_background(image: DynamicImage, config: CompositorConfig) -> Result<Self> {
        Self::with_shared_background(Arc::new(image), config)
    }

    /// Share one read-only background between several compositors
    pub fn with_shared_background(image: Arc<DynamicImage>, config: CompositorConfig) -> Result<Self> {
        config.validate()?;
        let background = BackgroundCache::new(image, config.resize_filter);
        Ok(Self { config, background })
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn background(&self) -> &BackgroundCache {
        &self.background
    }
}

impl FrameProcessor for MaskCompositor {
    fn process(&mut self, frame: &Frame, mask: &Mask) -> Result<Frame> {
        let _span = tracing::debug_span!("mask_composite", ts = frame.timestamp.micros()).entered();

        check_mask(frame, mask)?;
        let (width, height) = frame.dimensions();
        let background = self.background.get(width, height, frame.format());
        composite_prepared(frame, mask, background, &self.config)
    }

    fn reset(&mut self) {
        tracing::info!("Dropping cached background copy");
        self.background.invalidate();
    }
}
