//! Virtual-background compositing.
//!
//! Given a video frame and a segmentation mask for the same timestamp,
//! replaces everything outside the subject with a substitute background:
//!
//! 1. the background is resampled to the frame size ([`background`]),
//! 2. the mask is expanded to full range, replicated per channel and
//!    inverted ([`mask::prepare_masks`]),
//! 3. both masks are feathered with a gaussian blur and rescaled to
//!    [0, 1] weights ([`mask::feather`]),
//! 4. frame and background are blended with those weights ([`composite`]).

pub mod background;
pub mod composite;
pub mod config;
pub mod error;
pub mod frame;
pub mod mask;
pub mod pipeline;
pub mod sink;
pub mod source;

pub use background::{BackgroundCache, BackgroundSource, DirectorySource, MemorySource};
pub use composite::{composite, composite_from_source, FrameProcessor, MaskCompositor};
pub use config::{CompositorConfig, FeatherConfig, RangePolicy, ResizeFilter, WeightMode};
pub use error::{CompositeError, Result};
pub use frame::{Frame, FrameImage, PixelFormat, Timestamp, MAX_INTENSITY};
pub use mask::{BlendWeights, Mask};
