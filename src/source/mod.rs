mod sequence;

pub use sequence::ImageSequenceSource;

use crate::frame::Frame;
use crate::mask::Mask;
use anyhow::Result;

/// Trait for inputs delivering synchronized (frame, mask) pairs
pub trait FramePairSource {
    /// Next pair, or `None` once the input is exhausted
    fn next_pair(&mut self) -> Result<Option<(Frame, Mask)>>;

    /// Number of pairs still to come, when known
    fn remaining(&self) -> Option<usize> {
        None
    }
}
