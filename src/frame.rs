use image::{DynamicImage, RgbImage, RgbaImage};
use std::fmt;

/// Largest intensity representable by the supported 8-bit formats
pub const MAX_INTENSITY: u8 = u8::MAX;

/// Presentation timestamp in microseconds, carried from input to output untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn micros(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// Pixel storage of a frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameImage {
    Rgb8(RgbImage),
    Rgba8(RgbaImage),
}

impl FrameImage {
    pub fn format(&self) -> PixelFormat {
        match self {
            FrameImage::Rgb8(_) => PixelFormat::Rgb8,
            FrameImage::Rgba8(_) => PixelFormat::Rgba8,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            FrameImage::Rgb8(img) => img.dimensions(),
            FrameImage::Rgba8(img) => img.dimensions(),
        }
    }

    /// Interleaved channel bytes in row-major order
    pub fn as_raw(&self) -> &[u8] {
        match self {
            FrameImage::Rgb8(img) => img.as_raw(),
            FrameImage::Rgba8(img) => img.as_raw(),
        }
    }

    /// Convert a decoded image into the requested frame format
    pub fn from_dynamic(image: &DynamicImage, format: PixelFormat) -> Self {
        match format {
            PixelFormat::Rgb8 => FrameImage::Rgb8(image.to_rgb8()),
            PixelFormat::Rgba8 => FrameImage::Rgba8(image.to_rgba8()),
        }
    }
}

/// A timestamped video frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub timestamp: Timestamp,
    pub image: FrameImage,
}

impl Frame {
    pub fn new(timestamp: Timestamp, image: FrameImage) -> Self {
        Self { timestamp, image }
    }

    pub fn rgb(timestamp: Timestamp, image: RgbImage) -> Self {
        Self::new(timestamp, FrameImage::Rgb8(image))
    }

    pub fn rgba(timestamp: Timestamp, image: RgbaImage) -> Self {
        Self::new(timestamp, FrameImage::Rgba8(image))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn format(&self) -> PixelFormat {
        self.image.format()
    }
}
