#![forbid(unsafe_code)]

use parallax_common::FeedPositionConfig;
use parallax_render::{Image, ImageFormat, RenderError};
use thiserror::Error;

pub mod buffer_state;
pub mod camera_feed;
pub mod server;

mod dummy;

pub use buffer_state::BufferState;
pub use camera_feed::{CameraFeed, FeedDevice, NullDevice};
pub use dummy::{PatternLayout, PatternSource};
pub use server::CameraServer;

/// Where a camera sits on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedPosition {
    #[default]
    Unspecified,
    Front,
    Back,
}

impl From<FeedPositionConfig> for FeedPosition {
    fn from(value: FeedPositionConfig) -> Self {
        match value {
            FeedPositionConfig::Unspecified => FeedPosition::Unspecified,
            FeedPositionConfig::Front => FeedPosition::Front,
            FeedPositionConfig::Back => FeedPosition::Back,
        }
    }
}

/// Which texture layout the last committed frame used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedDataType {
    #[default]
    NoImage,
    /// One RGB plane.
    Rgb,
    /// Luma plane plus interleaved chroma plane.
    YCbCr,
}

/// One half of a feed's double buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Zero,
    One,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Zero, Slot::One];

    pub const fn index(self) -> usize {
        match self {
            Slot::Zero => 0,
            Slot::One => 1,
        }
    }

    pub const fn other(self) -> Slot {
        match self {
            Slot::Zero => Slot::One,
            Slot::One => Slot::Zero,
        }
    }
}

/// Channel group within a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plane {
    /// RGB data, or luma for two-plane feeds.
    Primary,
    /// Interleaved CbCr; only meaningful for two-plane feeds.
    Chroma,
}

impl Plane {
    pub const ALL: [Plane; 2] = [Plane::Primary, Plane::Chroma];

    pub const fn index(self) -> usize {
        match self {
            Plane::Primary => 0,
            Plane::Chroma => 1,
        }
    }
}

/// Decoded pixel data for one frame.
#[derive(Debug, Clone)]
pub enum FramePlanes {
    Rgb(Image),
    YCbCr { luma: Image, chroma: Image },
}

impl FramePlanes {
    pub fn datatype(&self) -> FeedDataType {
        match self {
            FramePlanes::Rgb(_) => FeedDataType::Rgb,
            FramePlanes::YCbCr { .. } => FeedDataType::YCbCr,
        }
    }

    /// Dimensions that drive texture reallocation (RGB or luma plane).
    pub fn base_size(&self) -> (u32, u32) {
        match self {
            FramePlanes::Rgb(image) => (image.width(), image.height()),
            FramePlanes::YCbCr { luma, .. } => (luma.width(), luma.height()),
        }
    }

    pub(crate) fn validate(&self) -> MediaResult<()> {
        match self {
            FramePlanes::Rgb(image) => expect_format(Plane::Primary, image, ImageFormat::Rgb8),
            FramePlanes::YCbCr { luma, chroma } => {
                expect_format(Plane::Primary, luma, ImageFormat::L8)?;
                expect_format(Plane::Chroma, chroma, ImageFormat::Rg8)
            }
        }
    }
}

fn expect_format(plane: Plane, image: &Image, expected: ImageFormat) -> MediaResult<()> {
    if image.format() == expected {
        Ok(())
    } else {
        Err(MediaError::UnsupportedFormat {
            plane,
            expected,
            got: image.format(),
        })
    }
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("slot {0:?} was not claimed for writing")]
    SlotNotClaimed(Slot),
    #[error("{plane:?} plane must be {expected:?}, got {got:?}")]
    UnsupportedFormat {
        plane: Plane,
        expected: ImageFormat,
        got: ImageFormat,
    },
    #[error("feed {0} is already registered")]
    DuplicateFeed(u32),
    #[error("device activation failed: {0}")]
    Activation(anyhow::Error),
    #[error("texture storage error: {0}")]
    Render(#[from] RenderError),
}

pub type MediaResult<T> = Result<T, MediaError>;
