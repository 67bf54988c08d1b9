#![forbid(unsafe_code)]

use bitflags::bitflags;
use glam::Vec2;
use thiserror::Error;

pub mod image;
pub mod memory;

pub use image::{Image, ImageFormat};
pub use memory::{BlitRecord, MemoryRenderer, TextureInfo};

/// Opaque handle to a texture owned by a [`TextureStorage`]. Zero is never
/// handed out and acts as the invalid handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TextureId(pub u64);

impl TextureId {
    pub const INVALID: TextureId = TextureId(0);

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

/// Opaque handle to an offscreen render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RenderTargetId(pub u64);

impl RenderTargetId {
    pub const INVALID: RenderTargetId = RenderTargetId(0);

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureFlags: u32 {
        const MIPMAPS = 1;
        const REPEAT = 1 << 1;
        const FILTER = 1 << 2;
        /// Contents are replaced every frame.
        const STREAMING = 1 << 3;

        const DEFAULT = Self::MIPMAPS.bits() | Self::REPEAT.bits() | Self::FILTER.bits();
    }
}

/// Axis-aligned screen rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// True for the all-zero rectangle.
    pub fn is_empty(&self) -> bool {
        *self == Rect::default()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureId),
    #[error("texture {0:?} has no storage allocated")]
    NotAllocated(TextureId),
    #[error("image {got_width}x{got_height} {got_format:?} does not match texture {width}x{height} {format:?}")]
    ImageMismatch {
        width: u32,
        height: u32,
        format: ImageFormat,
        got_width: u32,
        got_height: u32,
        got_format: ImageFormat,
    },
    #[error("image data is {got} bytes, expected {expected}")]
    DataLength { expected: usize, got: usize },
    #[error("invalid texture size {0}x{1}")]
    InvalidSize(u32, u32),
    #[error("invalid render target {0:?}")]
    InvalidRenderTarget(RenderTargetId),
    #[error("rendering backend error: {0}")]
    Backend(String),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Texture storage of the host rendering server.
pub trait TextureStorage: Send + Sync {
    /// Create an empty texture handle with no storage behind it.
    fn texture_create(&self) -> RenderResult<TextureId>;

    /// (Re)allocate storage for `texture`. Existing contents are discarded.
    fn texture_allocate(
        &self,
        texture: TextureId,
        width: u32,
        height: u32,
        format: ImageFormat,
        flags: TextureFlags,
    ) -> RenderResult<()>;

    /// Upload `image` into previously allocated storage.
    fn texture_set_data(&self, texture: TextureId, image: &Image) -> RenderResult<()>;

    fn free(&self, texture: TextureId) -> RenderResult<()>;
}

/// Presentation side of the rendering server.
pub trait ScreenBlitter: Send + Sync {
    /// Bind `target` for subsequent draws, or the default framebuffer for `None`.
    fn set_current_render_target(&self, target: Option<RenderTargetId>);

    fn blit_render_target_to_screen(
        &self,
        target: RenderTargetId,
        rect: Rect,
        screen: u32,
    ) -> RenderResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags() {
        assert!(TextureFlags::DEFAULT.contains(TextureFlags::FILTER));
        assert!(TextureFlags::DEFAULT.contains(TextureFlags::MIPMAPS));
        assert!(!TextureFlags::DEFAULT.contains(TextureFlags::STREAMING));
    }

    #[test]
    fn test_handle_validity() {
        assert!(!TextureId::INVALID.is_valid());
        assert!(TextureId(7).is_valid());
        assert!(!RenderTargetId::default().is_valid());
    }

    #[test]
    fn test_rect_empty() {
        assert!(Rect::default().is_empty());
        assert!(!Rect::new(0.0, 0.0, 640.0, 480.0).is_empty());
    }
}
