use bytes::Bytes;

use crate::{RenderError, RenderResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Single 8-bit channel, used for luma planes.
    L8,
    /// Two 8-bit channels, used for interleaved chroma planes.
    Rg8,
    Rgb8,
    Rgba8,
}

impl ImageFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            ImageFormat::L8 => 1,
            ImageFormat::Rg8 => 2,
            ImageFormat::Rgb8 => 3,
            ImageFormat::Rgba8 => 4,
        }
    }
}

/// Tightly packed CPU-side pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    format: ImageFormat,
    data: Bytes,
}

impl Image {
    pub fn new(
        width: u32,
        height: u32,
        format: ImageFormat,
        data: impl Into<Bytes>,
    ) -> RenderResult<Self> {
        let data = data.into();
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSize(width, height));
        }
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if data.len() != expected {
            return Err(RenderError::DataLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// An image with every byte set to `value`.
    pub fn filled(width: u32, height: u32, format: ImageFormat, value: u8) -> RenderResult<Self> {
        let len = width as usize * height as usize * format.bytes_per_pixel();
        Self::new(width, height, format, vec![value; len])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_size_validation() {
        assert!(Image::new(2, 2, ImageFormat::Rgb8, vec![0u8; 12]).is_ok());
        assert_eq!(
            Image::new(2, 2, ImageFormat::Rgb8, vec![0u8; 11]),
            Err(RenderError::DataLength {
                expected: 12,
                got: 11
            })
        );
        assert_eq!(
            Image::new(0, 4, ImageFormat::L8, Vec::<u8>::new()),
            Err(RenderError::InvalidSize(0, 4))
        );
    }

    #[test]
    fn test_filled_image() {
        let img = Image::filled(4, 2, ImageFormat::Rg8, 0x80).unwrap();
        assert_eq!(img.data().len(), 16);
        assert!(img.data().iter().all(|&b| b == 0x80));
        assert_eq!(img.format(), ImageFormat::Rg8);
    }
}
