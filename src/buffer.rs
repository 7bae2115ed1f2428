//! In-memory raster passed between rasterization, enhancement and recognition.
//!
//! A [`PixelBuffer`] is always 4-channel RGBA, 8 bits per sample, row-major,
//! with a stride of `width * 4` bytes.

use crate::error::OcrError;
use image::{DynamicImage, RgbaImage};

/// Bytes per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// Row-major RGBA raster owned by exactly one pipeline stage at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Build a buffer from raw RGBA samples, checking `stride * height == len`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, OcrError> {
        let expected = width as usize * CHANNELS * height as usize;
        if data.len() != expected {
            return Err(OcrError::Enhancement(format!(
                "buffer length {} does not match {}x{} RGBA ({} bytes)",
                data.len(),
                width,
                height,
                expected
            )));
        }

        RgbaImage::from_raw(width, height, data)
            .map(|image| Self { image })
            .ok_or_else(|| OcrError::Enhancement("invalid RGBA buffer".to_string()))
    }

    /// A buffer filled with a single colour.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, image::Rgba(rgba)),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width() as usize * CHANNELS
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Verify the length invariant; used by stages before touching raw samples.
    pub fn check_layout(&self) -> Result<(), OcrError> {
        let expected = self.stride() * self.height() as usize;
        if self.as_raw().len() != expected {
            return Err(OcrError::Enhancement(format!(
                "buffer length {} does not match stride {} x height {}",
                self.as_raw().len(),
                self.stride(),
                self.height()
            )));
        }
        Ok(())
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        Self { image }
    }
}

impl From<DynamicImage> for PixelBuffer {
    fn from(image: DynamicImage) -> Self {
        Self {
            image: image.into_rgba8(),
        }
    }
}
