//! Enhanced pages, as handed to recognition

use crate::buffer::PixelBuffer;
use crate::error::OcrError;
use image::ImageFormat;
use std::io::Cursor;

/// One enhanced page with its 1-based number and final size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub buffer: PixelBuffer,
    pub width: u32,
    pub height: u32,
}

impl Page {
    pub fn new(number: usize, buffer: PixelBuffer) -> Self {
        let (width, height) = buffer.dimensions();
        Self {
            number,
            buffer,
            width,
            height,
        }
    }

    pub fn to_png(&self) -> Result<Vec<u8>, OcrError> {
        let mut png = Vec::new();
        self.buffer
            .as_image()
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| {
                OcrError::Backend(format!("PNG encoding of page {} failed: {}", self.number, e))
            })?;
        Ok(png)
    }
}
