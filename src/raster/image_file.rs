use super::Rasterizer;
use crate::buffer::PixelBuffer;
use crate::error::OcrError;
use image::DynamicImage;
use std::path::Path;

/// A single raster image treated as a one-page document.
pub struct ImageRasterizer {
    image: DynamicImage,
}

impl ImageRasterizer {
    pub fn open(path: &Path) -> Result<Self, OcrError> {
        let data = std::fs::read(path)?;
        let image = image::load_from_memory(&data)
            .map_err(|e| OcrError::Backend(format!("Failed to load image: {}", e)))?;

        tracing::debug!(
            "Loaded image {}x{} from {:?}",
            image.width(),
            image.height(),
            path
        );
        Ok(Self { image })
    }
}

impl Rasterizer for ImageRasterizer {
    fn page_count(&self) -> usize {
        1
    }

    /// Images carry no page geometry, so they are rendered at native resolution.
    fn render_page(&self, index: usize, _dpi: u32) -> Result<PixelBuffer, OcrError> {
        if index != 0 {
            return Err(OcrError::Backend(format!(
                "page index {} out of range for a single image",
                index
            )));
        }
        Ok(PixelBuffer::from(self.image.to_rgba8()))
    }
}
