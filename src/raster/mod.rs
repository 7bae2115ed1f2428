//! Page rasterization
//!
//! Turns one page of a source document into a [`PixelBuffer`]. PDFs are
//! handled by [`pdf::PdfRasterizer`], single images by
//! [`image_file::ImageRasterizer`].

pub mod image_file;
pub mod pdf;

use crate::buffer::PixelBuffer;
use crate::document::MediaType;
use crate::error::OcrError;
use std::path::Path;

/// An opened document that can render its pages.
pub trait Rasterizer {
    /// Number of pages in the document
    fn page_count(&self) -> usize;

    /// Render the page at zero-based `index` at `dpi` dots per inch
    fn render_page(&self, index: usize, dpi: u32) -> Result<PixelBuffer, OcrError>;
}

/// Opens documents of a given media type for rasterization.
pub trait RasterizerFactory: Send + Sync {
    fn open(&self, path: &Path, media_type: MediaType) -> Result<Box<dyn Rasterizer>, OcrError>;
}

/// Default factory: lopdf for PDFs, the `image` crate for everything else.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRasterizers;

impl RasterizerFactory for DefaultRasterizers {
    fn open(&self, path: &Path, media_type: MediaType) -> Result<Box<dyn Rasterizer>, OcrError> {
        match media_type {
            MediaType::Pdf => Ok(Box::new(pdf::PdfRasterizer::open(path)?)),
            MediaType::Image => Ok(Box::new(image_file::ImageRasterizer::open(path)?)),
        }
    }
}
