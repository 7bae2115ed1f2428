//! Scanned document OCR: page rasterization, image enhancement, recognition
//! and text normalization, assembled into a per-document report.

pub mod batch;
pub mod buffer;
pub mod config;
pub mod document;
pub mod engine;
pub mod engines;
pub mod error;
pub mod models;
pub mod ocr;
pub mod page;
pub mod preprocessing;
pub mod raster;
pub mod report;
pub mod text;

pub use batch::{enhance_batch, process_batch};
pub use buffer::PixelBuffer;
pub use config::{Config, EnhancementConfig};
pub use document::{MediaType, SourceDocument};
pub use engine::{OcrEngine, Recognition, Recognizer, SegmentationMode};
pub use error::OcrError;
pub use ocr::OcrProcessor;
pub use page::Page;
pub use report::{DocumentResult, DocumentStatistics, PageResult};
pub use text::{CleanupStep, NormalizerConfig, TextNormalizer};
