//! Image enhancement for OCR
//!
//! Runs the fixed upscale, contrast, denoise, sharpen, binarize, deskew chain
//! over every rasterized page.

pub mod pipeline;
pub mod steps;

pub use pipeline::{Pipeline, PreprocessingResult, StepTiming, STEP_NAMES};
