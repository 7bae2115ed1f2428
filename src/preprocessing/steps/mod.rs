//! Individual enhancement steps
//!
//! Every step borrows the current page and either returns a freshly built
//! buffer (`Cow::Owned`) or hands the input back untouched (`Cow::Borrowed`).
//! The pipeline owns the page between steps and drops the previous buffer
//! once a step has produced its replacement.

use crate::buffer::PixelBuffer;
use crate::config::EnhancementConfig;
use crate::error::OcrError;
use std::borrow::Cow;

pub mod contrast;
pub mod denoise;
pub mod deskew;
pub mod resize;
pub mod sharpen;
pub mod threshold;

pub type StepResult<'a> = Result<Cow<'a, PixelBuffer>, OcrError>;

/// Signature shared by all steps, including test doubles swapped into a pipeline.
pub type StepFn =
    dyn for<'a> Fn(&'a PixelBuffer, &EnhancementConfig) -> StepResult<'a> + Send + Sync;

fn ensure_non_empty(buffer: &PixelBuffer) -> Result<(), OcrError> {
    if buffer.is_empty() {
        return Err(OcrError::Enhancement(format!(
            "cannot process an empty {}x{} page",
            buffer.width(),
            buffer.height()
        )));
    }
    buffer.check_layout()
}
