use super::StepResult;
use crate::buffer::PixelBuffer;
use crate::config::EnhancementConfig;
use std::borrow::Cow;

/// Rotation correction slot at the end of the chain.
///
/// No skew angle is detected yet; the page passes through unchanged. The
/// step stays in the chain so timings and the chain's shape reflect it.
pub fn apply<'a>(buffer: &'a PixelBuffer, _config: &EnhancementConfig) -> StepResult<'a> {
    tracing::trace!("deskew passthrough ({}x{})", buffer.width(), buffer.height());
    Ok(Cow::Borrowed(buffer))
}
