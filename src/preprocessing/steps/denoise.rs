use super::{ensure_non_empty, StepResult};
use crate::buffer::PixelBuffer;
use crate::config::EnhancementConfig;
use imageproc::filter::median_filter;
use std::borrow::Cow;

/// Median filter over `denoise_radius`; a radius of 0 skips the step.
pub fn apply<'a>(buffer: &'a PixelBuffer, config: &EnhancementConfig) -> StepResult<'a> {
    ensure_non_empty(buffer)?;

    let radius = config.denoise_radius;
    if radius == 0 {
        return Ok(Cow::Borrowed(buffer));
    }

    let denoised = median_filter(buffer.as_image(), radius, radius);
    Ok(Cow::Owned(PixelBuffer::from(denoised)))
}
