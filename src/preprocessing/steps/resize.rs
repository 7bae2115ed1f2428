use super::{ensure_non_empty, StepResult};
use crate::buffer::PixelBuffer;
use crate::config::EnhancementConfig;
use crate::error::OcrError;
use image::imageops::{self, FilterType};
use std::borrow::Cow;

/// Resampling filter for the upscale
pub const UPSCALE_FILTER: FilterType = FilterType::Lanczos3;

/// Upscale the page so glyphs are tall enough for recognition, clamped to
/// `max_dimension`.
pub fn apply<'a>(buffer: &'a PixelBuffer, config: &EnhancementConfig) -> StepResult<'a> {
    ensure_non_empty(buffer)?;

    let scale = config.scale_factor;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(OcrError::Enhancement(format!(
            "invalid scale factor {}",
            scale
        )));
    }

    let (width, height) = buffer.dimensions();
    let (new_width, new_height) = target_dimensions(width, height, scale, config.max_dimension);

    if (new_width, new_height) == (width, height) {
        return Ok(Cow::Borrowed(buffer));
    }

    let resized = imageops::resize(buffer.as_image(), new_width, new_height, UPSCALE_FILTER);
    Ok(Cow::Owned(PixelBuffer::from(resized)))
}

fn target_dimensions(width: u32, height: u32, scale: f32, max_dimension: u32) -> (u32, u32) {
    let mut new_width = (width as f32 * scale) as u32;
    let mut new_height = (height as f32 * scale) as u32;

    // Clamp to max dimension
    if new_width > max_dimension || new_height > max_dimension {
        let max_dim = new_width.max(new_height);
        let scale_down = max_dimension as f32 / max_dim as f32;
        new_width = (new_width as f32 * scale_down) as u32;
        new_height = (new_height as f32 * scale_down) as u32;
    }

    (new_width.max(1), new_height.max(1))
}
