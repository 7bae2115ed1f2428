use super::{ensure_non_empty, StepResult};
use crate::buffer::{PixelBuffer, CHANNELS};
use crate::config::EnhancementConfig;
use crate::error::OcrError;
use std::borrow::Cow;

/// Linear contrast remap of the colour channels:
/// `out = clamp(in * factor - bias, 0, 255)`. Alpha is left as is.
pub fn apply<'a>(buffer: &'a PixelBuffer, config: &EnhancementConfig) -> StepResult<'a> {
    ensure_non_empty(buffer)?;

    let factor = config.contrast_factor;
    let bias = config.contrast_bias;
    if !factor.is_finite() || !bias.is_finite() {
        return Err(OcrError::Enhancement(format!(
            "invalid contrast parameters (factor {}, bias {})",
            factor, bias
        )));
    }

    let lut = build_lut(factor, bias);
    let mut adjusted = buffer.clone();
    for pixel in adjusted.as_raw_mut().chunks_exact_mut(CHANNELS) {
        pixel[0] = lut[pixel[0] as usize];
        pixel[1] = lut[pixel[1] as usize];
        pixel[2] = lut[pixel[2] as usize];
    }

    Ok(Cow::Owned(adjusted))
}

fn build_lut(factor: f32, bias: f32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (value, slot) in lut.iter_mut().enumerate() {
        *slot = (value as f32 * factor - bias).round().clamp(0.0, 255.0) as u8;
    }
    lut
}
