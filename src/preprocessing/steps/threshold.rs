use super::{ensure_non_empty, StepResult};
use crate::buffer::{PixelBuffer, CHANNELS};
use crate::config::EnhancementConfig;
use std::borrow::Cow;

/// Global fixed-threshold binarization.
///
/// Luminance is `Y = 0.30 R + 0.59 G + 0.11 B` (truncated). Pixels with
/// `Y > threshold` become white, everything else black; alpha is forced
/// opaque. One linear pass over the samples, dimensions unchanged.
pub fn apply<'a>(buffer: &'a PixelBuffer, config: &EnhancementConfig) -> StepResult<'a> {
    ensure_non_empty(buffer)?;

    let threshold = config.threshold as u32;
    let source = buffer.as_raw();
    let mut output = Vec::with_capacity(source.len());

    for pixel in source.chunks_exact(CHANNELS) {
        let value = if luminance(pixel[0], pixel[1], pixel[2]) > threshold {
            255u8
        } else {
            0u8
        };
        output.extend_from_slice(&[value, value, value, 255]);
    }

    let binarized = PixelBuffer::from_raw(buffer.width(), buffer.height(), output)?;
    Ok(Cow::Owned(binarized))
}

/// Integer form of `0.30 R + 0.59 G + 0.11 B`, truncated.
pub fn luminance(r: u8, g: u8, b: u8) -> u32 {
    (30 * r as u32 + 59 * g as u32 + 11 * b as u32) / 100
}
