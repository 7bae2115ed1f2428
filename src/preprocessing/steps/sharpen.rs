use super::{ensure_non_empty, StepResult};
use crate::buffer::{PixelBuffer, CHANNELS};
use crate::config::EnhancementConfig;
use image::RgbaImage;
use imageproc::filter::filter3x3;
use std::borrow::Cow;

/// 3x3 sharpening kernel: centre weight 9, all eight neighbours -1.
pub const KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 9.0, -1.0, -1.0, -1.0, -1.0];

/// Restore edge definition lost to smoothing.
pub fn apply<'a>(buffer: &'a PixelBuffer, _config: &EnhancementConfig) -> StepResult<'a> {
    ensure_non_empty(buffer)?;

    let sharpened: RgbaImage = filter3x3(buffer.as_image(), &KERNEL);
    let mut sharpened = PixelBuffer::from(sharpened);

    // The kernel sums to 1, but keep alpha exactly as it came in
    for (out, src) in sharpened
        .as_raw_mut()
        .chunks_exact_mut(CHANNELS)
        .zip(buffer.as_raw().chunks_exact(CHANNELS))
    {
        out[3] = src[3];
    }

    Ok(Cow::Owned(sharpened))
}
