use crate::error::OcrError;
use crate::text::NormalizerConfig;
use std::path::{Path, PathBuf};

/// Resolution pages are rasterized at before enhancement.
pub const DEFAULT_DPI: u32 = 300;
/// Default recognition language (Tesseract language code).
pub const DEFAULT_LANGUAGE: &str = "spa";
/// Maximum accepted document size (50MB).
pub const DEFAULT_MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

/// Processor configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub language: String,
    /// Explicit language-model directory (tessdata or ocrs models)
    pub model_path: Option<PathBuf>,
    /// Fetch missing model files instead of failing
    pub download_models: bool,
    /// Engine name; `None` selects the registry default
    pub engine: Option<String>,
    pub dpi: u32,
    pub max_file_size: usize,
    pub enhancement: EnhancementConfig,
    pub normalizer: NormalizerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            model_path: None,
            download_models: false,
            engine: None,
            dpi: DEFAULT_DPI,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            enhancement: EnhancementConfig::default(),
            normalizer: NormalizerConfig::default(),
        }
    }
}

impl Config {
    /// Replace the correction tables with the ones stored in a JSON file.
    pub fn load_corrections(&mut self, path: &Path) -> Result<(), OcrError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            OcrError::Configuration(format!(
                "Failed to read corrections file {}: {}",
                path.display(),
                e
            ))
        })?;
        self.normalizer = serde_json::from_str(&raw).map_err(|e| {
            OcrError::Configuration(format!(
                "Invalid corrections file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(())
    }
}

/// Parameters of the image enhancement chain
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancementConfig {
    /// Upscale factor applied before filtering
    pub scale_factor: f32,
    /// Upscaled pages are clamped so neither side exceeds this
    pub max_dimension: u32,
    /// Linear contrast multiplier
    pub contrast_factor: f32,
    /// Subtracted after the multiplier, in 0-255 units
    pub contrast_bias: f32,
    /// Median filter radius for speckle removal
    pub denoise_radius: u32,
    /// Luminance above this becomes white
    pub threshold: u8,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            scale_factor: 2.0,
            max_dimension: 10_000,
            contrast_factor: 1.8,
            contrast_bias: 0.1 * 255.0,
            denoise_radius: 1,
            threshold: 180,
        }
    }
}
