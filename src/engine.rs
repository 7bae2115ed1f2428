use crate::buffer::PixelBuffer;
use crate::error::OcrError;
use std::path::Path;

/// Text recognized on one page
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub text: String,
    /// Mean confidence in 0.0-1.0
    pub confidence: f32,
}

/// Page layout hint passed to the recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentationMode {
    /// Fully automatic layout analysis, suited to general documents
    #[default]
    Auto,
    SingleColumn,
    SingleBlock,
    SparseText,
}

/// A loaded recognition engine, owned by a single document call.
pub trait Recognizer {
    fn recognize(
        &mut self,
        page: &PixelBuffer,
        mode: SegmentationMode,
    ) -> Result<Recognition, OcrError>;
}

/// A model file an engine needs in its model directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFile {
    pub file_name: String,
    /// Where the file can be fetched from when downloads are enabled
    pub url: String,
}

/// A recognition backend. Cheap to hold; the heavy state lives in the
/// [`Recognizer`] it creates for each document.
pub trait OcrEngine: Send + Sync {
    /// Name used with `--engine`
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Files that must exist in the model directory for `language`
    fn required_models(&self, language: &str) -> Vec<ModelFile>;

    /// Load a fresh recognizer from `model_dir`
    fn create(&self, model_dir: &Path, language: &str) -> Result<Box<dyn Recognizer>, OcrError>;

    /// MIME types this engine's documents may have
    fn supported_formats(&self) -> Vec<String>;

    /// Language codes accepted by `create`
    fn supported_languages(&self) -> Vec<String>;
}

/// MIME types every engine accepts through the rasterizers
pub fn document_formats() -> Vec<String> {
    [
        "application/pdf",
        "image/png",
        "image/jpeg",
        "image/gif",
        "image/bmp",
        "image/webp",
        "image/tiff",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
