//! Statically linked Tesseract, tuned for Spanish scans.
//!
//! Expects `<language>.traineddata` in the model directory. The handle is
//! created once per document and reused for every page.

use crate::buffer::PixelBuffer;
use crate::engine::{
    document_formats, ModelFile, OcrEngine, Recognition, Recognizer, SegmentationMode,
};
use crate::error::OcrError;
use std::path::Path;
use tesseract_static::tesseract::{PageSegMode, Tesseract};

/// Characters Tesseract may emit; matches what the normalizer keeps
const CHAR_WHITELIST: &str = "abcdefghijklmnñopqrstuvwxyzABCDEFGHIJKLMNÑOPQRSTUVWXYZ0123456789.,;:()[]{}¡!¿?@#$%&*+-/\\\"'<>=_áéíóúÁÉÍÓÚüÜ ";

/// Accept words missing from the language dictionary more readily
const DICTIONARY_PENALTIES: [(&str, &str); 2] = [
    ("language_model_penalty_non_dict_word", "0.5"),
    ("language_model_penalty_non_freq_dict_word", "0.5"),
];

/// Tesseract OCR Engine
#[derive(Debug, Default, Clone, Copy)]
pub struct LeptessEngine;

impl LeptessEngine {
    pub fn new() -> Self {
        Self
    }
}

impl OcrEngine for LeptessEngine {
    fn name(&self) -> &'static str {
        "leptess"
    }

    fn description(&self) -> &'static str {
        "Tesseract LSTM engine with a Spanish character whitelist"
    }

    fn required_models(&self, language: &str) -> Vec<ModelFile> {
        // tessdata_fast for smaller, faster downloads
        vec![ModelFile {
            file_name: format!("{}.traineddata", language),
            url: format!(
                "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
                language
            ),
        }]
    }

    fn create(&self, model_dir: &Path, language: &str) -> Result<Box<dyn Recognizer>, OcrError> {
        let tessdata = model_dir
            .to_str()
            .ok_or_else(|| OcrError::Configuration("Invalid tessdata path".to_string()))?;

        let mut tess = Tesseract::new(Some(tessdata), Some(language)).map_err(|e| {
            OcrError::Configuration(format!("Failed to initialize Tesseract: {}", e))
        })?;

        tess = tess
            .set_variable("tessedit_char_whitelist", CHAR_WHITELIST)
            .map_err(|e| OcrError::Configuration(format!("Failed to set whitelist: {}", e)))?;
        for (name, value) in DICTIONARY_PENALTIES {
            tess = tess.set_variable(name, value).map_err(|e| {
                OcrError::Configuration(format!("Failed to set {}: {}", name, e))
            })?;
        }

        tracing::debug!(
            "Tesseract initialized (tessdata: {}, language: {})",
            tessdata,
            language
        );
        Ok(Box::new(LeptessRecognizer { tess: Some(tess) }))
    }

    fn supported_formats(&self) -> Vec<String> {
        document_formats()
    }

    fn supported_languages(&self) -> Vec<String> {
        // Any installed traineddata works, but the whitelist is Latin-only
        ["spa", "eng", "por", "fra", "ita", "cat", "glg"]
            .iter()
            .map(|l| l.to_string())
            .collect()
    }
}

/// One Tesseract handle, reused for every page of a document.
struct LeptessRecognizer {
    // The tesseract API consumes the handle on each call; None after a failure
    tess: Option<Tesseract>,
}

fn page_seg_mode(mode: SegmentationMode) -> PageSegMode {
    match mode {
        SegmentationMode::Auto => PageSegMode::PsmAuto,
        SegmentationMode::SingleColumn => PageSegMode::PsmSingleColumn,
        SegmentationMode::SingleBlock => PageSegMode::PsmSingleBlock,
        SegmentationMode::SparseText => PageSegMode::PsmSparseText,
    }
}

impl Recognizer for LeptessRecognizer {
    fn recognize(
        &mut self,
        page: &PixelBuffer,
        mode: SegmentationMode,
    ) -> Result<Recognition, OcrError> {
        let mut tess = self
            .tess
            .take()
            .ok_or_else(|| OcrError::Backend("Tesseract handle lost after a failure".to_string()))?;

        // Leptonica always reads BMP
        let (width, height) = page.dimensions();
        let mut bmp = Vec::new();
        image::DynamicImage::ImageRgba8(page.as_image().clone())
            .into_rgb8()
            .write_to(&mut std::io::Cursor::new(&mut bmp), image::ImageFormat::Bmp)
            .map_err(|e| OcrError::Backend(format!("BMP encoding failed: {}", e)))?;
        tracing::debug!("tesseract page {}x{} ({} bytes)", width, height, bmp.len());

        tess.set_page_seg_mode(page_seg_mode(mode));
        tess = tess.set_image_from_mem(&bmp).map_err(|e| {
            OcrError::Backend(format!("Tesseract rejected {}x{} page: {}", width, height, e))
        })?;

        tess = tess
            .recognize()
            .map_err(|e| OcrError::Backend(format!("Failed to recognize text: {}", e)))?;

        let text = tess
            .get_text()
            .map_err(|e| OcrError::Backend(format!("Failed to get text: {}", e)))?;

        // mean_text_conf is 0-100
        let confidence = (tess.mean_text_conf() as f32 / 100.0).clamp(0.0, 1.0);

        self.tess = Some(tess);
        Ok(Recognition { text, confidence })
    }
}
