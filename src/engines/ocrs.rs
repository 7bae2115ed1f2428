//! Pure Rust recognition with ocrs.
//!
//! Needs `text-detection.rten` and `text-recognition.rten` in the model
//! directory. ocrs reports no confidence, so one is estimated from the text.

use crate::buffer::PixelBuffer;
use crate::engine::{document_formats, ModelFile, OcrEngine, Recognition, Recognizer, SegmentationMode};
use crate::error::OcrError;
use image::DynamicImage;
use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsOcrEngine, OcrEngineParams};
use rten::Model;
use std::path::Path;

pub const DETECTION_MODEL: &str = "text-detection.rten";
pub const RECOGNITION_MODEL: &str = "text-recognition.rten";

/// Published by the ocrs project
const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

/// Factory for ocrs recognizers
#[derive(Debug, Default, Clone, Copy)]
pub struct OcrsEngine;

impl OcrsEngine {
    pub fn new() -> Self {
        Self
    }
}

impl OcrEngine for OcrsEngine {
    fn name(&self) -> &'static str {
        "ocrs"
    }

    fn description(&self) -> &'static str {
        "ocrs neural OCR, pure Rust, Latin script"
    }

    fn required_models(&self, _language: &str) -> Vec<ModelFile> {
        vec![
            ModelFile {
                file_name: DETECTION_MODEL.to_string(),
                url: DETECTION_MODEL_URL.to_string(),
            },
            ModelFile {
                file_name: RECOGNITION_MODEL.to_string(),
                url: RECOGNITION_MODEL_URL.to_string(),
            },
        ]
    }

    fn create(&self, model_dir: &Path, language: &str) -> Result<Box<dyn Recognizer>, OcrError> {
        if !self.supported_languages().iter().any(|l| l == language) {
            tracing::warn!(
                "ocrs only recognizes Latin script, language '{}' is approximated",
                language
            );
        }

        let detection_model = Model::load_file(model_dir.join(DETECTION_MODEL)).map_err(|e| {
            OcrError::Configuration(format!("Failed to load detection model: {}", e))
        })?;
        let recognition_model =
            Model::load_file(model_dir.join(RECOGNITION_MODEL)).map_err(|e| {
                OcrError::Configuration(format!("Failed to load recognition model: {}", e))
            })?;

        let engine = OcrsOcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(|e| OcrError::Configuration(format!("Failed to create OCR engine: {}", e)))?;

        tracing::debug!("ocrs recognizer loaded from {:?}", model_dir);
        Ok(Box::new(OcrsRecognizer { engine }))
    }

    fn supported_formats(&self) -> Vec<String> {
        document_formats()
    }

    fn supported_languages(&self) -> Vec<String> {
        // ocrs recognizes the Latin alphabet, which covers these
        vec!["eng".to_string(), "spa".to_string()]
    }
}

fn backend(stage: &str, err: impl std::fmt::Display) -> OcrError {
    OcrError::Backend(format!("ocrs {} failed: {}", stage, err))
}

/// One loaded ocrs model pair
struct OcrsRecognizer {
    engine: OcrsOcrEngine,
}

impl Recognizer for OcrsRecognizer {
    fn recognize(
        &mut self,
        page: &PixelBuffer,
        mode: SegmentationMode,
    ) -> Result<Recognition, OcrError> {
        // ocrs runs its own layout analysis
        tracing::trace!("ocrs ignores segmentation hint {:?}", mode);

        // ImageSource wants packed RGB, HWC
        let rgb = DynamicImage::ImageRgba8(page.as_image().clone()).into_rgb8();
        let source = ImageSource::from_bytes(rgb.as_raw(), rgb.dimensions())
            .map_err(|e| backend("image source", e))?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|e| backend("input preparation", e))?;
        let words = self
            .engine
            .detect_words(&input)
            .map_err(|e| backend("word detection", e))?;
        let lines = self.engine.find_text_lines(&input, &words);
        let recognized = self
            .engine
            .recognize_text(&input, &lines)
            .map_err(|e| backend("line recognition", e))?;

        let text = recognized
            .iter()
            .flatten()
            .map(|line| line.words().map(|w| w.to_string()).collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n");

        let confidence = estimate_confidence(&text);
        Ok(Recognition { text, confidence })
    }
}

/// Counts gathered in one pass over recognized text, used to estimate
/// confidence since ocrs reports none.
#[derive(Debug, Default)]
struct TextProfile {
    chars: usize,
    letters: usize,
    whitespace: usize,
    stray_symbols: usize,
    words: usize,
    word_chars: usize,
    single_char_words: usize,
    longest_run: usize,
}

impl TextProfile {
    fn of(text: &str) -> Self {
        let mut profile = TextProfile::default();
        let mut run = 0;
        let mut prev = None;

        for c in text.chars() {
            profile.chars += 1;
            if c.is_alphabetic() {
                profile.letters += 1;
            }
            if c.is_whitespace() {
                profile.whitespace += 1;
                run = 0;
            } else {
                if !c.is_alphanumeric() && !is_punctuation(c) {
                    profile.stray_symbols += 1;
                }
                run = if prev == Some(c) { run + 1 } else { 1 };
                profile.longest_run = profile.longest_run.max(run);
            }
            prev = Some(c);
        }

        for word in text.split_whitespace() {
            let len = word.chars().count();
            profile.words += 1;
            profile.word_chars += len;
            if len == 1 {
                profile.single_char_words += 1;
            }
        }
        profile
    }

    fn ratio(&self, count: usize) -> f32 {
        count as f32 / self.chars as f32
    }

    /// Stray symbols and missing letters both point at garbled output
    fn symbol_score(&self) -> f32 {
        let stray = 1.0 - (self.ratio(self.stray_symbols) * 10.0).min(1.0);
        let letters = (self.ratio(self.letters) * 1.5).min(1.0);
        stray * 0.6 + letters * 0.4
    }

    fn word_score(&self) -> f32 {
        if self.words == 0 {
            return 0.5;
        }
        let mean = self.word_chars / self.words;
        let shape = match mean {
            0..=1 => 0.3,
            2..=3 => 0.7,
            4..=8 => 1.0,
            9..=12 => 0.8,
            _ => 0.4,
        };
        let singles = self.single_char_words as f32 / self.words as f32;
        shape * (1.0 - (singles * 1.5).min(0.5))
    }

    fn spacing_score(&self) -> f32 {
        match (self.ratio(self.whitespace) * 100.0) as usize {
            0..=5 => 0.5,
            6..=10 => 0.8,
            11..=25 => 1.0,
            26..=40 => 0.7,
            _ => 0.3,
        }
    }

    fn run_score(&self) -> f32 {
        match self.longest_run {
            0..=3 => 1.0,
            4..=5 => 0.8,
            6..=10 => 0.5,
            _ => 0.2,
        }
    }
}

/// Estimate a 0..1 confidence from how much the text looks like prose.
fn estimate_confidence(text: &str) -> f32 {
    let profile = TextProfile::of(text);
    match profile.chars {
        0 => 0.0,
        // Too short to judge
        1..=4 => 0.5,
        _ => (0.40 * profile.symbol_score()
            + 0.30 * profile.word_score()
            + 0.15 * profile.spacing_score()
            + 0.15 * profile.run_score())
        .clamp(0.0, 1.0),
    }
}

/// ASCII punctuation plus the Spanish inverted marks and guillemets
fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '¡' | '¿' | '«' | '»')
}
