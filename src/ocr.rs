//! Per-document orchestration: rasterize, enhance, recognize, normalize, aggregate.

use crate::config::Config;
use crate::document::{MediaType, SourceDocument, TempDocument};
use crate::engine::{OcrEngine, SegmentationMode};
use crate::engines::EngineRegistry;
use crate::error::OcrError;
use crate::models::ModelLocator;
use crate::page::Page;
use crate::preprocessing::Pipeline;
use crate::raster::{DefaultRasterizers, Rasterizer, RasterizerFactory};
use crate::report::{self, DocumentFacts, DocumentResult, PageResult};
use crate::text::TextNormalizer;
use std::sync::Arc;
use std::time::Instant;

/// Turns source documents into [`DocumentResult`]s.
///
/// Holds only read-only state, so one processor can serve many documents at
/// once; every call opens its own temp file, rasterizer and recognizer.
pub struct OcrProcessor {
    engine: Arc<dyn OcrEngine>,
    rasterizers: Arc<dyn RasterizerFactory>,
    pipeline: Pipeline,
    normalizer: TextNormalizer,
    models: ModelLocator,
    language: String,
    dpi: u32,
    max_file_size: usize,
}

impl OcrProcessor {
    /// Build a processor around the engine named in `config`.
    pub fn new(config: &Config) -> Result<Self, OcrError> {
        let engine = EngineRegistry::new().select(config.engine.as_deref())?;
        Self::with_config(engine, config)
    }

    /// Build a processor around an explicit engine.
    pub fn with_config(engine: Arc<dyn OcrEngine>, config: &Config) -> Result<Self, OcrError> {
        tracing::info!(
            "OCR processor ready (engine: {}, language: {}, dpi: {})",
            engine.name(),
            config.language,
            config.dpi
        );

        Ok(Self {
            engine,
            rasterizers: Arc::new(DefaultRasterizers),
            pipeline: Pipeline::new(config.enhancement.clone()),
            normalizer: TextNormalizer::new(&config.normalizer)?,
            models: ModelLocator::new(config.model_path.clone(), config.download_models),
            language: config.language.clone(),
            dpi: config.dpi,
            max_file_size: config.max_file_size,
        })
    }

    pub fn with_rasterizers(mut self, rasterizers: Arc<dyn RasterizerFactory>) -> Self {
        self.rasterizers = rasterizers;
        self
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_models(mut self, models: ModelLocator) -> Self {
        self.models = models;
        self
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Process one document end to end.
    ///
    /// Validation errors are returned as is. Any other failure aborts the
    /// whole document and comes back wrapped in [`OcrError::Document`].
    pub fn process(&self, document: &SourceDocument) -> Result<DocumentResult, OcrError> {
        let media_type = self.validate(document)?;

        tracing::info!(
            "Processing {} ({} bytes, {:?})",
            document.file_name(),
            document.len(),
            media_type
        );

        self.run(document, media_type)
            .map_err(|e| wrap_document_error(document, e))
    }

    /// Rasterize and enhance every page without recognizing text.
    ///
    /// Needs no language models. Errors follow the same rules as [`process`].
    ///
    /// [`process`]: OcrProcessor::process
    pub fn enhance(&self, document: &SourceDocument) -> Result<Vec<Page>, OcrError> {
        let media_type = self.validate(document)?;

        tracing::info!(
            "Enhancing {} ({} bytes, {:?})",
            document.file_name(),
            document.len(),
            media_type
        );

        self.open(document, media_type)
            .and_then(|opened| {
                (0..opened.page_count)
                    .map(|index| self.enhance_page(opened.rasterizer.as_ref(), index))
                    .map(|page| page.map(|(page, _)| page))
                    .collect()
            })
            .map_err(|e| wrap_document_error(document, e))
    }

    fn validate(&self, document: &SourceDocument) -> Result<MediaType, OcrError> {
        if document.is_empty() {
            return Err(OcrError::Validation(format!(
                "'{}' is empty",
                document.file_name()
            )));
        }
        if document.len() > self.max_file_size {
            return Err(OcrError::DocumentTooLarge {
                size: document.len(),
                max: self.max_file_size,
            });
        }
        document.media_type().ok_or_else(|| {
            OcrError::Validation(format!(
                "'{}' is neither a PDF nor a supported image",
                document.file_name()
            ))
        })
    }

    /// Copy the document to temp storage and open it for rasterization.
    fn open(
        &self,
        document: &SourceDocument,
        media_type: MediaType,
    ) -> Result<OpenedDocument, OcrError> {
        let temp = TempDocument::write(document, media_type)?;

        let rasterizer = self
            .rasterizers
            .open(temp.path(), media_type)
            .map_err(|e| OcrError::rasterization(None, e))?;

        let page_count = rasterizer.page_count();
        if page_count == 0 {
            return Err(OcrError::Validation(format!(
                "'{}' has no pages",
                document.file_name()
            )));
        }

        Ok(OpenedDocument {
            rasterizer,
            page_count,
            _temp: temp,
        })
    }

    /// Render and enhance the page at `index`, returning it with the
    /// enhancement time in milliseconds.
    fn enhance_page(
        &self,
        rasterizer: &dyn Rasterizer,
        index: usize,
    ) -> Result<(Page, u64), OcrError> {
        let number = index + 1;

        let raw = rasterizer
            .render_page(index, self.dpi)
            .map_err(|e| OcrError::rasterization(Some(number), e))?;

        let enhanced = self.pipeline.process(raw);
        let degraded = enhanced.degraded_steps();
        if !degraded.is_empty() {
            tracing::warn!(
                "Page {}: enhancement degraded at {}",
                number,
                degraded.join(", ")
            );
        }

        let elapsed_ms = enhanced.total_time_ms;
        Ok((Page::new(number, enhanced.buffer), elapsed_ms))
    }

    fn run(
        &self,
        document: &SourceDocument,
        media_type: MediaType,
    ) -> Result<DocumentResult, OcrError> {
        // Model data must be in place before any page work
        let model_dir = self
            .models
            .resolve(&self.engine.required_models(&self.language))?;

        let opened = self.open(document, media_type)?;
        let mut recognizer = self.engine.create(&model_dir, &self.language)?;

        let start = Instant::now();
        let mut pages = Vec::with_capacity(opened.page_count);

        for index in 0..opened.page_count {
            let (page, enhance_ms) = self.enhance_page(opened.rasterizer.as_ref(), index)?;

            let recognition = recognizer
                .recognize(&page.buffer, SegmentationMode::Auto)
                .map_err(|e| OcrError::recognition(page.number, e))?;

            let text = self.normalizer.normalize(&recognition.text);
            let result = PageResult::new(page.number, text, recognition.confidence)
                .with_dimensions(page.width, page.height);

            tracing::info!(
                "Page {}/{}: {} chars, {} words, {:.2}% confidence ({}ms enhancement)",
                page.number,
                opened.page_count,
                result.characters,
                result.words,
                result.confidence,
                enhance_ms
            );
            pages.push(result);
        }

        let facts = DocumentFacts {
            file_name: document.file_name(),
            file_size: document.len(),
            engine: self.engine.name(),
            elapsed: start.elapsed(),
        };
        report::aggregate(facts, pages)
    }
}

/// A rasterizer over a temp copy; the copy is removed when this is dropped.
struct OpenedDocument {
    rasterizer: Box<dyn Rasterizer>,
    page_count: usize,
    // Dropped after the rasterizer
    _temp: TempDocument,
}

/// Client errors pass through; everything else is tagged with the file name.
fn wrap_document_error(document: &SourceDocument, error: OcrError) -> OcrError {
    if error.is_client_error() {
        return error;
    }
    tracing::error!("Processing {} failed: {}", document.file_name(), error);
    OcrError::Document {
        file_name: document.file_name().to_string(),
        source: Box::new(error),
    }
}
