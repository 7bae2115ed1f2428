use docscan_ocr::buffer::PixelBuffer;
use docscan_ocr::config::Config;
use docscan_ocr::document::{MediaType, SourceDocument};
use docscan_ocr::engine::{ModelFile, OcrEngine, Recognition, Recognizer, SegmentationMode};
use docscan_ocr::error::OcrError;
use docscan_ocr::models::ModelLocator;
use docscan_ocr::preprocessing::Pipeline;
use docscan_ocr::raster::{Rasterizer, RasterizerFactory};
use docscan_ocr::text::{CleanupStep, NormalizerConfig, TextNormalizer};
use docscan_ocr::{enhance_batch, process_batch, OcrProcessor};
use lopdf::{dictionary, Document, Object, Stream};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Fakes
// ============================================================================

/// Renders `pages` light-gray pages with a dark bar, optionally failing one.
#[derive(Default)]
struct FakeRasterizers {
    pages: usize,
    fail_render_on: Option<usize>,
    opens: AtomicUsize,
    opened_paths: Mutex<Vec<PathBuf>>,
}

impl FakeRasterizers {
    fn with_pages(pages: usize) -> Arc<Self> {
        Arc::new(Self {
            pages,
            ..Default::default()
        })
    }

    fn opened_paths(&self) -> Vec<PathBuf> {
        self.opened_paths.lock().unwrap().clone()
    }
}

struct FakeRasterizer {
    pages: usize,
    fail_render_on: Option<usize>,
}

impl RasterizerFactory for FakeRasterizers {
    fn open(&self, path: &Path, _media_type: MediaType) -> Result<Box<dyn Rasterizer>, OcrError> {
        assert!(path.exists(), "temp copy should exist while rasterizing");
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.opened_paths.lock().unwrap().push(path.to_path_buf());
        Ok(Box::new(FakeRasterizer {
            pages: self.pages,
            fail_render_on: self.fail_render_on,
        }))
    }
}

impl Rasterizer for FakeRasterizer {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn render_page(&self, index: usize, _dpi: u32) -> Result<PixelBuffer, OcrError> {
        if self.fail_render_on == Some(index + 1) {
            return Err(OcrError::Backend("corrupt page stream".to_string()));
        }
        let mut page = PixelBuffer::filled(60, 30, [225, 225, 220, 255]);
        let width = page.width() as usize;
        for y in 12..18 {
            for x in 10..50 {
                let offset = (y * width + x) * 4;
                page.as_raw_mut()[offset..offset + 3].copy_from_slice(&[20, 20, 30]);
            }
        }
        Ok(page)
    }
}

/// Returns scripted text per page in call order.
#[derive(Clone, Default)]
struct FakeEngine {
    texts: Vec<String>,
    confidence: f32,
    fail_on: Option<usize>,
    seen: Arc<Mutex<Vec<(u32, u32, bool)>>>,
}

impl FakeEngine {
    fn scripted(texts: &[&str]) -> Self {
        Self {
            texts: texts.iter().map(|t| t.to_string()).collect(),
            confidence: 0.87654,
            ..Default::default()
        }
    }
}

struct FakeRecognizer {
    engine: FakeEngine,
    next: usize,
}

impl Recognizer for FakeRecognizer {
    fn recognize(
        &mut self,
        page: &PixelBuffer,
        mode: SegmentationMode,
    ) -> Result<Recognition, OcrError> {
        assert_eq!(mode, SegmentationMode::Auto);
        self.next += 1;

        let binary = page
            .as_raw()
            .chunks_exact(4)
            .all(|p| p[..3].iter().all(|&c| c == 0 || c == 255) && p[3] == 255);
        self.engine
            .seen
            .lock()
            .unwrap()
            .push((page.width(), page.height(), binary));

        if self.engine.fail_on == Some(self.next) {
            return Err(OcrError::Backend("engine crashed".to_string()));
        }
        let text = self.engine.texts[(self.next - 1) % self.engine.texts.len()].clone();
        Ok(Recognition {
            text,
            confidence: self.engine.confidence,
        })
    }
}

impl OcrEngine for FakeEngine {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn description(&self) -> &'static str {
        "scripted recognizer"
    }

    fn required_models(&self, language: &str) -> Vec<ModelFile> {
        vec![ModelFile {
            file_name: format!("{}.model", language),
            url: String::new(),
        }]
    }

    fn create(&self, model_dir: &Path, language: &str) -> Result<Box<dyn Recognizer>, OcrError> {
        assert!(model_dir.join(format!("{}.model", language)).is_file());
        Ok(Box::new(FakeRecognizer {
            engine: self.clone(),
            next: 0,
        }))
    }

    fn supported_formats(&self) -> Vec<String> {
        vec!["application/pdf".to_string()]
    }

    fn supported_languages(&self) -> Vec<String> {
        vec!["spa".to_string()]
    }
}

// ============================================================================
// Helpers
// ============================================================================

struct Harness {
    processor: OcrProcessor,
    rasterizers: Arc<FakeRasterizers>,
    _models: tempfile::TempDir,
}

fn model_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("spa.model"), b"weights").unwrap();
    dir
}

fn harness(engine: FakeEngine, rasterizers: Arc<FakeRasterizers>) -> Harness {
    let models = model_dir();
    let processor = OcrProcessor::with_config(Arc::new(engine), &Config::default())
        .unwrap()
        .with_rasterizers(rasterizers.clone())
        .with_models(ModelLocator::new(Some(models.path().to_path_buf()), false));
    Harness {
        processor,
        rasterizers,
        _models: models,
    }
}

fn pdf_document() -> SourceDocument {
    SourceDocument::new("scan.pdf", b"%PDF-1.4 scanned".to_vec())
}

/// A real PDF whose pages each hold one DeviceGray image
fn scanned_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();

    for _ in 0..pages {
        let mut pixels = vec![230u8; 40 * 20];
        for y in 8..12 {
            for x in 5..35 {
                pixels[y * 40 + x] = 25;
            }
        }
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 40i64,
                "Height" => 20i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8i64,
            },
            pixels,
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(144),
                Object::Integer(72),
            ],
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_single_page_document() {
    let h = harness(FakeEngine::scripted(&["Hola"]), FakeRasterizers::with_pages(1));

    let result = h.processor.process(&pdf_document()).unwrap();

    assert_eq!(result.pages.len(), 1);
    let page = &result.pages[0];
    assert_eq!(page.number, 1);
    assert_eq!(page.text, "Hola");
    assert!(
        (0.0..=100.0).contains(&page.confidence),
        "confidence out of range: {}",
        page.confidence
    );
    assert_eq!(page.confidence, 87.65);
    assert_eq!(result.metadata.total_pages, 1);
    assert_eq!(result.metadata.engine, "fake");
}

#[test]
fn test_empty_input_rejected_before_rasterizing() {
    let h = harness(FakeEngine::scripted(&["x"]), FakeRasterizers::with_pages(1));

    let err = h
        .processor
        .process(&SourceDocument::new("scan.pdf", Vec::new()))
        .unwrap_err();

    assert!(matches!(err, OcrError::Validation(_)), "got: {:?}", err);
    assert!(err.is_client_error());
    assert_eq!(h.rasterizers.opens.load(Ordering::SeqCst), 0);
}

#[test]
fn test_three_pages_have_ordered_headers() {
    let h = harness(
        FakeEngine::scripted(&["uno", "dos", "tres"]),
        FakeRasterizers::with_pages(3),
    );

    let result = h.processor.process(&pdf_document()).unwrap();

    assert_eq!(result.full_text.matches("--- Page ").count(), 3);
    let positions: Vec<usize> = (1..=3)
        .map(|n| {
            result
                .full_text
                .find(&format!("--- Page {} ---", n))
                .unwrap_or_else(|| panic!("missing header {}", n))
        })
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{:?}", positions);
    assert_eq!(
        result.full_text,
        "--- Page 1 ---\nuno\n\n--- Page 2 ---\ndos\n\n--- Page 3 ---\ntres"
    );
}

#[test]
fn test_enhancement_fault_on_page_two_degrades() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let pipeline = Pipeline::default()
        .replace_step("sharpen", move |buffer, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 1 {
                Err(OcrError::Enhancement("simulated fault".to_string()))
            } else {
                Ok(Cow::Borrowed(buffer))
            }
        })
        .unwrap();

    let engine = FakeEngine::scripted(&["uno", "dos", "tres"]);
    let seen = Arc::clone(&engine.seen);
    let h = harness(engine, FakeRasterizers::with_pages(3));
    let processor = h.processor.with_pipeline(pipeline);

    let result = processor.process(&pdf_document()).unwrap();

    assert_eq!(result.pages.len(), 3);
    assert_eq!(result.pages[1].text, "dos");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // Later steps still ran on the degraded page
    assert!(seen.lock().unwrap().iter().all(|(_, _, binary)| *binary));
}

#[test]
fn test_recognition_fault_on_page_two_is_fatal() {
    let mut engine = FakeEngine::scripted(&["uno", "dos", "tres"]);
    engine.fail_on = Some(2);
    let h = harness(engine, FakeRasterizers::with_pages(3));

    let err = h.processor.process(&pdf_document()).unwrap_err();

    assert_eq!(err.code(), "RECOGNITION_ERROR");
    assert!(!err.is_client_error());
    match &err {
        OcrError::Document { file_name, source } => {
            assert_eq!(file_name, "scan.pdf");
            assert!(
                matches!(**source, OcrError::Recognition { page: 2, .. }),
                "got: {:?}",
                source
            );
        }
        other => panic!("expected a wrapped document error, got {:?}", other),
    }
    assert!(err.to_string().contains("scan.pdf"));
}

#[test]
fn test_normalization_fault_keeps_raw_text() {
    let raw = "Texto  crudo ,  sin limpiar §";
    let normalizer = TextNormalizer::new(&NormalizerConfig::default())
        .unwrap()
        .replace_step(CleanupStep::Contextual, |text| {
            if text.contains("crudo") {
                panic!("pattern engine blew up");
            }
            text.to_string()
        });
    let h = harness(
        FakeEngine::scripted(&["Primera  página", raw]),
        FakeRasterizers::with_pages(2),
    );
    let processor = h.processor.with_normalizer(normalizer);

    let result = processor.process(&pdf_document()).unwrap();

    assert_eq!(result.pages.len(), 2);
    assert_eq!(result.pages[0].text, "Primera página");
    assert_eq!(result.pages[1].text, raw);
}

#[test]
fn test_rasterization_fault_is_fatal_and_names_page() {
    let rasterizers = Arc::new(FakeRasterizers {
        pages: 3,
        fail_render_on: Some(3),
        ..Default::default()
    });
    let h = harness(FakeEngine::scripted(&["x"]), rasterizers);

    let err = h.processor.process(&pdf_document()).unwrap_err();

    assert_eq!(err.code(), "RASTERIZATION_ERROR");
    let source = std::error::Error::source(&err).unwrap();
    assert!(source.to_string().contains("page 3"), "got: {}", source);
}

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn test_statistics_match_page_sums() {
    let h = harness(
        FakeEngine::scripted(&["una línea corta", "", "otra página con cinco palabras"]),
        FakeRasterizers::with_pages(3),
    );

    let result = h.processor.process(&pdf_document()).unwrap();
    let stats = &result.metadata.statistics;

    let chars: usize = result.pages.iter().map(|p| p.characters).sum();
    let words: usize = result.pages.iter().map(|p| p.words).sum();
    assert_eq!(stats.total_characters, chars);
    assert_eq!(stats.total_words, words);
    assert_eq!(stats.total_words, 3 + 0 + 5);
    assert_eq!(stats.average_characters_per_page, chars as f64 / 3.0);
    assert_eq!(stats.average_words_per_page, words as f64 / 3.0);
}

#[test]
fn test_page_numbers_are_contiguous() {
    let h = harness(FakeEngine::scripted(&["p"]), FakeRasterizers::with_pages(7));

    let result = h.processor.process(&pdf_document()).unwrap();

    let numbers: Vec<usize> = result.pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, (1..=7).collect::<Vec<_>>());
}

#[test]
fn test_zero_page_document_is_rejected() {
    let h = harness(FakeEngine::scripted(&["x"]), FakeRasterizers::with_pages(0));

    let err = h.processor.process(&pdf_document()).unwrap_err();

    assert!(matches!(err, OcrError::Validation(_)), "got: {:?}", err);
}

#[test]
fn test_repeated_runs_are_identical() {
    let h = harness(
        FakeEngine::scripted(&["Reporte  de l  mes ,  senor", "fin"]),
        FakeRasterizers::with_pages(2),
    );

    let first = h.processor.process(&pdf_document()).unwrap();
    let second = h.processor.process(&pdf_document()).unwrap();

    assert_eq!(first.pages, second.pages);
    assert_eq!(first.full_text, second.full_text);
}

#[test]
fn test_recognized_text_is_normalized() {
    let h = harness(
        FakeEngine::scripted(&["La infor-\nmacion  del  día ,  completa §"]),
        FakeRasterizers::with_pages(1),
    );

    let result = h.processor.process(&pdf_document()).unwrap();

    assert_eq!(result.pages[0].text, "La información del día, completa");
    assert_eq!(result.pages[0].words, 5);
}

#[test]
fn test_recognizer_receives_enhanced_pages() {
    let engine = FakeEngine::scripted(&["x"]);
    let seen = Arc::clone(&engine.seen);
    let h = harness(engine, FakeRasterizers::with_pages(2));

    h.processor.process(&pdf_document()).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(*seen, vec![(120, 60, true), (120, 60, true)]);
}

#[test]
fn test_page_results_record_enhanced_dimensions() {
    let h = harness(FakeEngine::scripted(&["x"]), FakeRasterizers::with_pages(2));

    let result = h.processor.process(&pdf_document()).unwrap();

    for page in &result.pages {
        assert_eq!((page.width, page.height), (120, 60), "page {}", page.number);
    }
}

// ============================================================================
// Enhancement only
// ============================================================================

#[test]
fn test_enhance_returns_numbered_binary_pages() {
    let h = harness(FakeEngine::scripted(&["x"]), FakeRasterizers::with_pages(3));

    let pages = h.processor.enhance(&pdf_document()).unwrap();

    let numbers: Vec<usize> = pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    for page in &pages {
        assert_eq!((page.width, page.height), page.buffer.dimensions());
        assert_eq!((page.width, page.height), (120, 60));
        assert!(page
            .buffer
            .as_raw()
            .chunks_exact(4)
            .all(|p| p[..3].iter().all(|&c| c == 0 || c == 255) && p[3] == 255));
    }
    for path in h.rasterizers.opened_paths() {
        assert!(!path.exists(), "temp file {:?} was not removed", path);
    }
}

#[test]
fn test_enhance_needs_no_models() {
    let rasterizers = FakeRasterizers::with_pages(1);
    let processor =
        OcrProcessor::with_config(Arc::new(FakeEngine::scripted(&["x"])), &Config::default())
            .unwrap()
            .with_rasterizers(rasterizers.clone())
            .with_models(ModelLocator::new(
                Some(PathBuf::from("/nonexistent/tessdata")),
                false,
            ));

    let pages = processor.enhance(&pdf_document()).unwrap();

    assert_eq!(pages.len(), 1);
    assert_eq!(rasterizers.opens.load(Ordering::SeqCst), 1);
}

#[test]
fn test_enhance_errors_match_process() {
    let h = harness(FakeEngine::scripted(&["x"]), FakeRasterizers::with_pages(0));
    let err = h.processor.enhance(&pdf_document()).unwrap_err();
    assert!(matches!(err, OcrError::Validation(_)), "got: {:?}", err);

    let err = h
        .processor
        .enhance(&SourceDocument::new("scan.pdf", Vec::new()))
        .unwrap_err();
    assert!(err.is_client_error());

    let rasterizers = Arc::new(FakeRasterizers {
        pages: 2,
        fail_render_on: Some(2),
        ..Default::default()
    });
    let failing = harness(FakeEngine::scripted(&["x"]), rasterizers);
    let err = failing.processor.enhance(&pdf_document()).unwrap_err();
    assert_eq!(err.code(), "RASTERIZATION_ERROR");
    assert!(matches!(err, OcrError::Document { .. }), "got: {:?}", err);
}

// ============================================================================
// Resources
// ============================================================================

#[test]
fn test_temp_storage_released_on_success_and_failure() {
    let h = harness(FakeEngine::scripted(&["ok"]), FakeRasterizers::with_pages(2));
    h.processor.process(&pdf_document()).unwrap();

    let mut engine = FakeEngine::scripted(&["ok"]);
    engine.fail_on = Some(1);
    let failing = harness(engine, FakeRasterizers::with_pages(2));
    failing.processor.process(&pdf_document()).unwrap_err();

    let paths: Vec<PathBuf> = h
        .rasterizers
        .opened_paths()
        .into_iter()
        .chain(failing.rasterizers.opened_paths())
        .collect();
    assert_eq!(paths.len(), 2);
    for path in paths {
        assert!(!path.exists(), "temp file {:?} was not removed", path);
    }
}

#[test]
fn test_missing_models_fail_before_rasterizing() {
    let rasterizers = FakeRasterizers::with_pages(1);
    let processor = OcrProcessor::with_config(Arc::new(FakeEngine::scripted(&["x"])), &Config::default())
        .unwrap()
        .with_rasterizers(rasterizers.clone())
        .with_models(ModelLocator::new(
            Some(PathBuf::from("/nonexistent/tessdata")),
            false,
        ));

    let err = processor.process(&pdf_document()).unwrap_err();

    assert_eq!(err.code(), "CONFIGURATION_ERROR");
    assert!(!err.is_client_error());
    assert_eq!(rasterizers.opens.load(Ordering::SeqCst), 0);
}

#[test]
fn test_oversized_document_is_rejected() {
    let config = Config {
        max_file_size: 8,
        ..Config::default()
    };
    let processor = OcrProcessor::with_config(Arc::new(FakeEngine::scripted(&["x"])), &config).unwrap();

    let err = processor.process(&pdf_document()).unwrap_err();

    assert_eq!(err.code(), "DOCUMENT_TOO_LARGE");
}

#[test]
fn test_unknown_media_type_is_rejected() {
    let h = harness(FakeEngine::scripted(&["x"]), FakeRasterizers::with_pages(1));

    let err = h
        .processor
        .process(&SourceDocument::new("notes.txt", b"plain text".to_vec()))
        .unwrap_err();

    assert_eq!(err.code(), "INVALID_DOCUMENT");
}

// ============================================================================
// Real rasterizers
// ============================================================================

fn real_rasterizer_processor(engine: FakeEngine, models: &Path) -> OcrProcessor {
    OcrProcessor::with_config(Arc::new(engine), &Config::default())
        .unwrap()
        .with_models(ModelLocator::new(Some(models.to_path_buf()), false))
}

#[test]
fn test_scanned_pdf_end_to_end() {
    let models = model_dir();
    let engine = FakeEngine::scripted(&["primera", "segunda"]);
    let seen = Arc::clone(&engine.seen);
    let processor = real_rasterizer_processor(engine, models.path());

    let document = SourceDocument::new("scan.pdf", scanned_pdf(2));
    let result = processor.process(&document).unwrap();

    assert_eq!(result.metadata.total_pages, 2);
    assert_eq!(result.pages[1].text, "segunda");
    // 144x72pt at 300 dpi is 600x300, upscaled 2x
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0], (1200, 600, true));
    assert_eq!((result.pages[0].width, result.pages[0].height), (1200, 600));
}

#[test]
fn test_scanned_pdf_enhanced_pages_encode_as_png() {
    let models = model_dir();
    let processor = real_rasterizer_processor(FakeEngine::scripted(&["x"]), models.path());

    let pages = processor
        .enhance(&SourceDocument::new("scan.pdf", scanned_pdf(2)))
        .unwrap();

    assert_eq!(pages.len(), 2);
    let decoded = image::load_from_memory(&pages[1].to_png().unwrap()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1200, 600));
}

#[test]
fn test_png_is_a_single_page() {
    let models = model_dir();
    let processor = real_rasterizer_processor(FakeEngine::scripted(&["imagen"]), models.path());

    let img = image::RgbImage::from_pixel(30, 10, image::Rgb([240, 240, 240]));
    let mut png = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();

    let result = processor
        .process(&SourceDocument::new("photo.png", png))
        .unwrap();

    assert_eq!(result.metadata.total_pages, 1);
    assert_eq!(result.pages[0].text, "imagen");
}

#[test]
fn test_corrupt_pdf_is_rasterization_error() {
    let models = model_dir();
    let processor = real_rasterizer_processor(FakeEngine::scripted(&["x"]), models.path());

    let err = processor
        .process(&SourceDocument::new("broken.pdf", b"%PDF-1.4 not really".to_vec()))
        .unwrap_err();

    assert_eq!(err.code(), "RASTERIZATION_ERROR");
}

// ============================================================================
// Batch
// ============================================================================

#[tokio::test]
async fn test_batch_keeps_input_order() {
    let h = harness(
        FakeEngine::scripted(&["uno", "dos"]),
        FakeRasterizers::with_pages(2),
    );
    let processor = Arc::new(h.processor);

    let documents = vec![
        SourceDocument::new("a.pdf", b"%PDF-1.4 a".to_vec()),
        SourceDocument::new("empty.pdf", Vec::new()),
        SourceDocument::new("c.pdf", b"%PDF-1.4 c".to_vec()),
    ];
    let results = process_batch(Arc::clone(&processor), documents).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().metadata.file_name, "a.pdf");
    assert!(results[1].as_ref().unwrap_err().is_client_error());
    assert_eq!(results[2].as_ref().unwrap().metadata.file_name, "c.pdf");

    // Each document got its own temp file and recognizer
    assert_eq!(h.rasterizers.opens.load(Ordering::SeqCst), 2);
    for result in results.iter().flatten() {
        assert_eq!(result.pages[0].text, "uno");
    }
}

#[tokio::test]
async fn test_enhance_batch_keeps_input_order() {
    let h = harness(FakeEngine::scripted(&["x"]), FakeRasterizers::with_pages(2));
    let processor = Arc::new(h.processor);

    let documents = vec![
        SourceDocument::new("empty.pdf", Vec::new()),
        SourceDocument::new("b.pdf", b"%PDF-1.4 b".to_vec()),
    ];
    let results = enhance_batch(processor, documents).await;

    assert_eq!(results.len(), 2);
    assert!(results[0].is_err());
    assert_eq!(results[1].as_ref().unwrap().len(), 2);
}
