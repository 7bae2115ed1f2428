use anyhow::Context;
use clap::Parser;
use docscan_ocr::config::{Config, DEFAULT_DPI, DEFAULT_LANGUAGE, DEFAULT_MAX_FILE_SIZE};
use docscan_ocr::document::MediaType;
use docscan_ocr::engines::EngineRegistry;
use docscan_ocr::error::{ErrorResponse, OcrError};
use docscan_ocr::report::Status;
use docscan_ocr::{enhance_batch, process_batch, OcrProcessor, Page, SourceDocument};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "docscan-ocr")]
#[command(about = "Extract text from scanned PDFs and images")]
#[command(version)]
pub struct Args {
    /// Documents to process (PDF or image)
    #[arg(required_unless_present = "list_engines")]
    pub files: Vec<PathBuf>,

    /// Print the available OCR engines and exit
    #[arg(long)]
    pub list_engines: bool,

    /// Recognition language (e.g., "spa", "eng")
    #[arg(long, env = "OCR_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Language model directory (tessdata or ocrs models)
    #[arg(long, env = "TESSDATA_PREFIX")]
    pub tessdata: Option<PathBuf>,

    /// Declared MIME type of every input (default: from extension, then content)
    #[arg(long)]
    pub media_type: Option<String>,

    /// Write enhanced pages as PNG files to this directory instead of recognizing text
    #[arg(long)]
    pub pages_dir: Option<PathBuf>,

    /// OCR engine to use (defaults to the first compiled-in engine)
    #[arg(long, env = "OCR_ENGINE")]
    pub engine: Option<String>,

    /// Rasterization resolution
    #[arg(long, default_value_t = DEFAULT_DPI)]
    pub dpi: u32,

    /// Upscale factor applied before filtering
    #[arg(long, default_value_t = 2.0)]
    pub scale: f32,

    /// Contrast multiplier
    #[arg(long, default_value_t = 1.8)]
    pub contrast: f32,

    /// Subtracted after the contrast multiplier (0-255 units)
    #[arg(long, default_value_t = 25.5)]
    pub contrast_bias: f32,

    /// Binarization luminance threshold
    #[arg(long, default_value_t = 180)]
    pub threshold: u8,

    /// JSON file replacing the built-in text correction tables
    #[arg(long)]
    pub corrections: Option<PathBuf>,

    /// Download missing model files instead of failing
    #[arg(long)]
    pub download_models: bool,

    /// Maximum document size in bytes (default: 50MB)
    #[arg(long, env = "OCR_MAX_FILE_SIZE", default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let mut config = Config {
            language: args.language,
            model_path: args.tessdata,
            download_models: args.download_models,
            engine: args.engine,
            dpi: args.dpi,
            max_file_size: args.max_file_size,
            ..Config::default()
        };
        config.enhancement.scale_factor = args.scale;
        config.enhancement.contrast_factor = args.contrast;
        config.enhancement.contrast_bias = args.contrast_bias;
        config.enhancement.threshold = args.threshold;
        config
    }
}

/// Output line for a document that could not be processed
#[derive(Serialize)]
struct FailedDocument {
    status: Status,
    file_name: String,
    #[serde(flatten)]
    error: ErrorResponse,
}

impl FailedDocument {
    fn new(path: &Path, error: &OcrError) -> Self {
        Self {
            status: Status::Failure,
            file_name: path.display().to_string(),
            error: ErrorResponse::from(error),
        }
    }
}

/// Output line for a document whose enhanced pages were written to disk
#[derive(Serialize)]
struct EnhancedDocument {
    status: Status,
    file_name: String,
    pages: Vec<EnhancedPage>,
}

#[derive(Serialize)]
struct EnhancedPage {
    number: usize,
    width: u32,
    height: u32,
    path: PathBuf,
}

/// Save each page as `<stem>-page-<n>.png` in `dir`
fn save_pages(dir: &Path, source: &Path, pages: &[Page]) -> anyhow::Result<Vec<EnhancedPage>> {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());

    pages
        .iter()
        .map(|page| -> anyhow::Result<EnhancedPage> {
            let path = dir.join(format!("{}-page-{}.png", stem, page.number));
            std::fs::write(&path, page.to_png()?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Ok(EnhancedPage {
                number: page.number,
                width: page.width,
                height: page.height,
                path,
            })
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if args.list_engines {
        return print_json(&EngineRegistry::new().info(), args.pretty);
    }

    tracing::info!("Starting docscan-ocr v{}", env!("CARGO_PKG_VERSION"));

    let pretty = args.pretty;
    let files = args.files.clone();
    let corrections = args.corrections.clone();
    let pages_dir = args.pages_dir.clone();
    let media_type = match args.media_type.as_deref() {
        Some(mime) => Some(
            MediaType::from_mime(mime)
                .with_context(|| format!("Unsupported media type '{}'", mime))?,
        ),
        None => None,
    };

    let mut config = Config::from(args);
    if let Some(path) = corrections {
        config.load_corrections(&path)?;
    }

    let processor = Arc::new(OcrProcessor::new(&config)?);
    tracing::info!("Using engine {}", processor.engine_name());

    let documents = files
        .iter()
        .map(|path| -> anyhow::Result<SourceDocument> {
            let document = SourceDocument::open(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(match media_type {
                Some(media_type) => document.with_media_type(media_type),
                None => document,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut failures = 0;
    if let Some(dir) = pages_dir {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let results = enhance_batch(processor, documents).await;
        for (path, result) in files.iter().zip(results) {
            match result {
                Ok(pages) => {
                    let enhanced = EnhancedDocument {
                        status: Status::Success,
                        file_name: path.display().to_string(),
                        pages: save_pages(&dir, path, &pages)?,
                    };
                    print_json(&enhanced, pretty)?;
                }
                Err(e) => {
                    failures += 1;
                    print_json(&FailedDocument::new(path, &e), pretty)?;
                }
            }
        }
    } else {
        let results = process_batch(processor, documents).await;
        for (path, result) in files.iter().zip(results) {
            match result {
                Ok(report) => print_json(&report, pretty)?,
                Err(e) => {
                    failures += 1;
                    print_json(&FailedDocument::new(path, &e), pretty)?;
                }
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} documents failed", failures, files.len());
    }
    Ok(())
}
