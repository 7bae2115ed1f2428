use serde::Serialize;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Invalid document: {0}")]
    Validation(String),

    #[error("Document too large: {size} bytes (max: {max} bytes)")]
    DocumentTooLarge { size: usize, max: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to rasterize {}: {source}", page_label(.page))]
    Rasterization {
        page: Option<usize>,
        #[source]
        source: BoxError,
    },

    #[error("Recognition failed on page {page}: {source}")]
    Recognition {
        page: usize,
        #[source]
        source: BoxError,
    },

    #[error("Enhancement step failed: {0}")]
    Enhancement(String),

    #[error("Text normalization failed: {0}")]
    Normalization(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Temporary storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error processing '{file_name}': {source}")]
    Document {
        file_name: String,
        #[source]
        source: Box<OcrError>,
    },
}

fn page_label(page: &Option<usize>) -> String {
    match page {
        Some(page) => format!("page {}", page),
        None => "document".to_string(),
    }
}

impl OcrError {
    pub fn rasterization(page: Option<usize>, source: impl Into<BoxError>) -> Self {
        Self::Rasterization {
            page,
            source: source.into(),
        }
    }

    pub fn recognition(page: usize, source: impl Into<BoxError>) -> Self {
        Self::Recognition {
            page,
            source: source.into(),
        }
    }

    /// True when the caller sent bad input, as opposed to a deployment or
    /// engine fault.
    pub fn is_client_error(&self) -> bool {
        match self {
            OcrError::Validation(_) | OcrError::DocumentTooLarge { .. } => true,
            OcrError::Document { source, .. } => source.is_client_error(),
            _ => false,
        }
    }

    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            OcrError::Validation(_) => "INVALID_DOCUMENT",
            OcrError::DocumentTooLarge { .. } => "DOCUMENT_TOO_LARGE",
            OcrError::Configuration(_) => "CONFIGURATION_ERROR",
            OcrError::Rasterization { .. } => "RASTERIZATION_ERROR",
            OcrError::Recognition { .. } => "RECOGNITION_ERROR",
            OcrError::Enhancement(_) => "ENHANCEMENT_ERROR",
            OcrError::Normalization(_) => "NORMALIZATION_ERROR",
            OcrError::Backend(_) => "BACKEND_ERROR",
            OcrError::Io(_) => "STORAGE_ERROR",
            OcrError::Document { source, .. } => source.code(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<&OcrError> for ErrorResponse {
    fn from(err: &OcrError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code().to_string(),
        }
    }
}
