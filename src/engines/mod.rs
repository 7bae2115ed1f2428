//! Recognition backends, each behind its own cargo feature, and the registry
//! that picks one by name.

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

#[cfg(feature = "engine-leptess")]
pub mod leptess;

use crate::engine::OcrEngine;
use crate::error::OcrError;
use serde::Serialize;
use std::sync::Arc;

/// `--list-engines` entry
#[derive(Debug, Clone, Serialize)]
pub struct EngineInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub default: bool,
    pub supported_formats: Vec<String>,
    pub supported_languages: Vec<String>,
}

/// Engines compiled into this build
pub struct EngineRegistry {
    engines: Vec<Arc<dyn OcrEngine>>,
    default_engine: String,
}

impl EngineRegistry {
    /// Create a registry holding every engine compiled into this build.
    ///
    /// Engines load their models per document, so this does no I/O.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        #[allow(unused_mut)]
        let mut engines: Vec<Arc<dyn OcrEngine>> = Vec::new();

        #[cfg(feature = "engine-ocrs")]
        engines.push(Arc::new(ocrs::OcrsEngine::new()));

        #[cfg(feature = "engine-leptess")]
        engines.push(Arc::new(leptess::LeptessEngine::new()));

        Self::with_engines(engines)
    }

    /// Build a registry from explicit engines; the first one is the default.
    pub fn with_engines(engines: Vec<Arc<dyn OcrEngine>>) -> Self {
        let default_engine = engines
            .first()
            .map(|e| e.name().to_string())
            .unwrap_or_default();
        Self {
            engines,
            default_engine,
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn OcrEngine>> {
        self.engines.iter().find(|e| e.name() == name).cloned()
    }

    pub fn default(&self) -> Option<Arc<dyn OcrEngine>> {
        self.get(&self.default_engine)
    }

    pub fn default_name(&self) -> &str {
        &self.default_engine
    }

    /// Resolve a requested engine name, falling back to the default.
    pub fn select(&self, name: Option<&str>) -> Result<Arc<dyn OcrEngine>, OcrError> {
        if self.engines.is_empty() {
            return Err(OcrError::Configuration(
                "No OCR engines available. Build with --features engine-ocrs or --features engine-leptess".to_string(),
            ));
        }

        match name {
            Some(name) => self.get(name).ok_or_else(|| {
                OcrError::Configuration(format!(
                    "Unknown engine '{}'. Available engines: {}",
                    name,
                    self.list().join(", ")
                ))
            }),
            None => self.default().ok_or_else(|| {
                OcrError::Configuration("No default OCR engine configured".to_string())
            }),
        }
    }

    pub fn list(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.name()).collect()
    }

    /// Descriptions for every engine, default flagged
    pub fn info(&self) -> Vec<EngineInfo> {
        self.engines
            .iter()
            .map(|e| EngineInfo {
                name: e.name(),
                description: e.description(),
                default: e.name() == self.default_engine,
                supported_formats: e.supported_formats(),
                supported_languages: e.supported_languages(),
            })
            .collect()
    }
}
