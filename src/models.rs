//! Language-model location
//!
//! Finds the directory holding an engine's model files. Resolution happens
//! before any page work, so a missing model fails the call up front.

use crate::engine::ModelFile;
use crate::error::OcrError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Directory names searched for model files
const MODEL_DIR_NAMES: [&str; 2] = ["tessdata", "models"];
/// How many ancestors of each search root are inspected
const MAX_ANCESTORS: usize = 5;

/// Resolves where an engine's model files live.
#[derive(Debug, Clone)]
pub struct ModelLocator {
    explicit: Option<PathBuf>,
    download: bool,
    search_roots: Vec<PathBuf>,
    cache_dir: PathBuf,
}

impl ModelLocator {
    /// Search the explicit directory if given, otherwise the executable's
    /// and working directory's ancestry and then the user cache.
    pub fn new(explicit: Option<PathBuf>, download: bool) -> Self {
        let mut search_roots = Vec::new();
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            search_roots.push(exe_dir);
        }
        if let Ok(cwd) = std::env::current_dir() {
            search_roots.push(cwd);
        }

        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("docscan-ocr")
            .join("models");

        Self {
            explicit,
            download,
            search_roots,
            cache_dir,
        }
    }

    pub fn with_search_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.search_roots = roots;
        self
    }

    pub fn with_cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = dir;
        self
    }

    /// Directories inspected, in priority order
    pub fn candidates(&self) -> Vec<PathBuf> {
        if let Some(explicit) = &self.explicit {
            return vec![explicit.clone()];
        }

        let mut candidates = Vec::new();
        for root in &self.search_roots {
            for ancestor in root.ancestors().take(MAX_ANCESTORS + 1) {
                for name in MODEL_DIR_NAMES {
                    let dir = ancestor.join(name);
                    if !candidates.contains(&dir) {
                        candidates.push(dir);
                    }
                }
            }
        }
        candidates.push(self.cache_dir.clone());
        candidates
    }

    /// Find a directory holding every file in `models`.
    pub fn resolve(&self, models: &[ModelFile]) -> Result<PathBuf, OcrError> {
        let candidates = self.candidates();

        if let Some(dir) = candidates.iter().find(|dir| has_all(dir, models)) {
            tracing::debug!("Using model directory {:?}", dir);
            return Ok(dir.clone());
        }

        if self.download {
            let target = self.explicit.clone().unwrap_or_else(|| self.cache_dir.clone());
            download_missing(&target, models)?;
            return Ok(target);
        }

        let wanted: Vec<&str> = models.iter().map(|m| m.file_name.as_str()).collect();
        let searched: Vec<String> = candidates.iter().map(|d| d.display().to_string()).collect();
        Err(OcrError::Configuration(format!(
            "Language model files [{}] not found; searched: {}",
            wanted.join(", "),
            searched.join(", ")
        )))
    }
}

fn has_all(dir: &Path, models: &[ModelFile]) -> bool {
    dir.is_dir() && models.iter().all(|m| dir.join(&m.file_name).is_file())
}

/// Fetch every model file not already present in `dir`
fn download_missing(dir: &Path, models: &[ModelFile]) -> Result<(), OcrError> {
    fs::create_dir_all(dir).map_err(|e| {
        OcrError::Configuration(format!(
            "Failed to create model directory {}: {}",
            dir.display(),
            e
        ))
    })?;

    for model in models {
        let path = dir.join(&model.file_name);
        if path.is_file() {
            tracing::info!("Using cached model from {:?}", path);
            continue;
        }
        tracing::info!(
            "Downloading {} (this may take a moment)...",
            model.file_name
        );
        download_file(&model.url, dir, &path)?;
        tracing::info!("Downloaded {} to {:?}", model.file_name, path);
    }
    Ok(())
}

/// Download a file from URL to path using ureq
fn download_file(url: &str, dir: &Path, path: &Path) -> Result<(), OcrError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| OcrError::Configuration(format!("Failed to download model: {}", e)))?;

    // Read response body
    let buffer = response.into_body().read_to_vec().map_err(|e| {
        OcrError::Configuration(format!("Failed to read response body: {}", e))
    })?;

    // Write beside the target and rename so a partial download is never picked up
    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        OcrError::Configuration(format!("Failed to create model file: {}", e))
    })?;
    file.write_all(&buffer)
        .map_err(|e| OcrError::Configuration(format!("Failed to write model file: {}", e)))?;
    file.persist(path).map_err(|e| {
        OcrError::Configuration(format!("Failed to store model file: {}", e.error))
    })?;

    Ok(())
}
