//! Document report: per-page results, statistics and the assembled result

use crate::error::OcrError;
use serde::Serialize;
use std::time::Duration;

/// Recognized text and counts for one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult {
    /// 1-based page number
    pub number: usize,
    pub text: String,
    /// Mean confidence as a percentage in 0-100, rounded to 2 decimals
    pub confidence: f64,
    pub characters: usize,
    pub words: usize,
    /// Size of the enhanced page the text was recognized from
    pub width: u32,
    pub height: u32,
}

impl PageResult {
    /// Build a page result from normalized text and the engine's 0-1 confidence.
    pub fn new(number: usize, text: String, confidence_ratio: f32) -> Self {
        let characters = text.chars().count();
        let words = text.split_whitespace().count();
        Self {
            number,
            text,
            confidence: confidence_percent(confidence_ratio),
            characters,
            words,
            width: 0,
            height: 0,
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Scale a 0-1 ratio to a 0-100 percentage with 2 decimals
pub fn confidence_percent(ratio: f32) -> f64 {
    if !ratio.is_finite() {
        return 0.0;
    }
    round2((ratio as f64 * 100.0).clamp(0.0, 100.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Totals and per-page averages across a document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatistics {
    pub total_characters: usize,
    pub total_words: usize,
    pub average_characters_per_page: f64,
    pub average_words_per_page: f64,
}

impl DocumentStatistics {
    pub fn from_pages(pages: &[PageResult]) -> Result<Self, OcrError> {
        if pages.is_empty() {
            return Err(OcrError::Validation(
                "cannot compute statistics for a document with no pages".to_string(),
            ));
        }

        let total_characters: usize = pages.iter().map(|p| p.characters).sum();
        let total_words: usize = pages.iter().map(|p| p.words).sum();
        let count = pages.len() as f64;

        Ok(Self {
            total_characters,
            total_words,
            average_characters_per_page: total_characters as f64 / count,
            average_words_per_page: total_words as f64 / count,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub file_name: String,
    /// Size formatted as kilobytes, e.g. `"12.50 KB"`
    pub file_size: String,
    pub total_pages: usize,
    /// Elapsed time formatted as seconds, e.g. `"1.25 s"`
    pub processing_time: String,
    pub processing_seconds: f64,
    pub engine: String,
    pub statistics: DocumentStatistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failure,
}

/// Final report for one document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResult {
    pub status: Status,
    pub message: String,
    pub metadata: DocumentMetadata,
    pub pages: Vec<PageResult>,
    pub full_text: String,
}

/// Document-level facts gathered by the orchestrator
#[derive(Debug, Clone)]
pub struct DocumentFacts<'a> {
    pub file_name: &'a str,
    pub file_size: usize,
    pub engine: &'a str,
    pub elapsed: Duration,
}

pub fn format_file_size(bytes: usize) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

pub fn page_header(number: usize) -> String {
    format!("--- Page {} ---", number)
}

/// Join page texts in order, each under its page header, separated by a blank line
pub fn build_full_text(pages: &[PageResult]) -> String {
    pages
        .iter()
        .map(|p| format!("{}\n{}", page_header(p.number), p.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Assemble the final report from ordered page results.
pub fn aggregate(facts: DocumentFacts<'_>, pages: Vec<PageResult>) -> Result<DocumentResult, OcrError> {
    let statistics = DocumentStatistics::from_pages(&pages)?;
    let seconds = round2(facts.elapsed.as_secs_f64());

    let metadata = DocumentMetadata {
        file_name: facts.file_name.to_string(),
        file_size: format_file_size(facts.file_size),
        total_pages: pages.len(),
        processing_time: format!("{:.2} s", seconds),
        processing_seconds: seconds,
        engine: facts.engine.to_string(),
        statistics,
    };

    Ok(DocumentResult {
        status: Status::Success,
        message: format!(
            "Processed {} page(s) with the {} engine",
            pages.len(),
            facts.engine
        ),
        full_text: build_full_text(&pages),
        metadata,
        pages,
    })
}
