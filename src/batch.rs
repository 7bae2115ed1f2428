//! Concurrent processing of independent documents

use crate::document::SourceDocument;
use crate::error::OcrError;
use crate::ocr::OcrProcessor;
use crate::page::Page;
use crate::report::DocumentResult;
use futures::future::join_all;
use std::sync::Arc;

/// Process documents concurrently on the blocking thread pool.
///
/// Each document runs as its own invocation with its own temp file,
/// rasterizer and recognizer. Results come back in input order.
pub async fn process_batch(
    processor: Arc<OcrProcessor>,
    documents: Vec<SourceDocument>,
) -> Vec<Result<DocumentResult, OcrError>> {
    tracing::info!("Processing batch of {} documents", documents.len());
    run_batch(processor, documents, OcrProcessor::process).await
}

/// Enhance documents concurrently, without recognition.
pub async fn enhance_batch(
    processor: Arc<OcrProcessor>,
    documents: Vec<SourceDocument>,
) -> Vec<Result<Vec<Page>, OcrError>> {
    tracing::info!("Enhancing batch of {} documents", documents.len());
    run_batch(processor, documents, OcrProcessor::enhance).await
}

async fn run_batch<T: Send + 'static>(
    processor: Arc<OcrProcessor>,
    documents: Vec<SourceDocument>,
    call: fn(&OcrProcessor, &SourceDocument) -> Result<T, OcrError>,
) -> Vec<Result<T, OcrError>> {
    let tasks = documents.into_iter().map(|document| {
        let processor = Arc::clone(&processor);
        tokio::task::spawn_blocking(move || call(&processor, &document))
    });

    join_all(tasks)
        .await
        .into_iter()
        .map(|joined| {
            joined.unwrap_or_else(|e| {
                Err(OcrError::Backend(format!("document task failed: {}", e)))
            })
        })
        .collect()
}
