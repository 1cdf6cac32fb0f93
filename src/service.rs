//! The two ingress-facing operations: `upload` and `generate_response`.
//!
//! These implement the two-phase workflow the HTTP layer (out of scope
//! here) exposes: an upload normalises the document to PDF and caches the
//! artifact; a later generate-response reuses that artifact when present
//! and re-derives it when not. The cache is advisory — a miss is never an
//! error.

use crate::backend;
use crate::cache::{Artifact, UploadCache};
use crate::config::ReviewConfig;
use crate::document::{Document, MediaType};
use crate::error::ReviewError;
use crate::output::{ReviewOutput, UploadOutput};
use crate::pipeline::{convert, extract};
use crate::review;
use crate::templates::TemplateStore;
use std::time::Instant;
use tracing::{debug, info};

/// Load the template store the configuration asks for: the configured
/// directory, or the compiled-in defaults.
///
/// Call this once at startup — a missing template file is a deployment
/// defect and fails here, never per-request.
pub fn load_templates(config: &ReviewConfig) -> Result<TemplateStore, ReviewError> {
    match &config.template_dir {
        Some(dir) => TemplateStore::load(dir),
        None => Ok(TemplateStore::builtin()),
    }
}

/// Derive the PDF artifact from a raw document: PDFs pass through after a
/// header check, Word documents go through the external converter.
async fn derive_pdf(document: &Document, config: &ReviewConfig) -> Result<Vec<u8>, ReviewError> {
    match document.media_type {
        MediaType::Pdf => {
            if document.bytes.len() < 4 || &document.bytes[..4] != b"%PDF" {
                let mut magic = [0u8; 4];
                let n = document.bytes.len().min(4);
                magic[..n].copy_from_slice(&document.bytes[..n]);
                return Err(ReviewError::NotAPdf {
                    filename: document.filename.clone(),
                    magic,
                });
            }
            Ok(document.bytes.clone())
        }
        MediaType::Word => convert::to_pdf(&document.bytes, config).await,
    }
}

/// Ingress operation "upload": normalise the document to PDF, cache the
/// artifact under its filename, and return the PDF bytes for streaming
/// back to the caller.
///
/// A repeated upload with the same filename replaces the cached artifact
/// (last writer wins).
pub async fn upload(
    document: Document,
    cache: &UploadCache,
    config: &ReviewConfig,
) -> Result<UploadOutput, ReviewError> {
    info!(
        filename = %document.filename,
        media_type = %document.media_type,
        bytes = document.bytes.len(),
        "upload received"
    );

    let pdf = derive_pdf(&document, config).await?;
    cache.put(&document.filename, Artifact::pdf(pdf.clone()));

    Ok(UploadOutput {
        filename: document.filename,
        pdf,
    })
}

/// Ingress operation "generate-response": produce the structured review for
/// a document, using the cached artifact for its filename when present and
/// re-deriving it from the raw upload when not.
///
/// Extraction and conversion failures surface as `Err`; individual LLM-call
/// failures never do — they become placeholder text in the result.
pub async fn generate_response(
    document: Document,
    cache: &UploadCache,
    templates: &TemplateStore,
    config: &ReviewConfig,
) -> Result<ReviewOutput, ReviewError> {
    let total_start = Instant::now();
    let llm_backend = backend::resolve_backend(config)?;

    let extract_start = Instant::now();
    let content;
    let title;
    match cache.get(&document.filename) {
        Some(Artifact::Text(text)) => {
            debug!(filename = %document.filename, "using cached normalized content");
            let paragraphs: Vec<String> = text.split("\n\n").map(str::to_string).collect();
            title = extract::extract_title(&paragraphs).unwrap_or_default().to_string();
            content = extract::normalize(&paragraphs, config.content_cap);
        }
        cached_pdf => {
            let pdf_bytes = match cached_pdf {
                Some(Artifact::Pdf(bytes)) => {
                    debug!(filename = %document.filename, "using cached PDF artifact");
                    bytes.to_vec()
                }
                _ => {
                    debug!(filename = %document.filename, "cache miss, deriving artifact");
                    derive_pdf(&document, config).await?
                }
            };

            let filename = document.filename.clone();
            let paragraphs = tokio::task::spawn_blocking(move || {
                extract::extract_pdf(&filename, &pdf_bytes)
            })
            .await
            .map_err(|e| ReviewError::Internal(format!("extract task panicked: {e}")))??;

            title = extract::extract_title(&paragraphs)
                .unwrap_or_default()
                .to_string();
            content = extract::normalize(&paragraphs, config.content_cap);
        }
    }
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

    let mut output = review::review(&title, &content, templates, &llm_backend, config).await;
    output.stats.extract_duration_ms = extract_duration_ms;
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        filename = %document.filename,
        failed_sections = output.stats.failed_sections,
        total_duration_ms = output.stats.total_duration_ms,
        "review generated"
    );
    Ok(output)
}
