//! Error types for the manuscript-review library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ReviewError`] — **Fatal**: the request cannot proceed at all
//!   (unsupported media type, corrupt document, converter failure, missing
//!   template file). Returned as `Err(ReviewError)` from the top-level
//!   `upload` / `generate_response` operations.
//!
//! * [`SectionError`] — **Non-fatal**: a single review section failed
//!   (transport error, quota, timeout) but the other sections are fine.
//!   Stored inside [`crate::output::SectionReview`] so callers always get a
//!   complete five-section result rather than losing the whole review to one
//!   unavailable backend call.
//!
//! The separation makes the "an LLM failure never fails the request" policy
//! visible in the types instead of hidden in a catch block: fatal errors are
//! `Err`, section failures are values.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the manuscript-review library.
///
/// Section-level LLM failures use [`SectionError`] and are stored in
/// [`crate::output::SectionReview`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ReviewError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Declared media type is neither PDF nor Word.
    #[error("Unsupported media type '{media_type}'\nSupported: application/pdf, application/vnd.openxmlformats-officedocument.wordprocessingml.document")]
    UnsupportedFormat { media_type: String },

    /// Input file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The bytes were declared as PDF but do not start with the PDF header.
    #[error("Document '{filename}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { filename: String, magic: [u8; 4] },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The decoder could not parse an otherwise correctly-typed byte stream.
    ///
    /// Decoding is deterministic, so this is never retried; it surfaces to
    /// the caller as a client-input failure.
    #[error("Failed to extract text from '{filename}': {detail}")]
    Extraction { filename: String, detail: String },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The external converter exited with a non-zero status.
    #[error("Word-to-PDF conversion failed (exit {status}): {stderr}")]
    Conversion { status: i32, stderr: String },

    /// The converter process could not be launched at all.
    #[error("Failed to launch converter '{program}': {source}\nIs it installed and on PATH?")]
    ConverterLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The converter ran longer than the configured timeout.
    #[error("Converter timed out after {secs}s\nIncrease --converter-timeout.")]
    ConverterTimeout { secs: u64 },

    // ── Template errors ───────────────────────────────────────────────────
    /// A template file is absent from the configured directory.
    ///
    /// This is a deployment defect and should abort startup, not a request.
    #[error("Template '{name}' not found at '{path}'\nAll five template files must exist.")]
    TemplateMissing { name: String, path: PathBuf },

    /// A section name does not match any known template.
    #[error("Unknown template '{name}'\nKnown: Novelty, Significance, Soundness, Section, Overall")]
    UnknownTemplate { name: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Backend errors ────────────────────────────────────────────────────
    /// The configured LLM backend is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A single failed LLM completion call.
///
/// Carries the transport/quota/malformed-response diagnostic from the
/// completion service. Wrapped into [`SectionError::CallFailed`] by the
/// orchestrator.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
#[error("LLM call failed: {message}")]
pub struct LlmCallError {
    pub message: String,
}

impl LlmCallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A non-fatal error for a single review section.
///
/// Stored alongside [`crate::output::SectionReview`] when a section's LLM
/// call fails. The overall review always completes; failed sections are
/// replaced by their placeholder text at response assembly.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum SectionError {
    /// The completion call failed (transport, quota, malformed response).
    #[error("{section}: LLM call failed: {detail}")]
    CallFailed { section: String, detail: String },

    /// The completion call exceeded the configured timeout.
    #[error("{section}: LLM call timed out after {secs}s")]
    Timeout { section: String, secs: u64 },
}
