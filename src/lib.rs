//! # manuscript-review
//!
//! Generate a structured multi-section review of a manuscript (PDF or Word)
//! by fanning one document out to multiple independent LLM completion
//! calls — one per review section — and assembling their results.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Document (PDF / Word)
//!  │
//!  ├─ 1. Upload    Word→PDF via external converter, artifact cached by filename
//!  ├─ 2. Extract   paragraph sequence (pdf-extract / docx XML walk, spawn_blocking)
//!  ├─ 3. Normalize paragraphs joined, capped, truncation marker when clipped
//!  ├─ 4. Review    five concurrent LLM calls (Novelty, Significance,
//!  │               Soundness, Section, Overall), failures → placeholders
//!  └─ 5. Output    assembled ReviewResponse + per-section stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use manuscript_review::{
//!     generate_response, load_templates, upload, Document, ReviewConfig, UploadCache,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = ReviewConfig::default();
//!     let templates = load_templates(&config)?;
//!     let cache = UploadCache::new();
//!
//!     let bytes = std::fs::read("paper.pdf")?;
//!     let doc = Document::pdf("paper.pdf", bytes)?;
//!
//!     upload(doc.clone(), &cache, &config).await?;
//!     let output = generate_response(doc, &cache, &templates, &config).await?;
//!     println!("{}", serde_json::to_string_pretty(&output.to_response())?);
//!     Ok(())
//! }
//! ```
//!
//! ## Failure model
//!
//! Extraction and conversion failures are request failures (`Err`); an
//! individual LLM call failing never is — the affected section carries the
//! literal placeholder `"Failed to generate <Section> review."` instead.
//! See [`error`] for the full taxonomy.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mreview` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! manuscript-review = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod review;
pub mod service;
pub mod templates;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{Completion, CompletionBackend, EdgequakeBackend};
pub use cache::{Artifact, UploadCache};
pub use config::{ReviewConfig, ReviewConfigBuilder};
pub use document::{Document, MediaType};
pub use error::{LlmCallError, ReviewError, SectionError};
pub use output::{ReviewOutput, ReviewResponse, ReviewStats, SectionReview, UploadOutput};
pub use pipeline::extract::{NormalizedContent, TRUNCATION_MARKER};
pub use review::review;
pub use service::{generate_response, load_templates, upload};
pub use templates::{SectionKind, Template, TemplateStore};
