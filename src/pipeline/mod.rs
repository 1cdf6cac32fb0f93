//! Pipeline stages for the document-to-review flow.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. a different converter tool) without touching other
//! stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ convert ──▶ extract ──▶ orchestrator ──▶ postprocess
//! (path/URL) (Word→PDF)  (text)     (5 LLM calls)     (cleanup)
//! ```
//!
//! 1. [`input`]   — canonicalise a user-supplied path or URL to a `Document`
//! 2. [`convert`] — Word→PDF via the external converter subprocess, with
//!    scoped temp-file cleanup on every exit path
//! 3. [`extract`] — decode PDF/Word bytes into the paragraph sequence and
//!    normalized content; runs in `spawn_blocking`, decoding is CPU-bound
//! 4. [`postprocess`] — opt-in text cleanup of model output
//!    (fence stripping, line endings, blank-line runs)
//!
//! The fan-out to the LLM itself lives in [`crate::review`]; the two-phase
//! upload/generate workflow in [`crate::service`].

pub mod convert;
pub mod extract;
pub mod input;
pub mod postprocess;
