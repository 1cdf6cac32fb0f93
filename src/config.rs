//! Configuration types for review generation.
//!
//! All pipeline behaviour is controlled through [`ReviewConfig`], built via
//! its [`ReviewConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across tasks, serialise them for logging, and
//! diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! documented defaults for the rest.

use crate::backend::CompletionBackend;
use crate::error::ReviewError;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for the document-to-review pipeline.
///
/// Built via [`ReviewConfig::builder()`] or using
/// [`ReviewConfig::default()`].
///
/// # Example
/// ```rust
/// use manuscript_review::ReviewConfig;
///
/// let config = ReviewConfig::builder()
///     .content_cap(12_000)
///     .model("gpt-4o")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ReviewConfig {
    /// Maximum characters of normalized content submitted per LLM call. Default: 8000.
    ///
    /// Manuscripts routinely exceed completion-context budgets, so the
    /// evaluation context is capped before submission. When the cap is hit, a
    /// visible truncation marker is appended so callers can tell the review
    /// was based on partial text. The value is a plain character count, not
    /// tokens; the historical constant 8000 is kept as the default.
    pub content_cap: usize,

    /// Number of concurrent LLM calls within one review. Default: 5.
    ///
    /// The five section calls have no data dependency on each other, so full
    /// fan-out bounds total latency to roughly the slowest single call.
    /// Lower this if the backend rate-limits aggressively.
    pub concurrency: usize,

    /// LLM model identifier, e.g. "gpt-4o". If None, uses provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `backend`, the resolver falls back to environment
    /// auto-detection.
    pub provider_name: Option<String>,

    /// Pre-constructed completion backend. Takes precedence over
    /// `provider_name`. This is the injection seam tests use for mocks.
    pub backend: Option<Arc<dyn CompletionBackend>>,

    /// Sampling temperature. Default: 0.0.
    ///
    /// Review generation wants determinism and fidelity to the manuscript,
    /// not creativity.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate per section. Default: 4096.
    pub max_tokens: usize,

    /// Per-section LLM call timeout in seconds. Default: 60.
    ///
    /// A timed-out call is treated as that section's failure and replaced by
    /// its placeholder; it never fails the request.
    pub api_timeout_secs: u64,

    /// Opt-in cleanup of model output. Default: false.
    ///
    /// When off, section text is returned exactly as the model produced it,
    /// whitespace-trimmed only. When on, an outer markdown fence wrapping a
    /// whole section and runs of blank lines are also stripped.
    pub clean_output: bool,

    /// External Word-to-PDF converter executable. Default: "unoconv".
    ///
    /// Invoked as `<program> -f pdf -o <output> <input>`. Any tool honouring
    /// that contract (exit 0 plus a readable PDF at the output path) works.
    pub converter_program: String,

    /// Converter subprocess timeout in seconds. Default: 120.
    pub converter_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Directory holding the five template files. If None, the compiled-in
    /// defaults are used. A configured directory missing any file is
    /// startup-fatal.
    pub template_dir: Option<PathBuf>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            content_cap: 8000,
            concurrency: 5,
            model: None,
            provider_name: None,
            backend: None,
            temperature: 0.0,
            max_tokens: 4096,
            api_timeout_secs: 60,
            clean_output: false,
            converter_program: "unoconv".to_string(),
            converter_timeout_secs: 120,
            download_timeout_secs: 120,
            template_dir: None,
        }
    }
}

impl fmt::Debug for ReviewConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewConfig")
            .field("content_cap", &self.content_cap)
            .field("concurrency", &self.concurrency)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("backend", &self.backend.as_ref().map(|_| "<dyn CompletionBackend>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("clean_output", &self.clean_output)
            .field("converter_program", &self.converter_program)
            .field("converter_timeout_secs", &self.converter_timeout_secs)
            .field("template_dir", &self.template_dir)
            .finish()
    }
}

impl ReviewConfig {
    /// Create a new builder for `ReviewConfig`.
    pub fn builder() -> ReviewConfigBuilder {
        ReviewConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ReviewConfig`].
#[derive(Debug)]
pub struct ReviewConfigBuilder {
    config: ReviewConfig,
}

impl ReviewConfigBuilder {
    pub fn content_cap(mut self, chars: usize) -> Self {
        self.config.content_cap = chars;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn backend(mut self, backend: Arc<dyn CompletionBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn clean_output(mut self, enable: bool) -> Self {
        self.config.clean_output = enable;
        self
    }

    pub fn converter_program(mut self, program: impl Into<String>) -> Self {
        self.config.converter_program = program.into();
        self
    }

    pub fn converter_timeout_secs(mut self, secs: u64) -> Self {
        self.config.converter_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.template_dir = Some(dir.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReviewConfig, ReviewError> {
        let c = &self.config;
        if c.content_cap == 0 {
            return Err(ReviewError::InvalidConfig(
                "content_cap must be ≥ 1".into(),
            ));
        }
        if c.concurrency == 0 {
            return Err(ReviewError::InvalidConfig("concurrency must be ≥ 1".into()));
        }
        if c.converter_program.is_empty() {
            return Err(ReviewError::InvalidConfig(
                "converter_program must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_documented_values() {
        let c = ReviewConfig::default();
        assert_eq!(c.content_cap, 8000);
        assert_eq!(c.concurrency, 5);
        assert_eq!(c.temperature, 0.0);
        assert_eq!(c.converter_program, "unoconv");
    }

    #[test]
    fn builder_clamps_and_validates() {
        let c = ReviewConfig::builder()
            .concurrency(0)
            .temperature(9.0)
            .build()
            .unwrap();
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.temperature, 2.0);

        let err = ReviewConfig::builder().content_cap(0).build().unwrap_err();
        assert!(matches!(err, ReviewError::InvalidConfig(_)));
    }
}
