//! The completion backend seam.
//!
//! The hosted LLM service is an external collaborator providing exactly one
//! operation: *complete(prompt) → text, fails on transport/quota error*.
//! [`CompletionBackend`] captures that contract as a crate-local trait so
//! the orchestrator never touches provider SDK types directly and tests can
//! inject deterministic mocks without a network.
//!
//! The production implementation, [`EdgequakeBackend`], adapts any
//! `edgequake_llm::LLMProvider` (OpenAI, Anthropic, Gemini, Ollama, …).

use crate::config::ReviewConfig;
use crate::error::{LlmCallError, ReviewError};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::debug;

/// One successful completion, with token accounting for stats.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
}

/// A text-completion service: a rendered prompt in, a completion out.
///
/// Implementations must be cheap to share (`Send + Sync`); the orchestrator
/// clones one `Arc<dyn CompletionBackend>` per concurrent section call.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Issue one synchronous completion request. Transport errors, quota
    /// errors and malformed payloads all surface as [`LlmCallError`]; the
    /// caller decides whether that is fatal (for the orchestrator it never
    /// is).
    async fn complete(&self, prompt: &str) -> Result<Completion, LlmCallError>;
}

/// Production backend over an `edgequake_llm` provider.
pub struct EdgequakeBackend {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: usize,
}

impl EdgequakeBackend {
    pub fn new(provider: Arc<dyn LLMProvider>, temperature: f32, max_tokens: usize) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
        }
    }
}

#[async_trait]
impl CompletionBackend for EdgequakeBackend {
    async fn complete(&self, prompt: &str) -> Result<Completion, LlmCallError> {
        let messages = vec![ChatMessage::user(prompt)];
        let options = CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| LlmCallError::new(e.to_string()))?;

        debug!(
            input_tokens = response.prompt_tokens,
            output_tokens = response.completion_tokens,
            "completion returned"
        );

        Ok(Completion {
            text: response.content,
            input_tokens: response.prompt_tokens as usize,
            output_tokens: response.completion_tokens as usize,
        })
    }
}

/// Instantiate a named provider with the given model.
fn create_backend(
    provider_name: &str,
    model: &str,
    config: &ReviewConfig,
) -> Result<Arc<dyn CompletionBackend>, ReviewError> {
    let provider = ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        ReviewError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })?;
    Ok(Arc::new(EdgequakeBackend::new(
        provider,
        config.temperature,
        config.max_tokens,
    )))
}

/// Resolve the completion backend, from most-specific to least-specific.
///
/// The four-level fallback chain lets library users and CLI users each set
/// exactly as much or as little as they need:
///
/// 1. **Pre-built backend** (`config.backend`) — the caller constructed the
///    backend entirely; we use it as-is. This is how tests inject mocks.
///
/// 2. **Named provider + model** (`config.provider_name`) — the caller named
///    a provider (e.g. `"openai"`) and optional model; the factory reads the
///    corresponding API key (`OPENAI_API_KEY`, etc.) from the environment.
///
/// 3. **Environment pair** (`MREVIEW_LLM_PROVIDER` + `MREVIEW_MODEL`) — both
///    env vars set means the execution environment (Makefile, shell script,
///    CI) chose; checked before full auto-detection so the model choice is
///    honoured even when multiple API keys are present.
///
/// 4. **Full auto-detection** — prefer OpenAI when `OPENAI_API_KEY` is
///    present, otherwise let `ProviderFactory::from_env` scan all known key
///    variables and pick the first available provider.
pub fn resolve_backend(config: &ReviewConfig) -> Result<Arc<dyn CompletionBackend>, ReviewError> {
    // 1) User-provided backend takes priority
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }

    // 2) Provider name + model
    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or("gpt-4o");
        return create_backend(name, model, config);
    }

    // 3) Environment pair
    if let (Ok(prov), Ok(model)) = (
        std::env::var("MREVIEW_LLM_PROVIDER"),
        std::env::var("MREVIEW_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_backend(&prov, &model, config);
        }
    }

    // 4) Prefer OpenAI explicitly when an OpenAI API key is present, so users
    // with multiple provider keys default to OpenAI unless they ask otherwise.
    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or("gpt-4o");
            return create_backend("openai", model, config);
        }
    }

    let (provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| ReviewError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(Arc::new(EdgequakeBackend::new(
        provider,
        config.temperature,
        config.max_tokens,
    )))
}
