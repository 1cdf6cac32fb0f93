//! The review orchestrator: fan one manuscript out to five independent LLM
//! calls and assemble their results.
//!
//! ## Partial-failure policy
//!
//! Every section call is wrapped so its failure (transport error, quota,
//! timeout, malformed response) becomes a value inside
//! [`SectionReview::result`] — never an `Err` from [`review`]. The
//! orchestrator therefore always returns the complete five-section shape,
//! even when the LLM backend is fully unavailable; failed sections surface
//! as their documented placeholder at response assembly.
//!
//! ## Concurrency
//!
//! The five calls have no data dependency on each other, so they are issued
//! concurrently (bounded by `config.concurrency`, default full fan-out) and
//! joined before assembly. Total latency is roughly the slowest single call
//! rather than the sum of all five. No ordering guarantee exists between
//! calls; sections are sorted into assembly order afterwards.

use crate::backend::CompletionBackend;
use crate::config::ReviewConfig;
use crate::error::SectionError;
use crate::output::{ReviewOutput, ReviewStats, SectionReview};
use crate::pipeline::extract::NormalizedContent;
use crate::pipeline::postprocess;
use crate::templates::{SectionKind, TemplateStore};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Generate the structured multi-section review for one manuscript.
///
/// `title` fills the `{title}` template slot; `content` is the normalized
/// evaluation context shared by all five calls. Infallible by design — see
/// the module docs for the partial-failure policy.
pub async fn review(
    title: &str,
    content: &NormalizedContent,
    templates: &TemplateStore,
    backend: &Arc<dyn CompletionBackend>,
    config: &ReviewConfig,
) -> ReviewOutput {
    let llm_start = Instant::now();
    info!(
        sections = SectionKind::ALL.len(),
        content_chars = content.text.chars().count(),
        truncated = content.truncated,
        "starting review fan-out"
    );

    let mut sections: Vec<SectionReview> =
        stream::iter(SectionKind::ALL.into_iter().map(|kind| {
            let prompt = templates.render(kind, title, &content.text);
            let backend = Arc::clone(backend);
            let timeout_secs = config.api_timeout_secs;
            let clean_output = config.clean_output;
            async move { review_section(kind, &prompt, &backend, timeout_secs, clean_output).await }
        }))
        .buffer_unordered(config.concurrency)
        .collect()
        .await;

    // buffer_unordered yields in completion order; restore assembly order.
    sections.sort_by_key(|s| s.kind);

    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;
    let failed = sections.iter().filter(|s| s.failed()).count();
    if failed > 0 {
        warn!(failed, total = sections.len(), "some sections failed");
    }
    info!(
        failed,
        total = sections.len(),
        llm_duration_ms,
        "review fan-out complete"
    );

    let stats = ReviewStats {
        total_sections: sections.len(),
        failed_sections: failed,
        content_chars: content.text.chars().count(),
        truncated: content.truncated,
        total_input_tokens: sections.iter().map(|s| s.input_tokens as u64).sum(),
        total_output_tokens: sections.iter().map(|s| s.output_tokens as u64).sum(),
        total_duration_ms: llm_duration_ms,
        extract_duration_ms: 0,
        llm_duration_ms,
    };

    ReviewOutput { sections, stats }
}

/// Issue one section's completion call, bounded by the API timeout.
///
/// Always returns a `SectionReview` — the error, if any, travels inside it.
/// Section text is the model's output trimmed of surrounding whitespace;
/// the heavier cleanup rules only apply when `clean_output` is set.
async fn review_section(
    kind: SectionKind,
    prompt: &str,
    backend: &Arc<dyn CompletionBackend>,
    timeout_secs: u64,
    clean_output: bool,
) -> SectionReview {
    let start = Instant::now();
    debug!(section = %kind, prompt_chars = prompt.len(), "issuing completion");

    let outcome = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        backend.complete(prompt),
    )
    .await;

    let duration_ms = start.elapsed().as_millis() as u64;
    match outcome {
        Ok(Ok(completion)) => {
            debug!(section = %kind, duration_ms, "section generated");
            let text = if clean_output {
                postprocess::clean_review(&completion.text)
            } else {
                completion.text.trim().to_string()
            };
            SectionReview {
                kind,
                result: Ok(text),
                input_tokens: completion.input_tokens,
                output_tokens: completion.output_tokens,
                duration_ms,
            }
        }
        Ok(Err(e)) => {
            warn!(section = %kind, error = %e, "section call failed");
            SectionReview {
                kind,
                result: Err(SectionError::CallFailed {
                    section: kind.name().to_string(),
                    detail: e.message,
                }),
                input_tokens: 0,
                output_tokens: 0,
                duration_ms,
            }
        }
        Err(_) => {
            warn!(section = %kind, timeout_secs, "section call timed out");
            SectionReview {
                kind,
                result: Err(SectionError::Timeout {
                    section: kind.name().to_string(),
                    secs: timeout_secs,
                }),
                input_tokens: 0,
                output_tokens: 0,
                duration_ms,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{EchoBackend, FailingBackend, SelectiveBackend};
    use crate::backend::{Completion, CompletionBackend};
    use crate::error::LlmCallError;
    use async_trait::async_trait;
    use std::sync::atomic::Ordering;

    fn content(text: &str) -> NormalizedContent {
        NormalizedContent {
            text: text.to_string(),
            truncated: false,
        }
    }

    #[tokio::test]
    async fn all_sections_generated_once() {
        let echo = Arc::new(EchoBackend::new("a thorough review"));
        let backend: Arc<dyn CompletionBackend> = echo.clone();
        let config = ReviewConfig::default();
        let templates = TemplateStore::builtin();

        let output = review(
            "A Title",
            &content("Hello world."),
            &templates,
            &backend,
            &config,
        )
        .await;

        assert_eq!(output.sections.len(), 5);
        assert_eq!(output.stats.failed_sections, 0);
        assert_eq!(echo.calls.load(Ordering::SeqCst), 5);
        for section in &output.sections {
            assert_eq!(section.result.as_deref().unwrap(), "a thorough review");
        }
        // Sections come back in assembly order regardless of completion order.
        let kinds: Vec<_> = output.sections.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, SectionKind::ALL.to_vec());
    }

    #[tokio::test]
    async fn total_backend_outage_yields_placeholders_not_errors() {
        let backend: Arc<dyn CompletionBackend> = Arc::new(FailingBackend);
        let config = ReviewConfig::default();
        let templates = TemplateStore::builtin();

        let output = review("T", &content("body"), &templates, &backend, &config).await;

        assert_eq!(output.stats.failed_sections, 5);
        let resp = output.to_response();
        for kind in SectionKind::CRITERIA {
            assert_eq!(resp.reviews[kind.name()], kind.placeholder());
        }
        assert_eq!(resp.section, SectionKind::Section.placeholder());
        assert_eq!(resp.overall, SectionKind::Overall.placeholder());
    }

    #[tokio::test]
    async fn partial_outage_only_hits_its_section() {
        // The Soundness prompt is the only one containing "SOUNDNESS".
        let backend: Arc<dyn CompletionBackend> = Arc::new(SelectiveBackend {
            fail_marker: "SOUNDNESS".to_string(),
        });
        let config = ReviewConfig::default();
        let templates = TemplateStore::builtin();

        let output = review("T", &content("body"), &templates, &backend, &config).await;

        assert_eq!(output.stats.failed_sections, 1);
        let resp = output.to_response();
        assert_eq!(
            resp.reviews["Soundness"],
            "Failed to generate Soundness review."
        );
        assert!(resp.reviews["Novelty"].starts_with("ok:"));
        assert!(resp.overall.starts_with("ok:"));
    }

    #[tokio::test]
    async fn slow_backend_times_out_into_placeholder() {
        struct StallingBackend;

        #[async_trait]
        impl CompletionBackend for StallingBackend {
            async fn complete(&self, _prompt: &str) -> Result<Completion, LlmCallError> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                unreachable!("the call must be timed out first")
            }
        }

        let backend: Arc<dyn CompletionBackend> = Arc::new(StallingBackend);
        let config = ReviewConfig::builder().api_timeout_secs(1).build().unwrap();
        let templates = TemplateStore::builtin();

        // Paused virtual time auto-advances when every task is waiting on a
        // timer, so the 1s timeouts fire without a real 1s wait.
        tokio::time::pause();
        let output = review("T", &content("body"), &templates, &backend, &config).await;

        assert_eq!(output.stats.failed_sections, 5);
        for section in &output.sections {
            assert!(matches!(
                section.result,
                Err(SectionError::Timeout { secs: 1, .. })
            ));
        }
    }

    #[tokio::test]
    async fn output_is_returned_verbatim_except_trimming() {
        // Fences and blank-line runs belong to the model's answer; only
        // surrounding whitespace goes.
        let fenced = "```markdown\nA review.\n```";
        let spaced = "First point.\n\n\n\n\nSecond point.";
        for reply in [fenced, spaced] {
            let backend: Arc<dyn CompletionBackend> =
                Arc::new(EchoBackend::new(format!("  {reply}\n")));
            let config = ReviewConfig::default();
            let templates = TemplateStore::builtin();

            let output = review("T", &content("body"), &templates, &backend, &config).await;
            for section in &output.sections {
                assert_eq!(section.result.as_deref().unwrap(), reply);
            }
        }
    }

    #[tokio::test]
    async fn opt_in_cleanup_strips_outer_fences() {
        let backend: Arc<dyn CompletionBackend> =
            Arc::new(EchoBackend::new("```markdown\nTrimmed review.\n```"));
        let config = ReviewConfig::builder().clean_output(true).build().unwrap();
        let templates = TemplateStore::builtin();

        let output = review("T", &content("body"), &templates, &backend, &config).await;
        for section in &output.sections {
            assert_eq!(section.result.as_deref().unwrap(), "Trimmed review.");
        }
    }
}
