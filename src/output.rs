//! Output types: per-section results, run statistics, and the assembled
//! review.
//!
//! [`SectionReview`] carries an explicit `Result` per section, making the
//! "an LLM failure never fails the request" policy visible in the type.
//! [`ReviewOutput::to_response`] is where failures become their documented
//! placeholder strings — the only place that substitution happens.

use crate::error::SectionError;
use crate::templates::SectionKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The outcome of one section's LLM call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionReview {
    pub kind: SectionKind,
    /// Generated text (whitespace-trimmed) or the failure that will be
    /// placeholdered at assembly.
    pub result: Result<String, SectionError>,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
}

impl SectionReview {
    pub fn failed(&self) -> bool {
        self.result.is_err()
    }

    /// The section text as it appears in the response: the generated text,
    /// or the documented placeholder on failure.
    pub fn response_text(&self) -> String {
        match &self.result {
            Ok(text) => text.clone(),
            Err(_) => self.kind.placeholder(),
        }
    }
}

/// Statistics for a whole review run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewStats {
    pub total_sections: usize,
    pub failed_sections: usize,
    /// Characters of normalized content submitted per call.
    pub content_chars: usize,
    /// True when the content cap was hit and the truncation marker appended.
    pub truncated: bool,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_duration_ms: u64,
    pub extract_duration_ms: u64,
    pub llm_duration_ms: u64,
}

/// The full result of one review run: five sections plus statistics.
///
/// Constructed per request and discarded after the response; there is no
/// further lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewOutput {
    pub sections: Vec<SectionReview>,
    pub stats: ReviewStats,
}

impl ReviewOutput {
    fn section(&self, kind: SectionKind) -> Option<&SectionReview> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Assemble the wire-shape response.
    ///
    /// Always produces the complete five-key shape: the three criteria under
    /// `reviews`, plus `section` and `overall`. Failed sections carry their
    /// placeholder text rather than being omitted.
    pub fn to_response(&self) -> ReviewResponse {
        let mut reviews = BTreeMap::new();
        for kind in SectionKind::CRITERIA {
            let text = self
                .section(kind)
                .map(|s| s.response_text())
                .unwrap_or_else(|| kind.placeholder());
            reviews.insert(kind.name().to_string(), text);
        }

        let section = self
            .section(SectionKind::Section)
            .map(|s| s.response_text())
            .unwrap_or_else(|| SectionKind::Section.placeholder());
        let overall = self
            .section(SectionKind::Overall)
            .map(|s| s.response_text())
            .unwrap_or_else(|| SectionKind::Overall.placeholder());

        ReviewResponse {
            reviews,
            section,
            overall,
        }
    }
}

/// The serialized record returned to ingress callers:
/// `{ "reviews": {Novelty, Significance, Soundness}, "section": …, "overall": … }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub reviews: BTreeMap<String, String>,
    pub section: String,
    pub overall: String,
}

/// The result of the upload operation: the cached artifact's PDF form,
/// streamed back to the caller.
#[derive(Debug, Clone)]
pub struct UploadOutput {
    pub filename: String,
    pub pdf: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_section(kind: SectionKind, text: &str) -> SectionReview {
        SectionReview {
            kind,
            result: Ok(text.to_string()),
            input_tokens: 1,
            output_tokens: 1,
            duration_ms: 1,
        }
    }

    fn failed_section(kind: SectionKind) -> SectionReview {
        SectionReview {
            kind,
            result: Err(SectionError::CallFailed {
                section: kind.name().to_string(),
                detail: "boom".to_string(),
            }),
            input_tokens: 0,
            output_tokens: 0,
            duration_ms: 1,
        }
    }

    fn stats() -> ReviewStats {
        ReviewStats {
            total_sections: 5,
            failed_sections: 0,
            content_chars: 10,
            truncated: false,
            total_input_tokens: 0,
            total_output_tokens: 0,
            total_duration_ms: 0,
            extract_duration_ms: 0,
            llm_duration_ms: 0,
        }
    }

    #[test]
    fn response_always_has_five_keys() {
        let output = ReviewOutput {
            sections: SectionKind::ALL.into_iter().map(failed_section).collect(),
            stats: stats(),
        };
        let resp = output.to_response();
        assert_eq!(resp.reviews.len(), 3);
        assert_eq!(
            resp.reviews["Novelty"],
            "Failed to generate Novelty review."
        );
        assert_eq!(resp.section, "Failed to generate Section review.");
        assert_eq!(resp.overall, "Failed to generate Overall review.");
    }

    #[test]
    fn mixed_outcome_keeps_successes_verbatim() {
        let output = ReviewOutput {
            sections: vec![
                ok_section(SectionKind::Novelty, "quite novel"),
                failed_section(SectionKind::Significance),
                ok_section(SectionKind::Soundness, "sound"),
                ok_section(SectionKind::Section, "per-section text"),
                failed_section(SectionKind::Overall),
            ],
            stats: stats(),
        };
        let resp = output.to_response();
        assert_eq!(resp.reviews["Novelty"], "quite novel");
        assert_eq!(
            resp.reviews["Significance"],
            "Failed to generate Significance review."
        );
        assert_eq!(resp.section, "per-section text");
        assert_eq!(resp.overall, "Failed to generate Overall review.");
    }

    #[test]
    fn response_serializes_with_expected_keys() {
        let output = ReviewOutput {
            sections: SectionKind::ALL
                .into_iter()
                .map(|k| ok_section(k, "text"))
                .collect(),
            stats: stats(),
        };
        let json = serde_json::to_value(output.to_response()).unwrap();
        assert!(json["reviews"]["Novelty"].is_string());
        assert!(json["reviews"]["Significance"].is_string());
        assert!(json["reviews"]["Soundness"].is_string());
        assert!(json["section"].is_string());
        assert!(json["overall"].is_string());
    }
}
