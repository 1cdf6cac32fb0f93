//! Prompt templates for the five review sections.
//!
//! Centralising every template here serves two purposes:
//!
//! 1. **Single source of truth** — changing the default behaviour of a
//!    section (e.g. asking the Soundness reviewer to weigh statistics more
//!    heavily) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can render and inspect templates directly
//!    without spinning up a real LLM, making prompt regressions easy to catch.
//!
//! Deployments can override the built-ins by pointing
//! [`crate::config::ReviewConfig::template_dir`] at a directory holding the
//! five template files; a missing file there is a startup-fatal condition,
//! not a per-request one.

use crate::error::ReviewError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The five review sections, in assembly order.
///
/// `Novelty`, `Significance` and `Soundness` are the criteria sections;
/// `Section` is the whole-document section-by-section critique and
/// `Overall` the closing summary review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    Novelty,
    Significance,
    Soundness,
    Section,
    Overall,
}

impl SectionKind {
    /// All five kinds, in assembly order.
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Novelty,
        SectionKind::Significance,
        SectionKind::Soundness,
        SectionKind::Section,
        SectionKind::Overall,
    ];

    /// The three criteria kinds, grouped under `reviews` in the response.
    pub const CRITERIA: [SectionKind; 3] = [
        SectionKind::Novelty,
        SectionKind::Significance,
        SectionKind::Soundness,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::Novelty => "Novelty",
            SectionKind::Significance => "Significance",
            SectionKind::Soundness => "Soundness",
            SectionKind::Section => "Section",
            SectionKind::Overall => "Overall",
        }
    }

    /// The template file name inside a template directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            SectionKind::Novelty => "Novelty.txt",
            SectionKind::Significance => "Significance.txt",
            SectionKind::Soundness => "Soundness.txt",
            SectionKind::Section => "Section.txt",
            SectionKind::Overall => "overall_review.txt",
        }
    }

    /// The deterministic text substituted when this section's LLM call fails.
    pub fn placeholder(&self) -> String {
        format!("Failed to generate {} review.", self.name())
    }

    /// Parse a section name (case-sensitive, matching [`Self::name`]).
    pub fn from_name(name: &str) -> Result<Self, ReviewError> {
        SectionKind::ALL
            .into_iter()
            .find(|k| k.name() == name)
            .ok_or_else(|| ReviewError::UnknownTemplate {
                name: name.to_string(),
            })
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named static prompt string with `{title}` and `{content}` slots.
#[derive(Debug, Clone)]
pub struct Template {
    kind: SectionKind,
    text: String,
}

impl Template {
    pub fn new(kind: SectionKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    /// The raw template text, placeholders unsubstituted.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Substitute `{title}` and `{content}` into the template.
    ///
    /// A template is free to use only one of the slots (the Overall template
    /// historically ignores `{title}`); unknown braces are left untouched.
    pub fn render(&self, title: &str, content: &str) -> String {
        self.text
            .replace("{title}", title)
            .replace("{content}", content)
    }
}

/// Immutable store holding the five templates, loaded once at startup.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    // Indexed by SectionKind::ALL position.
    templates: [Template; 5],
}

impl TemplateStore {
    /// The compiled-in default templates.
    pub fn builtin() -> Self {
        Self {
            templates: [
                Template::new(SectionKind::Novelty, DEFAULT_NOVELTY),
                Template::new(SectionKind::Significance, DEFAULT_SIGNIFICANCE),
                Template::new(SectionKind::Soundness, DEFAULT_SOUNDNESS),
                Template::new(SectionKind::Section, DEFAULT_SECTION),
                Template::new(SectionKind::Overall, DEFAULT_OVERALL),
            ],
        }
    }

    /// Load all five templates from `dir`.
    ///
    /// Any missing or unreadable file fails with
    /// [`ReviewError::TemplateMissing`] — deployments must ship the full set.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ReviewError> {
        let dir = dir.as_ref();
        let mut loaded = Vec::with_capacity(5);
        for kind in SectionKind::ALL {
            let path = dir.join(kind.file_name());
            let text =
                std::fs::read_to_string(&path).map_err(|_| ReviewError::TemplateMissing {
                    name: kind.name().to_string(),
                    path: path.clone(),
                })?;
            loaded.push(Template::new(kind, text));
        }
        let templates: [Template; 5] = loaded
            .try_into()
            .map_err(|_| ReviewError::Internal("template count mismatch".into()))?;
        Ok(Self { templates })
    }

    /// Get the template for a section. Infallible: the store always holds
    /// all five.
    pub fn get(&self, kind: SectionKind) -> &Template {
        let idx = SectionKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(0);
        &self.templates[idx]
    }

    /// Look up a template by section name, for callers holding a string.
    pub fn by_name(&self, name: &str) -> Result<&Template, ReviewError> {
        Ok(self.get(SectionKind::from_name(name)?))
    }

    /// Render the template for `kind` with the given title and content.
    pub fn render(&self, kind: SectionKind, title: &str, content: &str) -> String {
        self.get(kind).render(title, content)
    }
}

// ── Built-in default templates ───────────────────────────────────────────
//
// These mirror the shape of the external template files: one prompt per
// section, each with {title} and {content} slots. The exact wording is an
// editorial resource, not an API contract; deployments are expected to
// tune it via --templates.

const DEFAULT_NOVELTY: &str = r#"You are an expert reviewer for an academic venue. Assess the NOVELTY of the following manuscript.

Title: {title}

Consider: what is new relative to prior work, whether the contribution is incremental or substantive, and whether related work is adequately positioned. Be specific and cite passages from the manuscript where possible.

Manuscript:
{content}"#;

const DEFAULT_SIGNIFICANCE: &str = r#"You are an expert reviewer for an academic venue. Assess the SIGNIFICANCE of the following manuscript.

Title: {title}

Consider: the importance of the problem, the potential impact of the results on the field, and who would benefit from this work. Be specific and cite passages from the manuscript where possible.

Manuscript:
{content}"#;

const DEFAULT_SOUNDNESS: &str = r#"You are an expert reviewer for an academic venue. Assess the SOUNDNESS of the following manuscript.

Title: {title}

Consider: whether the methodology supports the claims, the rigour of the experiments or proofs, statistical validity, and reproducibility. Point out any unsupported claims. Be specific and cite passages from the manuscript where possible.

Manuscript:
{content}"#;

const DEFAULT_SECTION: &str = r#"You are an expert reviewer for an academic venue. Analyze the following manuscript section by section.

Title: {title}

For each section of the manuscript (abstract, introduction, methods, results, discussion, conclusion — as applicable), give a short critique: what works, what is unclear, and what should be improved.

Manuscript:
{content}"#;

const DEFAULT_OVERALL: &str = r#"You are an expert reviewer for an academic venue. Provide an overall review of the following manuscript.

Title: {title}

Summarise the contribution, state the main strengths and weaknesses, and close with a recommendation (accept, minor revision, major revision, or reject) with a one-paragraph justification.

Manuscript:
{content}"#;
