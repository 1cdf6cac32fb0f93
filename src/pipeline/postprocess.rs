//! Post-processing: opt-in cleanup of model-generated review text.
//!
//! Models occasionally wrap a whole answer in markdown fences, emit
//! Windows line endings, or pad the text with runs of blank lines. These
//! rules fix those structural quirks with cheap string/regex rules instead
//! of prompt rules — the prompt stays focused on *what to review*, the
//! cleanup stays independently testable.
//!
//! By default section text is returned exactly as the model produced it,
//! trimmed of surrounding whitespace only; these rules run solely when
//! [`crate::config::ReviewConfig::clean_output`] is enabled. No re-wording,
//! no truncation either way.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to raw model output.
///
/// Rules (applied in order):
/// 1. Strip an outer markdown fence wrapping the entire answer
/// 2. Normalise line endings (CRLF → LF)
/// 3. Collapse 3+ consecutive blank lines down to 2
/// 4. Trim leading/trailing whitespace
pub fn clean_review(input: &str) -> String {
    let s = strip_outer_fences(input);
    let s = normalise_line_endings(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:markdown|text)?\n(.*)\n```\s*$").unwrap());

fn strip_outer_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_only_trimmed() {
        assert_eq!(clean_review("  A fine paper.  \n"), "A fine paper.");
    }

    #[test]
    fn outer_fences_are_stripped() {
        let input = "```markdown\nThe method is sound.\n```";
        assert_eq!(clean_review(input), "The method is sound.");
    }

    #[test]
    fn inner_fences_are_preserved() {
        let input = "Strengths:\n```python\nx = 1\n```\nWeaknesses: none.";
        assert_eq!(clean_review(input), input);
    }

    #[test]
    fn crlf_normalised_and_blanks_collapsed() {
        let input = "a\r\n\r\n\r\n\r\n\r\nb";
        assert_eq!(clean_review(input), "a\n\n\nb");
    }
}
