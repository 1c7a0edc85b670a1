//! Length constraints for model-written reasoning

use regex::Regex;
use std::sync::LazyLock;

use crate::model::LabelResult;

static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("Valid regex"));

/// Count words as maximal runs of word characters.
///
/// This is not the same as whitespace splitting: `well-known` counts as two
/// words here but is a single whitespace token.
pub fn word_count(text: &str) -> usize {
    WORD_PATTERN.find_iter(text).count()
}

/// Keep the first `max_words` whitespace-separated tokens, joined by single spaces
pub fn truncate_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hard guard on reasoning length
#[derive(Debug, Clone, Copy)]
pub struct WordLimitPolicy {
    max_words: usize,
}

impl WordLimitPolicy {
    pub fn new(max_words: usize) -> Self {
        Self { max_words }
    }

    /// Truncate the reasoning if it is over the limit; the label is left as is
    pub fn apply(&self, result: LabelResult) -> LabelResult {
        let words = word_count(&result.reasoning);
        if words <= self.max_words {
            return result;
        }

        let reasoning = truncate_words(&result.reasoning, self.max_words);
        let remaining = word_count(&reasoning);

        tracing::debug!(
            before = words,
            after = remaining,
            max_words = self.max_words,
            "Truncated reasoning"
        );

        // Whitespace truncation can still leave more regex words than allowed
        if remaining > self.max_words {
            tracing::warn!(
                words = remaining,
                max_words = self.max_words,
                "Reasoning still over limit after truncation"
            );
        }

        LabelResult {
            is_political: result.is_political,
            reasoning,
        }
    }
}
