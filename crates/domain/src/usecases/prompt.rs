//! Prompt rendering for the two labeling passes

/// Rubric used when none is configured
pub const DEFAULT_RUBRIC: &str = "Label is_political=1 ONLY if the review explicitly uses political / ideology / culture-war framing \
(e.g., woke, SJW, propaganda, left/right, party politics, identity politics, agenda). \
If it's just 'preachy' or 'message' without explicit politics, label 0.";

/// System instruction sent with every call
pub const JSON_ONLY_INSTRUCTION: &str = "Return JSON only.";

/// Marker that precedes the review text in the first-pass prompt
pub const REVIEW_MARKER: &str = "Review: ";

/// Prompt settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptConfig {
    /// Labeling rubric
    pub rubric: String,
    /// Word target stated in the first-pass prompt (not enforced)
    pub soft_word_target: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            rubric: DEFAULT_RUBRIC.to_string(),
            soft_word_target: 50,
        }
    }
}

/// Renders prompts from a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    config: PromptConfig,
}

impl PromptBuilder {
    pub fn new(config: PromptConfig) -> Self {
        Self { config }
    }

    /// First-pass prompt: rubric, task, then the review text
    pub fn build_prompt(&self, review_text: &str) -> String {
        format!(
            "Rubric: {}\n\n\
             Task: Read the review and output JSON with fields {{is_political, reasoning}}.\n\
             - is_political must be 0 or 1\n\
             - reasoning should be <= {} words (soft)\n\n\
             {}{}",
            self.config.rubric, self.config.soft_word_target, REVIEW_MARKER, review_text
        )
    }

    /// Second-pass instruction asking for a shorter reasoning
    pub fn build_rewrite_prompt(&self, max_words: usize) -> String {
        format!(
            "Rewrite reasoning to <= {} words. Keep is_political unchanged. JSON only.",
            max_words
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_layout() {
        let prompt = PromptBuilder::default().build_prompt("Great visuals, mediocre script.");

        assert!(prompt.starts_with("Rubric: Label is_political=1 ONLY"));
        assert!(prompt.contains(
            "Task: Read the review and output JSON with fields {is_political, reasoning}.\n"
        ));
        assert!(prompt.contains("- is_political must be 0 or 1\n"));
        assert!(prompt.contains("- reasoning should be <= 50 words (soft)\n\n"));
        assert!(prompt.ends_with("Review: Great visuals, mediocre script."));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let builder = PromptBuilder::default();
        assert_eq!(builder.build_prompt("x"), builder.build_prompt("x"));
    }

    #[test]
    fn test_custom_rubric_and_target() {
        let builder = PromptBuilder::new(PromptConfig {
            rubric: "Custom rubric.".to_string(),
            soft_word_target: 20,
        });
        let prompt = builder.build_prompt("text");

        assert!(prompt.starts_with("Rubric: Custom rubric.\n\n"));
        assert!(prompt.contains("<= 20 words (soft)"));
    }

    #[test]
    fn test_rewrite_prompt() {
        assert_eq!(
            PromptBuilder::default().build_rewrite_prompt(25),
            "Rewrite reasoning to <= 25 words. Keep is_political unchanged. JSON only."
        );
    }
}
