//! Two-pass labeling: classify, then bring the reasoning under a word limit

use std::sync::Arc;
use thiserror::Error;

use crate::{
    model::{ChatTurn, LabelResult, ModelReply, StructuredRequest},
    policy::WordLimitPolicy,
    ports::{LanguageModel, ModelError},
    usecases::prompt::{JSON_ONLY_INSTRUCTION, PromptBuilder, PromptConfig},
};

/// Errors from a labeling call
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("Model refused: {0}")]
    Refusal(String),
    #[error("Response does not match schema: {0}")]
    SchemaParse(String),
    #[error("Transport error: {0}")]
    Transport(#[from] ModelError),
}

/// Configuration for the labeler
#[derive(Debug, Clone, Default)]
pub struct LabelConfig {
    pub prompt: PromptConfig,
}

/// Labeling client over a language model port
pub struct Labeler<M: ?Sized> {
    model: Arc<M>,
    prompts: PromptBuilder,
}

impl<M: LanguageModel + ?Sized> Labeler<M> {
    pub fn new(model: Arc<M>, config: LabelConfig) -> Self {
        Self {
            model,
            prompts: PromptBuilder::new(config.prompt),
        }
    }

    /// First pass: ask the model for a label and a reasoning
    pub async fn label(&self, review_text: &str) -> Result<LabelResult, LabelError> {
        let request = StructuredRequest {
            turns: vec![
                ChatTurn::system(JSON_ONLY_INSTRUCTION),
                ChatTurn::user(self.prompts.build_prompt(review_text)),
            ],
            schema: LabelResult::response_schema(),
        };

        let reply = self.model.complete(&request).await?;
        parse_label_reply(reply)
    }

    /// Second pass: ask for a rewrite of the reasoning, then apply the hard guard
    pub async fn enforce_word_limit(
        &self,
        result: &LabelResult,
        max_words: usize,
    ) -> Result<LabelResult, LabelError> {
        let prior = serde_json::to_string(result)
            .map_err(|e| LabelError::SchemaParse(format!("Failed to serialize result: {}", e)))?;

        let request = StructuredRequest {
            turns: vec![
                ChatTurn::system(JSON_ONLY_INSTRUCTION),
                ChatTurn::assistant(prior),
                ChatTurn::user(self.prompts.build_rewrite_prompt(max_words)),
            ],
            schema: LabelResult::response_schema(),
        };

        let reply = self.model.complete(&request).await?;
        let rewritten = parse_label_reply(reply)?;

        if rewritten.is_political != result.is_political {
            tracing::warn!(
                before = %result.is_political,
                after = %rewritten.is_political,
                "Label changed during rewrite"
            );
        }

        Ok(WordLimitPolicy::new(max_words).apply(rewritten))
    }
}

/// Turn a model reply into a label, rejecting refusals and off-schema payloads
pub fn parse_label_reply(reply: ModelReply) -> Result<LabelResult, LabelError> {
    match reply {
        ModelReply::Refusal(reason) => Err(LabelError::Refusal(reason)),
        ModelReply::Content(text) => {
            let json_str = extract_json(&text);
            serde_json::from_str(json_str)
                .map_err(|e| LabelError::SchemaParse(format!("Failed to parse JSON: {}", e)))
        }
    }
}

/// Strip a markdown code fence wrapping the whole reply.
///
/// Backticks anywhere else, such as inside the `reasoning` string, are left alone.
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.strip_suffix("```").unwrap_or(rest);

    // Skip language identifier if present
    match body.find('\n') {
        Some(newline) if !body[..newline].trim_start().starts_with('{') => {
            body[newline + 1..].trim()
        }
        _ => body.trim(),
    }
}
