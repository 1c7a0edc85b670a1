//! Stub model for testing and offline mode

use async_trait::async_trait;
use review_labeler_domain::usecases::prompt::REVIEW_MARKER;
#[cfg(test)]
use review_labeler_domain::LabelResult;
use review_labeler_domain::{
    LanguageModel, ModelError, ModelReply, PoliticalFlag, StructuredRequest,
};

/// Terms that make the keyword stub answer "political"
const POLITICAL_KEYWORDS: &[&str] = &[
    "woke",
    "sjw",
    "propaganda",
    "left/right",
    "culture-war",
    "identity politics",
    "party politics",
    "partisan",
    "agenda",
    "ideology",
];

enum StubMode {
    Keywords,
    Reply(ModelReply),
    #[cfg(test)]
    Error(ModelError),
}

/// Stub model that returns configurable replies
pub struct StubModel {
    mode: StubMode,
}

impl StubModel {
    /// Label by keyword matching; rewrite requests echo the prior answer
    pub fn keywords() -> Self {
        Self {
            mode: StubMode::Keywords,
        }
    }

    /// Always answer with the given label
    #[cfg(test)]
    pub fn with_result(result: &LabelResult) -> Self {
        let json = serde_json::json!({
            "is_political": result.is_political.as_u8(),
            "reasoning": result.reasoning,
        });
        Self {
            mode: StubMode::Reply(ModelReply::Content(json.to_string())),
        }
    }

    /// Always refuse with the given message
    pub fn refusing(reason: impl Into<String>) -> Self {
        Self {
            mode: StubMode::Reply(ModelReply::Refusal(reason.into())),
        }
    }

    /// Always fail at the transport level
    #[cfg(test)]
    pub fn with_error(error: ModelError) -> Self {
        Self {
            mode: StubMode::Error(error),
        }
    }

    fn keyword_reply(request: &StructuredRequest) -> ModelReply {
        if let Some(prior) = request.last_assistant_content() {
            return ModelReply::Content(prior.to_string());
        }

        let prompt = request.last_user_content().unwrap_or_default();
        let review = prompt
            .rfind(REVIEW_MARKER)
            .map(|idx| &prompt[idx + REVIEW_MARKER.len()..])
            .unwrap_or(prompt);
        let lower = review.to_lowercase();

        let hit = POLITICAL_KEYWORDS.iter().find(|kw| lower.contains(*kw));
        let reasoning = match hit {
            Some(kw) => format!("Stub: keyword '{}' signals political framing", kw),
            None => "Stub: no political keywords detected".to_string(),
        };

        let json = serde_json::json!({
            "is_political": PoliticalFlag::from(hit.is_some()).as_u8(),
            "reasoning": reasoning,
        });
        ModelReply::Content(json.to_string())
    }
}

impl Default for StubModel {
    fn default() -> Self {
        Self::keywords()
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn complete(&self, request: &StructuredRequest) -> Result<ModelReply, ModelError> {
        match &self.mode {
            StubMode::Keywords => Ok(Self::keyword_reply(request)),
            StubMode::Reply(reply) => Ok(reply.clone()),
            #[cfg(test)]
            StubMode::Error(error) => Err(error.clone()),
        }
    }
}
