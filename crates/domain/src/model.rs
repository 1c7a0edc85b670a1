//! Domain models and value objects

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Binary political/non-political label, stored as integer 0 or 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub enum PoliticalFlag {
    /// Label 0
    NonPolitical,
    /// Label 1
    Political,
}

impl PoliticalFlag {
    pub fn as_u8(self) -> u8 {
        match self {
            PoliticalFlag::NonPolitical => 0,
            PoliticalFlag::Political => 1,
        }
    }
}

impl From<PoliticalFlag> for u8 {
    fn from(flag: PoliticalFlag) -> Self {
        flag.as_u8()
    }
}

impl From<bool> for PoliticalFlag {
    fn from(value: bool) -> Self {
        if value {
            PoliticalFlag::Political
        } else {
            PoliticalFlag::NonPolitical
        }
    }
}

impl TryFrom<i64> for PoliticalFlag {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PoliticalFlag::NonPolitical),
            1 => Ok(PoliticalFlag::Political),
            other => Err(format!("label must be 0 or 1, got {}", other)),
        }
    }
}

impl std::fmt::Display for PoliticalFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// One input row: review text plus ground-truth label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Unique positive identifier
    pub review_id: u64,
    /// Review text
    pub review_text: String,
    /// Ground-truth label
    pub true_is_political: PoliticalFlag,
}

/// Structured judgment returned by the model for one call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelResult {
    /// Predicted label
    pub is_political: PoliticalFlag,
    /// Short justification
    pub reasoning: String,
}

impl LabelResult {
    pub const SCHEMA_NAME: &'static str = "political_label";

    /// JSON schema declared to the model for structured output
    pub fn response_schema() -> ResponseSchema {
        ResponseSchema {
            name: Self::SCHEMA_NAME.to_string(),
            strict: true,
            schema: json!({
                "type": "object",
                "properties": {
                    "is_political": {
                        "type": "integer",
                        "enum": [0, 1],
                        "description": "0 or 1"
                    },
                    "reasoning": {
                        "type": "string",
                        "description": "brief explanation"
                    }
                },
                "required": ["is_political", "reasoning"],
                "additionalProperties": false
            }),
        }
    }
}

/// A review record enriched with the model's prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub review_id: u64,
    pub review_text: String,
    pub true_is_political: PoliticalFlag,
    pub pred_is_political: PoliticalFlag,
    pub reasoning: String,
    /// Word count of `reasoning` as measured by the word-limit guard
    pub reasoning_words: usize,
}

impl OutputRecord {
    pub fn is_correct(&self) -> bool {
        self.true_is_political == self.pred_is_political
    }
}

/// Result of a batch run
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// One output per input record, in input order
    pub records: Vec<OutputRecord>,
    /// Fraction of correct predictions; `None` when the batch is empty
    pub accuracy: Option<f64>,
}

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a model conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Declared shape of the structured response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSchema {
    /// Schema name (some providers require one)
    pub name: String,
    /// Whether the provider should enforce the schema strictly
    pub strict: bool,
    /// JSON schema document
    pub schema: serde_json::Value,
}

/// Request sent across the model boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredRequest {
    /// Ordered conversation turns
    pub turns: Vec<ChatTurn>,
    /// Expected response shape
    pub schema: ResponseSchema,
}

impl StructuredRequest {
    /// Content of the last user turn, if any
    pub fn last_user_content(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .map(|t| t.content.as_str())
    }

    /// Content of the last assistant turn, if any
    pub fn last_assistant_content(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::Assistant)
            .map(|t| t.content.as_str())
    }
}

/// What the model boundary hands back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    /// Raw structured payload (JSON text)
    Content(String),
    /// The model declined to answer
    Refusal(String),
}
