//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{ModelReply, OutputRecord, ReviewRecord, StructuredRequest};

/// Error type for model boundary operations
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("LLM API error: {0}")]
    Api(String),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Timeout")]
    Timeout,
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Port for a chat model that answers with a declared structured schema
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send one conversation and wait for the structured reply or a refusal
    async fn complete(&self, request: &StructuredRequest) -> Result<ModelReply, ModelError>;
}

/// Error type for review and result storage
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error in {path}: {message}")]
    Csv { path: String, message: String },
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Port for the input review table
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Whether the store already holds data
    async fn has_data(&self) -> Result<bool, StoreError>;

    /// Load all review records, in row order
    async fn load(&self) -> Result<Vec<ReviewRecord>, StoreError>;

    /// Replace the stored reviews
    async fn save(&self, records: &[ReviewRecord]) -> Result<(), StoreError>;
}

/// Port for the labeled output table
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Overwrite the sink with the given records
    async fn write(&self, records: &[OutputRecord]) -> Result<(), StoreError>;
}

/// Check loaded review records for duplicate or non-positive ids
pub fn validate_reviews(records: &[ReviewRecord]) -> Result<(), StoreError> {
    let mut seen = std::collections::HashSet::new();
    for record in records {
        if record.review_id == 0 {
            return Err(StoreError::Validation(
                "review_id must be positive, got 0".to_string(),
            ));
        }
        if !seen.insert(record.review_id) {
            return Err(StoreError::Validation(format!(
                "duplicate review_id {}",
                record.review_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PoliticalFlag;

    fn record(id: u64) -> ReviewRecord {
        ReviewRecord {
            review_id: id,
            review_text: "Fine movie.".to_string(),
            true_is_political: PoliticalFlag::NonPolitical,
        }
    }

    #[test]
    fn test_validate_accepts_unique_ids() {
        assert!(validate_reviews(&[record(1), record(2), record(3)]).is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let result = validate_reviews(&[record(1), record(2), record(1)]);
        assert!(matches!(result, Err(StoreError::Validation(msg)) if msg.contains("duplicate")));
    }

    #[test]
    fn test_validate_rejects_zero_id() {
        assert!(validate_reviews(&[record(0)]).is_err());
    }
}
