//! LLM provider adapters

pub mod ollama;
pub mod openai;
pub mod stub;

pub use ollama::OllamaModel;
pub use openai::OpenAiModel;
pub use stub::StubModel;

use review_labeler_domain::ModelError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Common LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// Temperature (0.0-1.0)
    pub temperature: f64,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_output_tokens: 300,
            timeout_secs: 45,
        }
    }
}

/// Build an HTTP client with the configured request timeout
fn http_client(config: &LlmConfig) -> Result<reqwest::Client, ModelError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| ModelError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Map a reqwest send error onto the model error taxonomy
fn transport_error(err: reqwest::Error) -> ModelError {
    if err.is_timeout() {
        ModelError::Timeout
    } else {
        ModelError::Api(err.to_string())
    }
}
