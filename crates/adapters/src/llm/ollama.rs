//! Ollama local LLM adapter

use async_trait::async_trait;
use reqwest::Client;
use review_labeler_domain::{ChatTurn, LanguageModel, ModelError, ModelReply, StructuredRequest};
use serde::{Deserialize, Serialize};

use super::{LlmConfig, http_client, transport_error};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Ollama chat model constrained by a JSON schema `format`
pub struct OllamaModel {
    client: Client,
    base_url: String,
    config: LlmConfig,
}

impl OllamaModel {
    pub fn new(config: LlmConfig) -> Result<Self, ModelError> {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), config)
    }

    pub fn with_base_url(base_url: String, config: LlmConfig) -> Result<Self, ModelError> {
        let client = http_client(&config)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        })
    }
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    stream: bool,
    format: &'a serde_json::Value,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f64,
    num_predict: i64,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl LanguageModel for OllamaModel {
    async fn complete(&self, request: &StructuredRequest) -> Result<ModelReply, ModelError> {
        let body = OllamaChatRequest {
            model: &self.config.model,
            messages: &request.turns,
            stream: false,
            format: &request.schema.schema,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: i64::from(self.config.max_output_tokens),
            },
        };

        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let api_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidFormat(e.to_string()))?;

        if api_response.message.content.trim().is_empty() {
            return Err(ModelError::InvalidFormat("Empty response".to_string()));
        }

        Ok(ModelReply::Content(api_response.message.content))
    }
}
