//! OpenAI Chat Completions adapter with structured outputs

use async_trait::async_trait;
use reqwest::Client;
use review_labeler_domain::{
    ChatTurn, LanguageModel, ModelError, ModelReply, ResponseSchema, StructuredRequest,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{LlmConfig, http_client, transport_error};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat model that answers with a declared JSON schema
pub struct OpenAiModel {
    client: Client,
    api_key: SecretString,
    base_url: String,
    config: LlmConfig,
}

impl OpenAiModel {
    pub fn new(api_key: SecretString, config: LlmConfig) -> Result<Self, ModelError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string(), config)
    }

    pub fn with_base_url(
        api_key: SecretString,
        base_url: String,
        config: LlmConfig,
    ) -> Result<Self, ModelError> {
        let client = http_client(&config)?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        })
    }

    fn build_request<'a>(&'a self, request: &'a StructuredRequest) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.config.model,
            messages: &request.turns,
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_output_tokens),
            response_format: ResponseFormat {
                r#type: "json_schema",
                json_schema: &request.schema,
            },
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    r#type: &'static str,
    json_schema: &'a ResponseSchema,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    async fn complete(&self, request: &StructuredRequest) -> Result<ModelReply, ModelError> {
        let body = self.build_request(request);
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(
            model = %self.config.model,
            turns = request.turns.len(),
            "Calling OpenAI chat completions"
        );

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == 429 {
            return Err(ModelError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidFormat(e.to_string()))?;

        let message = api_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| ModelError::InvalidFormat("No choices in response".to_string()))?;

        if let Some(refusal) = message.refusal.filter(|r| !r.trim().is_empty()) {
            tracing::warn!(refusal = %refusal, "Model refused");
            return Ok(ModelReply::Refusal(refusal));
        }

        match message.content {
            Some(text) if !text.trim().is_empty() => Ok(ModelReply::Content(text)),
            _ => Err(ModelError::InvalidFormat("Empty response".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_labeler_domain::LabelResult;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_request() -> StructuredRequest {
        StructuredRequest {
            turns: vec![
                ChatTurn::system("Return JSON only."),
                ChatTurn::user("Review: Pure identity politics. Not cinema."),
            ],
            schema: LabelResult::response_schema(),
        }
    }

    fn model_for(server: &MockServer) -> OpenAiModel {
        OpenAiModel::with_base_url(
            SecretString::new("test-key".into()),
            server.uri(),
            LlmConfig::default(),
        )
        .unwrap()
    }

    fn message_response(message: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                {"index": 0, "message": message, "finish_reason": "stop"}
            ]
        })
    }

    #[tokio::test]
    async fn test_complete_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "Return JSON only."},
                    {"role": "user", "content": "Review: Pure identity politics. Not cinema."}
                ],
                "response_format": {
                    "type": "json_schema",
                    "json_schema": {"name": "political_label", "strict": true}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_response(
                serde_json::json!({
                    "role": "assistant",
                    "content": r#"{"is_political":1,"reasoning":"Identity politics framing."}"#,
                    "refusal": null
                }),
            )))
            .mount(&mock_server)
            .await;

        let reply = model_for(&mock_server)
            .complete(&sample_request())
            .await
            .unwrap();

        assert_eq!(
            reply,
            ModelReply::Content(
                r#"{"is_political":1,"reasoning":"Identity politics framing."}"#.to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_complete_refusal() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_response(
                serde_json::json!({
                    "role": "assistant",
                    "content": null,
                    "refusal": "I'm sorry, I can't assist with that."
                }),
            )))
            .mount(&mock_server)
            .await;

        let reply = model_for(&mock_server)
            .complete(&sample_request())
            .await
            .unwrap();

        assert_eq!(
            reply,
            ModelReply::Refusal("I'm sorry, I can't assist with that.".to_string())
        );
    }

    #[tokio::test]
    async fn test_complete_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = model_for(&mock_server).complete(&sample_request()).await;

        assert!(matches!(result, Err(ModelError::RateLimited)));
    }

    #[tokio::test]
    async fn test_complete_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal error"))
            .mount(&mock_server)
            .await;

        let result = model_for(&mock_server).complete(&sample_request()).await;

        assert!(matches!(result, Err(ModelError::Api(msg)) if msg.contains("Internal error")));
    }

    #[tokio::test]
    async fn test_complete_empty_content() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_response(
                serde_json::json!({"role": "assistant", "content": ""}),
            )))
            .mount(&mock_server)
            .await;

        let result = model_for(&mock_server).complete(&sample_request()).await;

        assert!(matches!(result, Err(ModelError::InvalidFormat(_))));
    }
}
