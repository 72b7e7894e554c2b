//! Anthropic messages API generator
//!
//! Speaks the messages-style generation API: a single user turn goes in, the
//! first text content block of the response comes out. `max_tokens` is
//! required on the wire, so the client carries an operator default;
//! `temperature` is serialized only when a call explicitly sets it, leaving
//! the model's own default in force otherwise.

use crate::GeneratorError;
use async_trait::async_trait;
use gangway_domain::{GenerationParams, TextGenerator};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";

/// API version header value
pub const API_VERSION: &str = "2023-06-01";

/// Default cap on generated tokens
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Default timeout for generation requests (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Messages-API text generator
pub struct AnthropicGenerator {
    endpoint: String,
    api_key: String,
    model: String,
    default_max_tokens: u32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    block_type: String,
    #[serde(default)]
    text: String,
}

impl AnthropicGenerator {
    /// Create a generator for one model
    ///
    /// # Parameters
    ///
    /// - `api_key`: API key sent in the `x-api-key` header
    /// - `model`: model identifier (e.g. "claude-3-5-sonnet-20240620")
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("default reqwest client");

        let generator = Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            default_max_tokens: DEFAULT_MAX_TOKENS,
            client,
        };
        info!(model = %generator.model, "generator client initialized");
        generator
    }

    /// Point the client at a different endpoint (proxies, test servers)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the operator default for `max_tokens`
    pub fn with_default_max_tokens(mut self, max_tokens: u32) -> Self {
        self.default_max_tokens = max_tokens;
        self
    }

    /// The model this generator is bound to
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    type Error = GeneratorError;

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, Self::Error> {
        let url = format!("{}/v1/messages", self.endpoint.trim_end_matches('/'));

        // Call-scoped overrides; nothing on `self` changes. `temperature`
        // stays off the wire unless explicitly set.
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: params.max_tokens.unwrap_or(self.default_max_tokens),
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature,
        };

        debug!(
            model = %self.model,
            max_tokens = body.max_tokens,
            temperature = ?body.temperature,
            prompt_chars = prompt.len(),
            "invoking model"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeneratorError::Communication(format!("Request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(GeneratorError::ModelNotAvailable(self.model.clone()));
        }
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GeneratorError::Communication(format!(
                "HTTP {status}: {error_text}"
            )));
        }

        let envelope: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let text = envelope
            .content
            .iter()
            .find(|block| block.block_type == "text")
            .map(|block| block.text.trim())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GeneratorError::EmptyCompletion);
        }

        debug!(model = %self.model, output_chars = text.len(), "generation complete");
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_creation() {
        let generator = AnthropicGenerator::new("key", "claude-3-5-sonnet-20240620");
        assert_eq!(generator.model(), "claude-3-5-sonnet-20240620");
        assert_eq!(generator.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(generator.default_max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_builder_overrides() {
        let generator = AnthropicGenerator::new("key", "model")
            .with_endpoint("http://localhost:8080")
            .with_default_max_tokens(2048);
        assert_eq!(generator.endpoint, "http://localhost:8080");
        assert_eq!(generator.default_max_tokens, 2048);
    }

    #[test]
    fn test_unset_temperature_stays_off_the_wire() {
        let body = MessagesRequest {
            model: "m",
            max_tokens: 4000,
            messages: vec![Message {
                role: "user",
                content: "p",
            }],
            temperature: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("temperature"));

        let body = MessagesRequest {
            temperature: Some(0.0),
            ..body
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"temperature\":0.0"));
    }

    #[test]
    fn test_first_text_block_selected() {
        let raw = r#"{
            "content": [
                {"type": "thinking", "text": ""},
                {"type": "text", "text": "  {\"a\": 1}  "},
                {"type": "text", "text": "second block"}
            ]
        }"#;
        let envelope: MessagesResponse = serde_json::from_str(raw).unwrap();
        let text = envelope
            .content
            .iter()
            .find(|block| block.block_type == "text")
            .map(|block| block.text.trim())
            .unwrap_or_default();
        assert_eq!(text, "{\"a\": 1}");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_communication_error() {
        let generator =
            AnthropicGenerator::new("key", "model").with_endpoint("http://127.0.0.1:1");

        let result = generator
            .generate("prompt", &GenerationParams::unset())
            .await;
        assert!(matches!(result, Err(GeneratorError::Communication(_))));
    }
}
