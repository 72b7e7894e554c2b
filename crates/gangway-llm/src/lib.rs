//! Gangway Generator Layer
//!
//! Implementations of the `TextGenerator` trait from `gangway-domain`.
//!
//! # Providers
//!
//! - `MockGenerator`: deterministic mock for testing; records every call's
//!   prompt and sampling parameters
//! - `AnthropicGenerator`: messages-style HTTP API (single user turn in,
//!   first text content block out)
//!
//! # Examples
//!
//! ```
//! use gangway_llm::MockGenerator;
//! use gangway_domain::{GenerationParams, TextGenerator};
//!
//! # async fn example() {
//! let generator = MockGenerator::new("{\"field\": null}");
//! let text = generator
//!     .generate("extract the fields", &GenerationParams::unset())
//!     .await
//!     .unwrap();
//! assert_eq!(text, "{\"field\": null}");
//! # }
//! ```

#![warn(missing_docs)]

pub mod anthropic;

use async_trait::async_trait;
use gangway_domain::{GenerationParams, TextGenerator};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use anthropic::AnthropicGenerator;

/// Errors that can occur during generation
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Response envelope could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The response contained no usable text block
    #[error("Model returned an empty completion")]
    EmptyCompletion,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("Generator error: {0}")]
    Other(String),
}

/// One recorded call against a [`MockGenerator`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// The prompt as received
    pub prompt: String,
    /// The sampling parameters as received
    pub params: GenerationParams,
}

/// Mock generator for deterministic testing
///
/// Returns pre-configured responses without network calls, and records each
/// call's `(prompt, params)` pair so tests can assert exactly which sampling
/// parameters a concurrent caller's request observed.
#[derive(Debug, Clone)]
pub struct MockGenerator {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockGenerator {
    /// Create a mock returning a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt.into(), response.into());
    }

    /// Make every subsequent call fail
    pub fn fail_next_calls(&self) {
        *self.fail.lock().unwrap() = true;
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// All recorded calls, in order
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    type Error = GeneratorError;

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, Self::Error> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            params: *params,
        });

        if *self.fail.lock().unwrap() {
            return Err(GeneratorError::Other("mock generator error".to_string()));
        }

        let responses = self.responses.lock().unwrap();
        if let Some(response) = responses.get(prompt) {
            return Ok(response.clone());
        }
        Ok(self.default_response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_response() {
        let generator = MockGenerator::new("Test response");
        let result = generator
            .generate("any prompt", &GenerationParams::unset())
            .await
            .unwrap();
        assert_eq!(result, "Test response");
    }

    #[tokio::test]
    async fn test_mock_specific_responses() {
        let mut generator = MockGenerator::default();
        generator.add_response("hello", "world");

        let params = GenerationParams::unset();
        assert_eq!(generator.generate("hello", &params).await.unwrap(), "world");
        assert_eq!(
            generator.generate("unknown", &params).await.unwrap(),
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_mock_records_params() {
        let generator = MockGenerator::new("ok");
        let params = GenerationParams::unset().with_temperature(0.3);
        generator.generate("prompt", &params).await.unwrap();

        let calls = generator.recorded_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, "prompt");
        assert_eq!(calls[0].params.temperature, Some(0.3));
        assert_eq!(calls[0].params.max_tokens, None);
    }

    #[tokio::test]
    async fn test_mock_error_injection() {
        let generator = MockGenerator::new("ok");
        generator.fail_next_calls();

        let result = generator
            .generate("prompt", &GenerationParams::unset())
            .await;
        assert!(matches!(result, Err(GeneratorError::Other(_))));
    }

    #[tokio::test]
    async fn test_mock_clone_shares_call_log() {
        let generator = MockGenerator::new("ok");
        let cloned = generator.clone();

        generator
            .generate("prompt", &GenerationParams::unset())
            .await
            .unwrap();

        assert_eq!(cloned.call_count(), 1);
    }
}
