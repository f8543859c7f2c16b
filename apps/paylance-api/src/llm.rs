//! # Language Model Client
//!
//! Sends the extraction prompt to a language model and returns its raw
//! text answer. Parsing and normalization of that answer live in
//! `paylance_core::extraction`.
//!
//! ```text
//! description ──► build_prompt ──► InvoiceExtractor::complete ──► text
//!                                                                  │
//!            Invoice ◄── normalize_extracted ◄── parse_model_output ┘
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::LlmSettings;

/// Anthropic Messages API endpoint.
const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

/// API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("No language model API key is configured")]
    NotConfigured,

    #[error("HTTP client could not be built: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Language model API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Language model returned no text")]
    EmptyResponse,
}

// =============================================================================
// Extractor Trait
// =============================================================================

/// Something that answers a prompt with text.
#[async_trait]
pub trait InvoiceExtractor: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

// =============================================================================
// Anthropic
// =============================================================================

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Client for the Anthropic Messages API.
pub struct AnthropicExtractor {
    settings: LlmSettings,
    client: Client,
}

impl AnthropicExtractor {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| LlmError::Client(e.to_string()))?;

        Ok(AnthropicExtractor { settings, client })
    }
}

#[async_trait]
impl InvoiceExtractor for AnthropicExtractor {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(LlmError::NotConfigured)?;

        let request = MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(
            model = %self.settings.model,
            prompt_len = prompt.len(),
            "Sending request to language model"
        );

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Network(format!("Failed to parse response: {}", e)))?;

        body.content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

// =============================================================================
// Fixed Response
// =============================================================================

/// Answers every prompt with the same text. Used for offline runs and tests.
#[derive(Debug, Clone)]
pub struct FixedResponseExtractor {
    response: String,
}

impl FixedResponseExtractor {
    pub fn new(response: impl Into<String>) -> Self {
        FixedResponseExtractor {
            response: response.into(),
        }
    }
}

#[async_trait]
impl InvoiceExtractor for FixedResponseExtractor {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        Ok(self.response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = MessagesRequest {
            model: "claude-3-5-sonnet-20241022",
            max_tokens: 4096,
            messages: [Message {
                role: "user",
                content: "hello",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
    }

    #[test]
    fn test_response_text_block() {
        let body: MessagesResponse = serde_json::from_str(
            r#"{"id": "msg_1", "content": [{"type": "text", "text": "{\"client_name\": \"Acme\"}"}]}"#,
        )
        .unwrap();
        assert_eq!(body.content[0].kind, "text");
        assert!(body.content[0].text.as_deref().unwrap().contains("Acme"));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let extractor = AnthropicExtractor::new(LlmSettings::default()).unwrap();
        let err = extractor.complete("anything").await.unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured));
    }
}
