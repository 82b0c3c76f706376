//! Chat model abstraction and the Ollama implementation.
//!
//! The advisory composer talks to the model through [`ChatModel`], so tests
//! can substitute a recording fake. [`OllamaChat`] calls a local Ollama
//! instance's `POST /api/chat` endpoint with streaming disabled.
//!
//! There is no retry: a failed or timed-out call fails the advisory request
//! that made it. The timeout comes from `[model].timeout_secs`.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::error::{Error, Result};

/// One message in a chat exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the model identifier (e.g. `"tinyllama"`).
    fn model_name(&self) -> &str;

    /// Send the conversation and return the model's reply message.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatMessage>;
}

/// Chat model served by a local Ollama instance.
pub struct OllamaChat {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaChat {
    pub fn new(config: &ModelConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build Ollama HTTP client")?;

        Ok(Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChatModel for OllamaChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatMessage> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::ModelUnavailable(format!("Ollama request timed out: {}", e))
                } else {
                    Error::ModelUnavailable(format!(
                        "Ollama connection error (is Ollama running at {}?): {}",
                        self.url, e
                    ))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(Error::ModelUnavailable(format!(
                "Ollama API error {}: {}",
                status, body_text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::ModelUnavailable(format!("invalid Ollama response: {}", e)))?;

        parse_chat_response(&json)
    }
}

/// Extract the reply from an Ollama `/api/chat` response body.
fn parse_chat_response(json: &serde_json::Value) -> Result<ChatMessage> {
    let message = json
        .get("message")
        .ok_or_else(|| Error::ModelUnavailable("Invalid Ollama response: missing message".into()))?;

    serde_json::from_value(message.clone())
        .map_err(|e| Error::ModelUnavailable(format!("Invalid Ollama response message: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_chat_response() {
        let json = json!({
            "model": "tinyllama",
            "created_at": "2024-01-01T00:00:00Z",
            "message": { "role": "assistant", "content": "Rotate crops." },
            "done": true
        });
        let msg = parse_chat_response(&json).unwrap();
        assert_eq!(msg.role, "assistant");
        assert_eq!(msg.content, "Rotate crops.");
    }

    #[test]
    fn test_parse_chat_response_missing_message() {
        let err = parse_chat_response(&json!({ "error": "model not found" })).unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(_)));
    }

    #[test]
    fn test_message_constructors() {
        assert_eq!(ChatMessage::system("x").role, "system");
        assert_eq!(ChatMessage::user("y").role, "user");
    }
}
