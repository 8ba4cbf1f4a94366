//! Core `TextGenerator` trait and `ApiGenerator` implementation.
//!
//! `ApiGenerator` calls any OpenAI-compatible `/v1/chat/completions` endpoint
//! — OpenAI, Groq, Ollama (OpenAI mode), LM Studio, vLLM.  All connection
//! details come from [`LlmConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::LlmConfig;

// ---------------------------------------------------------------------------
// GenError
// ---------------------------------------------------------------------------

/// Errors that can occur during reply generation.
#[derive(Debug, Error)]
pub enum GenError {
    /// HTTP transport or connection error.
    #[error("LLM request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse LLM response: {0}")]
    Parse(String),

    /// The model returned a response with no usable text content.
    #[error("LLM returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for GenError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenError::Timeout
        } else {
            GenError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// TextGenerator trait
// ---------------------------------------------------------------------------

/// Async trait for reply generation.
///
/// Implementors must be `Send + Sync` so they can be shared across threads
/// (wrapped in `Arc<dyn TextGenerator>`).  `prompt` is the user's transcribed
/// utterance; the reply should be short enough to speak aloud.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenError>;
}

// ---------------------------------------------------------------------------
// ApiGenerator
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// The configured system prompt keeps replies conversational; the
/// `Authorization: Bearer …` header is attached **only** when
/// `config.api_key` is a non-empty string — safe for Ollama and other local
/// providers that require no authentication.
pub struct ApiGenerator {
    client: reqwest::Client,
    config: LlmConfig,
}

impl ApiGenerator {
    /// Build an `ApiGenerator` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl TextGenerator for ApiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": self.config.system_prompt },
                { "role": "user",   "content": prompt                    }
            ],
            "stream":      false,
            "temperature": self.config.temperature,
            "max_tokens":  256
        });

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenError::Parse(e.to_string()))?;

        let reply = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(GenError::EmptyResponse)?
            .trim()
            .to_string();

        if reply.is_empty() {
            return Err(GenError::EmptyResponse);
        }

        Ok(reply)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_is_object_safe() {
        fn assert_generator(_: Box<dyn TextGenerator>) {}
        let _ = assert_generator;
    }

    #[test]
    fn error_messages_are_user_presentable() {
        assert_eq!(GenError::Timeout.to_string(), "LLM request timed out");
        assert_eq!(
            GenError::EmptyResponse.to_string(),
            "LLM returned an empty response"
        );
    }
}
