//! Core `SpeechToText` trait and the HTTP transcriber.
//!
//! [`HttpTranscriber`] posts the session's scratch WAV to a Deepgram-style
//! prerecorded endpoint (`POST {base_url}/v1/listen` with `audio/wav` body).
//! All connection details come from [`SttConfig`]; nothing is hardcoded.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::SttConfig;

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

/// Errors that can occur during transcription.
///
/// The controller never inspects these beyond logging — any transcription
/// failure degrades to the no-speech outcome.
#[derive(Debug, Error)]
pub enum SttError {
    /// The scratch WAV could not be read back from disk.
    #[error("failed to read audio file: {0}")]
    Io(String),

    /// HTTP transport or connection error.
    #[error("STT request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("STT request timed out")]
    Timeout,

    /// The response was not the expected JSON shape.
    #[error("failed to parse STT response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SttError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SttError::Timeout
        } else {
            SttError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechToText trait
// ---------------------------------------------------------------------------

/// Async interface for speech-to-text providers.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn SpeechToText>`.
///
/// # Contract
///
/// - `wav` points at a mono 16-bit PCM WAV that exists for the duration of
///   the call and not a moment longer — implementations must not keep the
///   path around.
/// - An empty transcript is a **valid, non-error** result meaning nobody
///   spoke.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, wav: &Path) -> Result<String, SttError>;
}

// ---------------------------------------------------------------------------
// HttpTranscriber
// ---------------------------------------------------------------------------

/// Deepgram-style prerecorded transcription over HTTP.
///
/// The WAV bytes go up as the request body with `Content-Type: audio/wav`;
/// the transcript comes back at
/// `results.channels[0].alternatives[0].transcript`.
pub struct HttpTranscriber {
    client: reqwest::Client,
    config: SttConfig,
}

impl HttpTranscriber {
    /// Build a transcriber from application config.  The HTTP client carries
    /// the per-request timeout from `config.timeout_secs`.
    pub fn from_config(config: &SttConfig) -> Self {
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
impl SpeechToText for HttpTranscriber {
    async fn transcribe(&self, wav: &Path) -> Result<String, SttError> {
        let bytes = tokio::fs::read(wav)
            .await
            .map_err(|e| SttError::Io(e.to_string()))?;

        let url = format!(
            "{}/v1/listen?model={}&punctuate={}",
            self.config.base_url, self.config.model, self.config.punctuate
        );

        let mut req = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(bytes);

        // Attach the auth header only when a key is configured.
        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.header(reqwest::header::AUTHORIZATION, format!("Token {key}"));
        }

        let response = req.send().await?;
        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SttError::Parse(e.to_string()))?;

        let transcript = json["results"]["channels"][0]["alternatives"][0]["transcript"]
            .as_str()
            .ok_or_else(|| SttError::Parse("missing transcript field".into()))?;

        // Empty is a legitimate "nobody spoke" — return it as-is.
        Ok(transcript.to_string())
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
        fn assert_transcriber(_: Box<dyn SpeechToText>) {}
        let _ = assert_transcriber;
    }

    #[test]
    fn timeout_errors_are_distinguished() {
        // reqwest::Error cannot be constructed directly; check the display
        // text of our own variants instead.
        assert_eq!(SttError::Timeout.to_string(), "STT request timed out");
        assert!(SttError::Parse("missing transcript field".into())
            .to_string()
            .contains("missing transcript"));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let t = HttpTranscriber::from_config(&SttConfig::default());
        let err = t
            .transcribe(Path::new("/definitely/not/here.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, SttError::Io(_)));
    }
}
