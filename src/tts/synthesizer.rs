//! Core `TextToSpeech` trait and the HTTP synthesizer.
//!
//! [`ApiSynthesizer`] posts the reply text to an OpenAI-style
//! `/v1/audio/speech` endpoint, receives WAV bytes, and plays them on the
//! default output device via `rodio`.  Synthesis-and-play is one call from
//! the controller's point of view, and once playback has started it always
//! runs to completion — providers offer no safe mid-utterance abort.

use std::io::Cursor;

use async_trait::async_trait;
use rodio::{Decoder, OutputStream, Sink};
use thiserror::Error;

use crate::config::TtsConfig;

// ---------------------------------------------------------------------------
// TtsError
// ---------------------------------------------------------------------------

/// Errors that can occur during synthesis or playback.
///
/// The controller logs these and completes the session anyway — the user
/// simply does not hear the reply.
#[derive(Debug, Error)]
pub enum TtsError {
    /// HTTP transport or connection error.
    #[error("TTS request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("TTS request timed out")]
    Timeout,

    /// The returned audio could not be decoded.
    #[error("failed to decode synthesized audio: {0}")]
    Decode(String),

    /// No output device, or the platform rejected the playback stream.
    #[error("audio playback failed: {0}")]
    Playback(String),
}

impl From<reqwest::Error> for TtsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TtsError::Timeout
        } else {
            TtsError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// TextToSpeech trait
// ---------------------------------------------------------------------------

/// Async interface for speak-this-text providers.
///
/// `say` resolves once playback has finished (or failed); implementors must
/// be `Send + Sync` for `Arc<dyn TextToSpeech>` sharing.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    async fn say(&self, text: &str) -> Result<(), TtsError>;
}

// ---------------------------------------------------------------------------
// ApiSynthesizer
// ---------------------------------------------------------------------------

/// OpenAI-style speech synthesis plus local playback.
///
/// The blocking playback runs on the tokio blocking pool so the worker task
/// (and the UI) stay responsive while the utterance plays.
pub struct ApiSynthesizer {
    client: reqwest::Client,
    config: TtsConfig,
}

impl ApiSynthesizer {
    /// Build a synthesizer from application config.  The HTTP client carries
    /// the per-request timeout from `config.timeout_secs`.
    pub fn from_config(config: &TtsConfig) -> Self {
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
impl TextToSpeech for ApiSynthesizer {
    async fn say(&self, text: &str) -> Result<(), TtsError> {
        let url = format!("{}/v1/audio/speech", self.config.base_url);

        let body = serde_json::json!({
            "model":           self.config.model,
            "voice":           self.config.voice,
            "input":           text,
            "response_format": "wav"
        });

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let bytes = response.bytes().await?.to_vec();

        // rodio playback blocks until the utterance ends; keep it off the
        // async worker.
        tokio::task::spawn_blocking(move || play_wav(bytes))
            .await
            .map_err(|e| TtsError::Playback(format!("playback task failed: {e}")))?
    }
}

/// Decode `bytes` as WAV and play them to the default output device,
/// blocking until playback completes.
fn play_wav(bytes: Vec<u8>) -> Result<(), TtsError> {
    let (_stream, handle) =
        OutputStream::try_default().map_err(|e| TtsError::Playback(e.to_string()))?;
    let sink = Sink::try_new(&handle).map_err(|e| TtsError::Playback(e.to_string()))?;

    let source = Decoder::new(Cursor::new(bytes)).map_err(|e| TtsError::Decode(e.to_string()))?;
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
