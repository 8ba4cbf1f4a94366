//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for microphone capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Target sample rate in Hz for the scratch recording (the transcription
    /// API expects 16 000).
    pub sample_rate: u32,
    /// Fixed recording window in seconds; capture stops automatically when
    /// this elapses.
    pub record_secs: f32,
    /// Audio input device name — `None` means the system default.
    pub input_device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            record_secs: 5.0,
            input_device: None,
        }
    }
}

// ---------------------------------------------------------------------------
// SttConfig
// ---------------------------------------------------------------------------

/// Settings for the transcription API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttConfig {
    /// Base URL of the transcription endpoint.
    pub base_url: String,
    /// API key — `None` for self-hosted endpoints without authentication.
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"nova-2"`).
    pub model: String,
    /// Ask the API to add punctuation and capitalisation.
    pub punctuate: bool,
    /// Maximum seconds to wait for a transcription before timing out.
    pub timeout_secs: u64,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.deepgram.com".into(),
            api_key: None,
            model: "nova-2".into(),
            punctuate: true,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the reply-generation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible chat endpoint.
    ///
    /// - Ollama default: `http://localhost:11434`
    /// - OpenAI: `https://api.openai.com`
    pub base_url: String,
    /// API key — `None` for local providers.
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"qwen2.5:3b"`, `"gpt-4o-mini"`).
    pub model: String,
    /// System prompt that frames every conversation turn.
    pub system_prompt: String,
    /// Sampling temperature (0.0 – 1.0).  Lower = more deterministic.
    pub temperature: f32,
    /// Maximum seconds to wait for a reply before timing out.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            api_key: None,
            model: "qwen2.5:3b".into(),
            system_prompt: "You are a helpful voice assistant. Keep replies short \
                            and conversational; they will be read aloud."
                .into(),
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// TtsConfig
// ---------------------------------------------------------------------------

/// Settings for speech synthesis and playback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Whether replies are spoken at all.  When `false` the assistant is
    /// text-only and replies appear in the log / shared state.
    pub enabled: bool,
    /// Base URL of the speech endpoint.
    pub base_url: String,
    /// API key — `None` for self-hosted endpoints without authentication.
    pub api_key: Option<String>,
    /// Voice model identifier (e.g. `"tts-1"`).
    pub model: String,
    /// Voice name within the model (e.g. `"alloy"`).
    pub voice: String,
    /// Maximum seconds to wait for synthesized audio before timing out.
    pub timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "tts-1".into(),
            voice: "alloy".into(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voice_assistant::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Microphone capture settings.
    pub audio: AudioConfig,
    /// Transcription API settings.
    pub stt: SttConfig,
    /// Reply-generation settings.
    pub llm: LlmConfig,
    /// Speech synthesis settings.
    pub tts: TtsConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        // AudioConfig
        assert_eq!(original.audio.sample_rate, loaded.audio.sample_rate);
        assert_eq!(original.audio.record_secs, loaded.audio.record_secs);
        assert_eq!(original.audio.input_device, loaded.audio.input_device);

        // SttConfig
        assert_eq!(original.stt.base_url, loaded.stt.base_url);
        assert_eq!(original.stt.api_key, loaded.stt.api_key);
        assert_eq!(original.stt.model, loaded.stt.model);
        assert_eq!(original.stt.punctuate, loaded.stt.punctuate);
        assert_eq!(original.stt.timeout_secs, loaded.stt.timeout_secs);

        // LlmConfig
        assert_eq!(original.llm.base_url, loaded.llm.base_url);
        assert_eq!(original.llm.model, loaded.llm.model);
        assert_eq!(original.llm.system_prompt, loaded.llm.system_prompt);
        assert_eq!(original.llm.temperature, loaded.llm.temperature);
        assert_eq!(original.llm.timeout_secs, loaded.llm.timeout_secs);

        // TtsConfig
        assert_eq!(original.tts.enabled, loaded.tts.enabled);
        assert_eq!(original.tts.base_url, loaded.tts.base_url);
        assert_eq!(original.tts.model, loaded.tts.model);
        assert_eq!(original.tts.voice, loaded.tts.voice);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.audio.sample_rate, default.audio.sample_rate);
        assert_eq!(config.stt.model, default.stt.model);
        assert_eq!(config.llm.model, default.llm.model);
        assert_eq!(config.tts.voice, default.tts.voice);
    }

    /// Malformed TOML must surface as an error, not silently fall back to
    /// defaults.
    #[test]
    fn malformed_toml_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "audio = \"not a table\"").expect("write");

        assert!(AppConfig::load_from(&path).is_err());
    }
}
