//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\voice-assistant\
//!   macOS:   ~/Library/Application Support/voice-assistant/
//!   Linux:   ~/.config/voice-assistant/
//!
//! Scratch dir (ephemeral per-session WAV files):
//!   OS temp directory + `voice-assistant/`

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory for transient session audio.  Files here exist only between
    /// the end of capture and the end of transcription.
    pub scratch_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "voice-assistant";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard config path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let scratch_dir = std::env::temp_dir().join(Self::APP_NAME);

        Self {
            config_dir,
            settings_file,
            scratch_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_file_lives_under_config_dir() {
        let paths = AppPaths::new();
        assert!(paths.settings_file.starts_with(&paths.config_dir));
        assert_eq!(
            paths.settings_file.file_name().unwrap().to_str().unwrap(),
            "settings.toml"
        );
    }

    #[test]
    fn scratch_dir_is_under_temp() {
        let paths = AppPaths::new();
        assert!(paths.scratch_dir.starts_with(std::env::temp_dir()));
    }
}
