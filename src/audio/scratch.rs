//! Ephemeral on-disk audio for providers that read files.
//!
//! The transcription stage persists the captured clip as a 16-bit PCM WAV,
//! hands the path to the speech provider, and removes the file immediately
//! after the call returns.  Removal can be transiently blocked (antivirus
//! scanners, a provider still holding the handle on Windows), so it retries
//! a small fixed number of times before giving up; a leftover scratch file
//! is logged and never fatal.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::audio::source::AudioClip;

/// Removal retry schedule: 5 attempts, 300 ms apart.
pub const REMOVE_RETRIES: u32 = 5;
pub const REMOVE_RETRY_DELAY: Duration = Duration::from_millis(300);

/// Errors raised while writing the scratch WAV.
#[derive(Debug, Error)]
pub enum ScratchError {
    #[error("failed to create scratch directory: {0}")]
    CreateDir(#[source] io::Error),

    #[error("failed to write scratch WAV: {0}")]
    Write(#[from] hound::Error),
}

/// Path of the scratch file for session `id` under `dir`.
pub fn scratch_path(dir: &Path, session_id: u64) -> PathBuf {
    dir.join(format!("session-{session_id}.wav"))
}

/// Persist `clip` as a mono 16-bit PCM WAV at `path`, creating the parent
/// directory if needed.
///
/// Blocking; the controller runs this under `spawn_blocking`.
pub fn write_wav(path: &Path, clip: &AudioClip) -> Result<(), ScratchError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(ScratchError::CreateDir)?;
    }

    let spec = hound::WavSpec {
        channels: clip.channels,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in &clip.samples {
        let quantised = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(quantised)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Remove `path`, retrying [`REMOVE_RETRIES`] times with
/// [`REMOVE_RETRY_DELAY`] between attempts.
///
/// A file that is already gone counts as success.  Returns the last error
/// when every attempt fails; callers log it and carry on — cleanup failure
/// must never take a session down.
pub async fn remove_with_retry(path: &Path) -> Result<(), io::Error> {
    let mut last_err = None;

    for attempt in 0..REMOVE_RETRIES {
        match tokio::fs::remove_file(path).await {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                log::debug!(
                    "scratch removal attempt {}/{} failed: {e}",
                    attempt + 1,
                    REMOVE_RETRIES
                );
                last_err = Some(e);
            }
        }
        tokio::time::sleep(REMOVE_RETRY_DELAY).await;
    }

    Err(last_err.unwrap_or_else(|| io::Error::other("scratch removal failed")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
