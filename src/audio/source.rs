//! The capture seam: [`AudioSource`] and its microphone implementation.
//!
//! The controller never touches cpal directly — it holds an
//! `Arc<dyn AudioSource>` and asks for one bounded clip per session.  A
//! capture call blocks until the fixed duration elapses or the cancel flag
//! is raised, whichever comes first, and releases the device before
//! returning on every path.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use crate::audio::capture::{CaptureError, InputDevice};
use crate::audio::convert;
use crate::pipeline::cancel::CancellationToken;

/// How often the capture loop wakes to poll the cancel flag while waiting
/// for the next hardware buffer.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// AudioClip
// ---------------------------------------------------------------------------

/// One captured utterance, already converted for the speech provider.
///
/// Produced by the capture stage, consumed exactly once by transcription.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Mono PCM samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Sample rate in Hz (16 000 for every production source).
    pub sample_rate: u32,
    /// Channel count after downmix — always 1.
    pub channels: u16,
    /// Approximate clip length in seconds, derived from the sample count.
    pub duration_hint: f32,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        let duration_hint = if sample_rate == 0 {
            0.0
        } else {
            samples.len() as f32 / sample_rate as f32
        };
        Self {
            samples,
            sample_rate,
            channels: 1,
            duration_hint,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// ---------------------------------------------------------------------------
// AudioSource trait
// ---------------------------------------------------------------------------

/// Blocking capture interface.
///
/// Implementations must be `Send + Sync` so the controller can run them
/// under `tokio::task::spawn_blocking` behind an `Arc<dyn AudioSource>`.
///
/// # Contract
///
/// - Blocks for at most `max_duration` of wall-clock time.
/// - Polls `cancel` while recording and returns early (with whatever was
///   captured so far) once it is raised; the caller decides whether to keep
///   or discard the partial clip.
/// - The capture device is released before the call returns, on success,
///   cancellation and error alike.
pub trait AudioSource: Send + Sync {
    fn capture(
        &self,
        max_duration: Duration,
        cancel: &CancellationToken,
    ) -> Result<AudioClip, CaptureError>;
}

// ---------------------------------------------------------------------------
// MicSource
// ---------------------------------------------------------------------------

/// Production source: the configured microphone via cpal.
///
/// The device is opened fresh for every capture call and closed (stream
/// handle dropped) before the clip is returned, so no hardware is held
/// between sessions.
pub struct MicSource {
    device_name: Option<String>,
    target_rate: u32,
}

impl MicSource {
    /// `device_name`: `None` for the system default microphone.
    /// `target_rate`: the rate the clip is resampled to (16 000 for speech
    /// providers).
    pub fn new(device_name: Option<String>, target_rate: u32) -> Self {
        Self {
            device_name,
            target_rate,
        }
    }
}

impl AudioSource for MicSource {
    fn capture(
        &self,
        max_duration: Duration,
        cancel: &CancellationToken,
    ) -> Result<AudioClip, CaptureError> {
        let device = InputDevice::open(self.device_name.as_deref())?;
        let native_rate = device.sample_rate();
        let native_channels = device.channels();

        let (tx, rx) = mpsc::channel();
        // Scoped acquisition: `handle` is dropped on every path out of this
        // function, which stops the hardware stream.
        let handle = device.open_stream(tx)?;

        let deadline = Instant::now() + max_duration;
        let mut raw: Vec<f32> = Vec::new();

        while Instant::now() < deadline && !cancel.is_cancelled() {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(chunk) => raw.extend_from_slice(&chunk.samples),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }

        drop(handle);

        let mono = convert::to_mono(&raw, native_channels);
        let samples = convert::resample(&mono, native_rate, self.target_rate);
        Ok(AudioClip::new(samples, self.target_rate))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_duration_hint_matches_sample_count() {
        let clip = AudioClip::new(vec![0.0; 32_000], 16_000);
        assert!((clip.duration_hint - 2.0).abs() < 1e-6);
        assert_eq!(clip.channels, 1);
    }

    #[test]
    fn zero_rate_clip_has_zero_duration() {
        let clip = AudioClip::new(vec![0.0; 100], 0);
        assert_eq!(clip.duration_hint, 0.0);
    }

    #[test]
    fn source_trait_is_object_safe() {
        fn assert_source(_: Box<dyn AudioSource>) {}
        let _ = assert_source; // compile-time check only; no device in CI
    }
}
