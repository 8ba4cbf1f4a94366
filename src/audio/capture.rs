//! Microphone access via `cpal`.
//!
//! [`InputDevice`] wraps the cpal host/device/stream lifecycle.  Call
//! [`InputDevice::open_stream`] to start streaming [`AudioChunk`]s over an
//! mpsc channel.  The returned [`StreamHandle`] is a RAII guard — dropping it
//! stops the hardware stream, which is how the capture stage guarantees the
//! device is released on every exit path.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc;
use thiserror::Error;

// ---------------------------------------------------------------------------
// AudioChunk
// ---------------------------------------------------------------------------

/// One buffer of raw audio as delivered by the cpal callback.
///
/// Samples are interleaved `f32` in `[-1.0, 1.0]` at the device's native
/// rate and channel count; the capture loop downmixes and resamples before
/// building the session's clip.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Interleaved PCM samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Sample rate of this chunk in Hz.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
}

// ---------------------------------------------------------------------------
// StreamHandle
// ---------------------------------------------------------------------------

/// RAII guard that keeps the cpal stream alive.
///
/// Dropping this value stops the underlying hardware stream.
pub struct StreamHandle {
    _stream: cpal::Stream,
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors raised while acquiring or running the capture device.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No usable input device; maps to the session-fatal `DeviceUnavailable`
    /// outcome.
    #[error("no input device found on the default audio host")]
    NoDevice,

    /// A device matching the configured name was not found.
    #[error("input device {0:?} not found")]
    NamedDeviceMissing(String),

    #[error("failed to query input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// The blocking capture task was aborted or panicked.
    #[error("capture task failed: {0}")]
    Task(String),
}

// ---------------------------------------------------------------------------
// InputDevice
// ---------------------------------------------------------------------------

/// A selected microphone plus the stream configuration it reported.
///
/// Construction queries the device but does not open a stream; opening and
/// closing happen per session so the hardware is never held while idle.
pub struct InputDevice {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_rate: u32,
    channels: u16,
}

impl InputDevice {
    /// Select an input device: the one named `name`, or the system default
    /// when `name` is `None`.
    pub fn open(name: Option<&str>) -> Result<Self, CaptureError> {
        let host = cpal::default_host();

        let device = match name {
            Some(wanted) => host
                .input_devices()
                .map_err(|_| CaptureError::NoDevice)?
                .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
                .ok_or_else(|| CaptureError::NamedDeviceMissing(wanted.to_string()))?,
            None => host.default_input_device().ok_or(CaptureError::NoDevice)?,
        };

        let supported = device.default_input_config()?;
        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        log::debug!(
            "input device {:?}: {} Hz, {} ch",
            device.name().unwrap_or_else(|_| "<unnamed>".into()),
            sample_rate,
            channels
        );

        Ok(Self {
            device,
            config,
            sample_rate,
            channels,
        })
    }

    /// Begin streaming and forward each hardware buffer to `tx` as an
    /// [`AudioChunk`].
    ///
    /// The cpal callback runs on a dedicated audio thread.  Send errors
    /// (receiver dropped) are ignored so that thread never panics.
    pub fn open_stream(
        &self,
        tx: mpsc::Sender<AudioChunk>,
    ) -> Result<StreamHandle, CaptureError> {
        let sample_rate = self.sample_rate;
        let channels = self.channels;

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let _ = tx.send(AudioChunk {
                    samples: data.to_vec(),
                    sample_rate,
                    channels,
                });
            },
            |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
            },
            None,
        )?;

        stream.play()?;
        Ok(StreamHandle { _stream: stream })
    }

    /// Native sample rate of the device in Hz (commonly 44 100 or 48 000).
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels in each chunk.
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// `AudioChunk` must be `Send` so it can cross the audio-thread boundary.
    #[test]
    fn audio_chunk_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<AudioChunk>();
    }

    #[test]
    fn named_device_error_carries_the_name() {
        let err = CaptureError::NamedDeviceMissing("USB Mic".into());
        assert!(err.to_string().contains("USB Mic"));
    }
}
