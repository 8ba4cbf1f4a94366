//! Audio capture and the session's transient audio artifacts.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → to_mono → resample
//!           → AudioClip → scratch WAV (persist-then-delete around STT)
//! ```
//!
//! The controller only sees the [`AudioSource`] trait and the scratch-file
//! helpers; everything cpal-shaped stays inside this module.

pub mod capture;
pub mod convert;
pub mod scratch;
pub mod source;

pub use capture::{AudioChunk, CaptureError, InputDevice, StreamHandle};
pub use convert::{resample, to_mono};
pub use source::{AudioClip, AudioSource, MicSource};
