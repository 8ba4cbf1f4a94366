//! Text-to-speech provider interface.
//!
//! [`TextToSpeech`] is the synthesize-and-play seam; [`ApiSynthesizer`] is
//! the production implementation (HTTP synthesis + rodio playback).

pub mod synthesizer;

pub use synthesizer::{ApiSynthesizer, TextToSpeech, TtsError};
