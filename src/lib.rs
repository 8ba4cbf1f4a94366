//! Press-to-talk voice assistant: record a short utterance, transcribe it,
//! generate a reply, and speak the reply aloud.
//!
//! # Pipeline
//!
//! ```text
//! start ──▶ Recording ──▶ Transcribing ──▶ Generating ──▶ Synthesizing ──▶ Completed
//!              │               │               │                              ▲
//!              └───────────────┴───────────────┴── cancel ──▶ Cancelled       │
//!                                                                            │
//!     microphone lost ──▶ Failed          empty transcript ──────────────────┘
//! ```
//!
//! One interaction runs at a time; [`pipeline::InteractionController`] rejects
//! a second start while a session is in flight. Cancellation is cooperative:
//! the worker task checks a [`pipeline::CancellationToken`] at each stage
//! boundary (and mid-capture), so a stop request lands at the next checkpoint
//! rather than mid-write. Provider failures degrade rather than abort — a
//! failed transcription reads as silence, a failed generation substitutes a
//! canned apology, and a failed synthesis is logged and swallowed.
//!
//! Each subsystem sits behind a trait ([`audio::AudioSource`],
//! [`stt::SpeechToText`], [`llm::TextGenerator`], [`tts::TextToSpeech`]) so
//! the controller never names a concrete provider.

pub mod audio;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod stt;
pub mod tts;

pub use config::AppConfig;
pub use pipeline::{InteractionController, SessionState, SharedState};
