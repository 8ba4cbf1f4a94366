//! The interaction core: state machine, cancellation, and the controller
//! that drives one press-to-talk round trip.
//!
//! # Architecture
//!
//! ```text
//! Start / Stop (any thread)
//!        │
//!        ▼
//! InteractionController ── tokio::spawn ──▶ stage sequence (worker task)
//!        │                                      │
//!        │  CancellationToken (cancel flag      ├─ Recording     spawn_blocking(AudioSource)
//!        │  + single-session guard)             ├─ Transcribing  scratch WAV → SpeechToText
//!        │                                      ├─ Generating    TextGenerator (never fails)
//!        │                                      └─ Synthesizing  TextToSpeech (best effort)
//!        ▼                                      │
//! SharedState (Arc<Mutex<AppState>>) ◀──────────┘  + StatusSink events, in stage order
//! ```
//!
//! The four collaborators are trait objects selected at wiring time;
//! swapping providers is configuration, not new code.

pub mod cancel;
pub mod controller;
pub mod session;
pub mod state;
pub mod status;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use cancel::CancellationToken;
pub use controller::{InteractionController, SessionSettings, StartError};
pub use session::{InteractionSession, Reply, Transcript};
pub use state::{new_shared_state, AppState, SessionState, SharedState};
pub use status::{ChannelSink, LogSink, StatusEvent, StatusSink};
