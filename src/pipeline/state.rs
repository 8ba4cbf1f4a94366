//! Session state machine and shared application state.
//!
//! [`SessionState`] drives the controller's state machine.  The front-end
//! reads it via [`SharedState`] to render the appropriate status view.
//!
//! States advance strictly in stage order — there is no retry-to-earlier-stage
//! transition:
//!
//! ```text
//! Idle ──start()──▶ Recording ──▶ Transcribing ──▶ Generating ──▶ Synthesizing ──▶ Completed
//!                       │               │               │               │
//!                       └── cancel ─────┴── cancel ─────┴── cancel ─────┘──▶ Cancelled
//! any stage ──collaborator failure──▶ Failed
//! ```
//!
//! `Completed`, `Cancelled` and `Failed` are terminal; the next `start()`
//! begins a fresh session from `Idle`.

use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// States of one press-to-talk round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session in flight; waiting for the user to press Start.
    Idle,

    /// Microphone is open; audio is being captured.
    Recording,

    /// Captured audio is with the speech-to-text provider.
    Transcribing,

    /// Transcript is with the reply generator.
    Generating,

    /// Reply is being synthesized and played.
    Synthesizing,

    /// The round trip finished.  This includes the no-speech short circuit
    /// and degraded outcomes (fallback reply, silent completion on synthesis
    /// failure) — absence of speech is not an error.
    Completed,

    /// The user stopped the session before it finished.
    Cancelled,

    /// A collaborator failed in a way that could not be degraded around
    /// (e.g. the capture device was unavailable).
    Failed,
}

impl SessionState {
    /// Returns `true` while a session is actively working through stages.
    ///
    /// The front-end uses this to show a busy indicator and to grey out the
    /// Start control.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SessionState::Recording
                | SessionState::Transcribing
                | SessionState::Generating
                | SessionState::Synthesizing
        )
    }

    /// Returns `true` for the three states a session can end in.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Cancelled | SessionState::Failed
        )
    }

    /// A short human-readable label suitable for a status line.
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "Ready",
            SessionState::Recording => "Recording",
            SessionState::Transcribing => "Transcribing",
            SessionState::Generating => "Thinking",
            SessionState::Synthesizing => "Speaking",
            SessionState::Completed => "Done",
            SessionState::Cancelled => "Stopped",
            SessionState::Failed => "Error",
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Shared application state — the single source of truth for the front-end.
///
/// Held behind [`SharedState`] (`Arc<Mutex<AppState>>`).  The controller's
/// worker mutates it; the front-end reads it whenever it refreshes.
#[derive(Debug, Default)]
pub struct AppState {
    /// Current phase of the session, or the terminal state of the last one.
    pub session: SessionState,

    /// The most recent transcript.  `None` until a session produces one.
    pub last_transcript: Option<String>,

    /// The most recent spoken (or fallback) reply.
    pub last_reply: Option<String>,

    /// Error message to display when `session == SessionState::Failed`.
    pub error_message: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`AppState`].
///
/// Cheap to clone (`Arc` clone).  Lock with `.lock().unwrap()` for a short
/// critical section; do **not** hold the lock across `.await` points.
pub type SharedState = Arc<Mutex<AppState>>;

/// Construct a new [`SharedState`] wrapping a default [`AppState`].
pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(AppState::new()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_covers_exactly_the_four_stages() {
        assert!(!SessionState::Idle.is_busy());
        assert!(SessionState::Recording.is_busy());
        assert!(SessionState::Transcribing.is_busy());
        assert!(SessionState::Generating.is_busy());
        assert!(SessionState::Synthesizing.is_busy());
        assert!(!SessionState::Completed.is_busy());
        assert!(!SessionState::Cancelled.is_busy());
        assert!(!SessionState::Failed.is_busy());
    }

    #[test]
    fn terminal_covers_exactly_the_three_ends() {
        assert!(SessionState::Completed.is_terminal());
        assert!(SessionState::Cancelled.is_terminal());
        assert!(SessionState::Failed.is_terminal());
        assert!(!SessionState::Idle.is_terminal());
        assert!(!SessionState::Recording.is_terminal());
        assert!(!SessionState::Synthesizing.is_terminal());
    }

    #[test]
    fn default_state_is_idle() {
        assert_eq!(SessionState::default(), SessionState::Idle);
        let app = AppState::default();
        assert_eq!(app.session, SessionState::Idle);
        assert!(app.last_transcript.is_none());
        assert!(app.error_message.is_none());
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(SessionState::Generating.label(), "Thinking");
        assert_eq!(SessionState::Synthesizing.label(), "Speaking");
        assert_eq!(SessionState::Cancelled.label(), "Stopped");
    }

    #[test]
    fn shared_state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedState>();
    }

    #[test]
    fn shared_state_can_be_cloned_and_mutated() {
        let state = new_shared_state();
        let state2 = Arc::clone(&state);

        state.lock().unwrap().session = SessionState::Recording;
        assert_eq!(state2.lock().unwrap().session, SessionState::Recording);
    }
}
