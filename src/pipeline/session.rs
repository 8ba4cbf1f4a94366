//! Per-session value types.
//!
//! An [`InteractionSession`] identifies one round trip and is owned
//! exclusively by the controller's worker for its lifetime.  [`Transcript`]
//! and [`Reply`] carry the stage outputs together with the wall-clock latency
//! of the producing call, measured by the controller.

use std::time::{Duration, Instant};

use crate::pipeline::state::SessionState;

/// Identity and progress of one press-to-talk round trip.
///
/// At most one session is in a non-terminal state at any time — that is the
/// reentrancy invariant enforced by `CancellationToken::try_activate`.
#[derive(Debug)]
pub struct InteractionSession {
    /// Process-local monotonic id; also names the session's scratch file.
    pub id: u64,
    /// Current stage, or the terminal state the session ended in.
    pub state: SessionState,
    /// When `start()` accepted the session.
    pub created_at: Instant,
}

impl InteractionSession {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            state: SessionState::Idle,
            created_at: Instant::now(),
        }
    }

    /// Total wall-clock age of the session.
    pub fn elapsed(&self) -> Duration {
        self.created_at.elapsed()
    }
}

/// Output of the transcription stage.
///
/// Empty or whitespace-only text is a valid value — it means nobody spoke —
/// and triggers the no-speech short circuit, not an error.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub text: String,
    /// How long the speech-to-text call took.
    pub latency: Duration,
}

impl Transcript {
    /// True when no usable speech was recognised.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Output of the generation stage.
///
/// Always non-empty on the path reaching synthesis: provider failures are
/// substituted with a fixed fallback reply before this struct is built.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    /// How long the generation call took.
    pub latency: Duration,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
