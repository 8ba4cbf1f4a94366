//! Cooperative cancellation and the single-session guard.
//!
//! [`CancellationToken`] is created once, handed to the controller, and safe
//! to poke from any thread.  Two independent flags live here:
//!
//! * `requested` — the cancel signal.  Set by the UI's Stop action, polled by
//!   the worker at stage checkpoints.  Cleared only by [`reset`], which the
//!   controller calls at the start of a new session — never mid-flight.
//! * `active` — the reentrancy guard.  Exactly one session may hold it;
//!   [`try_activate`] is a compare-and-swap so two racing Start presses can
//!   never both win.
//!
//! [`reset`]: CancellationToken::reset
//! [`try_activate`]: CancellationToken::try_activate

use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancel signal + session-activity guard.
///
/// Cheap to share via `Arc`; all operations are lock-free atomics with
/// `SeqCst` ordering so the worker and the UI thread never see torn state.
#[derive(Debug, Default)]
pub struct CancellationToken {
    requested: AtomicBool,
    active: AtomicBool,
}

impl CancellationToken {
    /// Create a token with no cancel pending and no session active.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal the in-flight session to stop at its next checkpoint.
    ///
    /// Cancellation is cooperative: work already inside a collaborator call
    /// (a transcription round trip, playback) finishes before the flag is
    /// observed.
    pub fn request_cancel(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Has a cancel been requested for the current session?
    pub fn is_cancelled(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Clear a pending cancel request.  Called only by
    /// `InteractionController::start` when a new session begins.
    pub fn reset(&self) {
        self.requested.store(false, Ordering::SeqCst);
    }

    /// Try to claim the session slot.
    ///
    /// Returns `true` when the caller is now the active session, `false`
    /// when another session already holds the slot.  This is the reentrancy
    /// guard: overlapping sessions would fight over the one capture device
    /// and the one status surface, so the loser must be turned away.
    pub fn try_activate(&self) -> bool {
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Release the session slot.  Must be called on every terminal
    /// transition — completion, cancellation, failure, or panic — or no
    /// further session can ever start.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Is a session currently in flight?
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn fresh_token_is_inert() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(!token.is_active());
    }

    #[test]
    fn cancel_is_sticky_until_reset() {
        let token = CancellationToken::new();
        token.request_cancel();
        assert!(token.is_cancelled());
        token.request_cancel(); // idempotent
        assert!(token.is_cancelled());
        token.reset();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn only_one_activation_wins() {
        let token = CancellationToken::new();
        assert!(token.try_activate());
        assert!(!token.try_activate());
        token.deactivate();
        assert!(token.try_activate());
    }

    /// Racing activations from many threads must produce exactly one winner.
    #[test]
    fn activation_race_has_single_winner() {
        let token = Arc::new(CancellationToken::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let t = Arc::clone(&token);
            handles.push(std::thread::spawn(move || t.try_activate()));
        }
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn cancel_and_guard_are_independent() {
        let token = CancellationToken::new();
        token.try_activate();
        token.request_cancel();
        assert!(token.is_active());
        assert!(token.is_cancelled());
        token.deactivate();
        // The cancel flag survives deactivation; only reset clears it.
        assert!(token.is_cancelled());
    }
}
