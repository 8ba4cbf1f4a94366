//! Stage-transition notifications for the status surface.
//!
//! The controller never reads anything back from the front-end; it only
//! pushes [`StatusEvent`]s through a [`StatusSink`].  Events arrive in
//! program order (stage order), and a sink must not assume any other
//! guarantee — in particular it may be called from the worker task, never
//! from the thread that created it.

use std::sync::mpsc::Sender;
use std::time::SystemTime;

use crate::pipeline::state::SessionState;

// ---------------------------------------------------------------------------
// StatusEvent
// ---------------------------------------------------------------------------

/// One fire-and-forget status notification.
#[derive(Debug, Clone)]
pub struct StatusEvent {
    /// The stage (or terminal state) this event announces.
    pub stage: SessionState,
    /// Display text, e.g. `"Recording..."` or an error reason.
    pub message: String,
    /// When the controller emitted the event.
    pub timestamp: SystemTime,
}

impl StatusEvent {
    pub fn new(stage: SessionState, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            timestamp: SystemTime::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// StatusSink
// ---------------------------------------------------------------------------

/// Receiver of stage-transition notifications.
///
/// Object-safe and `Send + Sync` so the controller can hold it behind
/// `Arc<dyn StatusSink>`.  Implementations must not block: the worker calls
/// `notify` between stages, and a slow sink would stretch cancellation
/// latency.
pub trait StatusSink: Send + Sync {
    fn notify(&self, event: StatusEvent);
}

// ---------------------------------------------------------------------------
// LogSink
// ---------------------------------------------------------------------------

/// Sink that writes every event to the log at info level.
///
/// Useful for headless runs and as a default when no UI is attached.
#[derive(Debug, Default)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn notify(&self, event: StatusEvent) {
        log::info!("[{}] {}", event.stage.label(), event.message);
    }
}

// ---------------------------------------------------------------------------
// ChannelSink
// ---------------------------------------------------------------------------

/// Sink that forwards events over an `mpsc` channel to a UI thread.
///
/// Send errors are ignored — if the receiver is gone the session still has
/// to run to its terminal state.
pub struct ChannelSink {
    tx: Sender<StatusEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<StatusEvent>) -> Self {
        Self { tx }
    }
}

impl StatusSink for ChannelSink {
    fn notify(&self, event: StatusEvent) {
        let _ = self.tx.send(event);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn channel_sink_forwards_events() {
        let (tx, rx) = mpsc::channel();
        let sink = ChannelSink::new(tx);

        sink.notify(StatusEvent::new(SessionState::Recording, "Recording..."));
        sink.notify(StatusEvent::new(SessionState::Completed, "Done"));

        let first = rx.recv().unwrap();
        assert_eq!(first.stage, SessionState::Recording);
        assert_eq!(first.message, "Recording...");

        let second = rx.recv().unwrap();
        assert_eq!(second.stage, SessionState::Completed);
    }

    #[test]
    fn channel_sink_survives_dropped_receiver() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let sink = ChannelSink::new(tx);
        // Must not panic.
        sink.notify(StatusEvent::new(SessionState::Failed, "gone"));
    }

    #[test]
    fn sinks_are_object_safe() {
        fn assert_sink(_: Box<dyn StatusSink>) {}
        assert_sink(Box::new(LogSink));
    }
}
