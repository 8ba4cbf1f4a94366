//! The interaction controller — one press-to-talk round trip.
//!
//! [`InteractionController`] owns the collaborators behind trait objects and
//! drives a single session through
//! `Recording → Transcribing → Generating → Synthesizing`, reporting each
//! transition to the [`StatusSink`] and consulting the [`CancellationToken`]
//! at the defined checkpoints.
//!
//! # Session flow
//!
//! ```text
//! start()
//!   ├─ guard already held ─▶ Err(AlreadyRunning)      (existing session untouched)
//!   └─ claim guard, clear cancel flag, tokio::spawn:
//!        Recording    — spawn_blocking(source.capture)  [cancel polled in-loop]
//!        ── cancelled? ─▶ Cancelled (partial audio discarded)
//!        Transcribing — persist scratch WAV → stt.transcribe → delete (retry ×5)
//!        ── blank transcript? ─▶ "No speech detected" → Completed
//!        ── cancelled? ─▶ Cancelled
//!        Generating   — llm.generate   [failure → fixed fallback reply]
//!        ── cancelled? ─▶ Cancelled (synthesis skipped)
//!        Synthesizing — tts.say        [failure → logged, still Completed]
//!        Completed
//! ```
//!
//! The activity guard is released by a drop guard inside the worker task, so
//! every exit — completion, cancellation, failure, panic — leaves the
//! controller ready for the next `start()`.
//!
//! # Error policy
//!
//! Graceful degradation over propagation: only an unavailable capture device
//! fails a session.  Transcription errors degrade to the no-speech outcome,
//! generation errors to the fallback reply, synthesis errors to a silent
//! completion, and scratch-cleanup errors to a log line.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::audio::capture::CaptureError;
use crate::audio::scratch;
use crate::audio::source::{AudioClip, AudioSource};
use crate::config::{AppConfig, AppPaths};
use crate::llm::{TextGenerator, FALLBACK_REPLY};
use crate::pipeline::cancel::CancellationToken;
use crate::pipeline::session::{InteractionSession, Reply, Transcript};
use crate::pipeline::state::{SessionState, SharedState};
use crate::pipeline::status::{StatusEvent, StatusSink};
use crate::stt::SpeechToText;
use crate::tts::TextToSpeech;

// ---------------------------------------------------------------------------
// StartError
// ---------------------------------------------------------------------------

/// Why `start()` refused to begin a session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartError {
    /// A session is already in flight.  It is neither queued behind nor
    /// restarted — overlapping sessions would contend for the one capture
    /// device and the one status surface.
    #[error("a session is already running")]
    AlreadyRunning,
}

// ---------------------------------------------------------------------------
// SessionSettings
// ---------------------------------------------------------------------------

/// The controller's own knobs (everything else belongs to the collaborators).
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Fixed capture window; recording ends when this elapses or the user
    /// presses Stop.
    pub record_duration: Duration,
    /// Where per-session scratch WAVs live between capture and
    /// transcription.
    pub scratch_dir: PathBuf,
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            record_duration: Duration::from_secs_f32(config.audio.record_secs),
            scratch_dir: AppPaths::new().scratch_dir,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            record_duration: Duration::from_secs(5),
            scratch_dir: AppPaths::new().scratch_dir,
        }
    }
}

// ---------------------------------------------------------------------------
// InteractionController
// ---------------------------------------------------------------------------

/// Orchestrates press-to-talk sessions over the four collaborator seams.
///
/// `start()` and `cancel()` are safe to call from any thread; the stage
/// sequence runs on a tokio task and never blocks the caller.
pub struct InteractionController {
    state: SharedState,
    token: Arc<CancellationToken>,
    source: Arc<dyn AudioSource>,
    stt: Arc<dyn SpeechToText>,
    llm: Arc<dyn TextGenerator>,
    tts: Arc<dyn TextToSpeech>,
    sink: Arc<dyn StatusSink>,
    settings: SessionSettings,
    next_id: AtomicU64,
}

impl InteractionController {
    /// Wire a controller to its collaborators.
    ///
    /// The token is injected rather than created here so that embedders (and
    /// tests) can observe and drive cancellation from outside.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: SharedState,
        token: Arc<CancellationToken>,
        source: Arc<dyn AudioSource>,
        stt: Arc<dyn SpeechToText>,
        llm: Arc<dyn TextGenerator>,
        tts: Arc<dyn TextToSpeech>,
        sink: Arc<dyn StatusSink>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            state,
            token,
            source,
            stt,
            llm,
            tts,
            sink,
            settings,
            next_id: AtomicU64::new(1),
        }
    }

    /// Begin a new session.
    ///
    /// Returns immediately with the worker's `JoinHandle` on success, or
    /// [`StartError::AlreadyRunning`] when a session is in flight.  The
    /// handle may be dropped; the session runs to a terminal state either
    /// way.
    pub fn start(&self) -> Result<JoinHandle<()>, StartError> {
        if !self.token.try_activate() {
            let current = self.state.lock().unwrap().session;
            log::warn!("start rejected: interaction already in progress");
            self.sink.notify(StatusEvent::new(
                current,
                "Interaction already in progress",
            ));
            return Err(StartError::AlreadyRunning);
        }

        // The guard is ours; a stale cancel request from the previous
        // session must not kill this one.
        self.token.reset();

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut session = InteractionSession::new(id);
        log::info!("session {id} starting");

        let runner = StageRunner {
            state: Arc::clone(&self.state),
            token: Arc::clone(&self.token),
            source: Arc::clone(&self.source),
            stt: Arc::clone(&self.stt),
            llm: Arc::clone(&self.llm),
            tts: Arc::clone(&self.tts),
            sink: Arc::clone(&self.sink),
            settings: self.settings.clone(),
        };

        Ok(tokio::spawn(async move {
            // Released on drop — including panics — so a wedged worker can
            // never permanently lock out future sessions.
            let _guard = ActiveGuard(Arc::clone(&runner.token));
            runner.run(&mut session).await;
        }))
    }

    /// Request cancellation of the in-flight session.
    ///
    /// Cooperative: the worker stops at its next checkpoint.  Calling this
    /// with no active session is a no-op.
    pub fn cancel(&self) {
        if self.token.is_active() {
            log::info!("cancel requested");
            self.token.request_cancel();
        } else {
            log::debug!("cancel ignored: no active session");
        }
    }

    /// Is a session currently in flight?
    pub fn is_active(&self) -> bool {
        self.token.is_active()
    }
}

// ---------------------------------------------------------------------------
// ActiveGuard
// ---------------------------------------------------------------------------

/// Releases the session slot when the worker ends, however it ends.
struct ActiveGuard(Arc<CancellationToken>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.deactivate();
    }
}

// ---------------------------------------------------------------------------
// StageRunner
// ---------------------------------------------------------------------------

/// The worker half of the controller: owns clones of everything the stage
/// sequence needs and runs it to a terminal state.
struct StageRunner {
    state: SharedState,
    token: Arc<CancellationToken>,
    source: Arc<dyn AudioSource>,
    stt: Arc<dyn SpeechToText>,
    llm: Arc<dyn TextGenerator>,
    tts: Arc<dyn TextToSpeech>,
    sink: Arc<dyn StatusSink>,
    settings: SessionSettings,
}

impl StageRunner {
    async fn run(&self, session: &mut InteractionSession) {
        // ── Recording ────────────────────────────────────────────────────
        self.enter(session, SessionState::Recording, "Recording...");

        let clip = match self.record().await {
            Ok(clip) => clip,
            Err(e) => {
                self.finish(session, SessionState::Failed, format!("Microphone unavailable: {e}"));
                return;
            }
        };

        if self.token.is_cancelled() {
            // Partial audio is discarded with `clip`.
            drop(clip);
            self.finish(session, SessionState::Cancelled, "Stopped");
            return;
        }

        // ── Transcribing ─────────────────────────────────────────────────
        self.enter(session, SessionState::Transcribing, "Transcribing...");

        let transcript = self.transcribe(session.id, clip).await;
        log::debug!(
            "session {}: transcript {:?} ({} ms)",
            session.id,
            transcript.text,
            transcript.latency.as_millis()
        );
        self.state.lock().unwrap().last_transcript = Some(transcript.text.clone());

        if transcript.is_blank() {
            // Absence of speech is a normal outcome, not an error.
            self.finish(session, SessionState::Completed, "No speech detected");
            return;
        }

        if self.token.is_cancelled() {
            self.finish(session, SessionState::Cancelled, "Stopped");
            return;
        }

        // ── Generating ───────────────────────────────────────────────────
        self.enter(session, SessionState::Generating, "Thinking...");

        let reply = self.generate(&transcript).await;
        log::debug!(
            "session {}: reply {:?} ({} ms)",
            session.id,
            reply.text,
            reply.latency.as_millis()
        );
        self.state.lock().unwrap().last_reply = Some(reply.text.clone());

        if self.token.is_cancelled() {
            // Skip synthesis; a cancel only prevents future stages.
            self.finish(session, SessionState::Cancelled, "Stopped");
            return;
        }

        // ── Synthesizing ─────────────────────────────────────────────────
        self.enter(session, SessionState::Synthesizing, "Speaking...");

        // Best-effort and non-cancellable once started: there is no safe
        // mid-utterance abort, and a missing voice must not fail the session.
        if let Err(e) = self.tts.say(&reply.text).await {
            log::warn!("synthesis failed ({e}); completing without audio");
        }

        self.finish(session, SessionState::Completed, "Done");
    }

    /// Capture one bounded clip on the blocking pool, polling the cancel
    /// flag inside the read loop.
    async fn record(&self) -> Result<AudioClip, CaptureError> {
        let source = Arc::clone(&self.source);
        let token = Arc::clone(&self.token);
        let duration = self.settings.record_duration;

        match tokio::task::spawn_blocking(move || source.capture(duration, &token)).await {
            Ok(result) => result,
            Err(e) => Err(CaptureError::Task(e.to_string())),
        }
    }

    /// Persist-then-delete transcription.
    ///
    /// The scratch WAV exists only for the duration of the provider call;
    /// removal is retried a bounded number of times and any leftover is
    /// logged, never fatal.  Every transcription failure degrades to an
    /// empty transcript.
    async fn transcribe(&self, session_id: u64, clip: AudioClip) -> Transcript {
        let started = Instant::now();
        let path = scratch::scratch_path(&self.settings.scratch_dir, session_id);

        let write_path = path.clone();
        let written =
            tokio::task::spawn_blocking(move || scratch::write_wav(&write_path, &clip)).await;

        let text = match written {
            Ok(Ok(())) => match self.stt.transcribe(&path).await {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("transcription failed ({e}); treating as no speech");
                    String::new()
                }
            },
            Ok(Err(e)) => {
                log::warn!("failed to persist clip ({e}); treating as no speech");
                String::new()
            }
            Err(e) => {
                log::warn!("scratch write task failed ({e}); treating as no speech");
                String::new()
            }
        };

        if let Err(e) = scratch::remove_with_retry(&path).await {
            log::warn!("could not delete scratch file {}: {e}", path.display());
        }

        Transcript {
            text,
            latency: started.elapsed(),
        }
    }

    /// Generate the reply; a failing provider is substituted with the fixed
    /// fallback so generation cannot fail from the session's point of view.
    async fn generate(&self, transcript: &Transcript) -> Reply {
        let started = Instant::now();

        let text = match self.llm.generate(&transcript.text).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("generation failed ({e}); substituting fallback reply");
                FALLBACK_REPLY.to_string()
            }
        };

        Reply {
            text,
            latency: started.elapsed(),
        }
    }

    fn enter(&self, session: &mut InteractionSession, stage: SessionState, message: &str) {
        session.state = stage;
        {
            let mut st = self.state.lock().unwrap();
            st.session = stage;
            if stage == SessionState::Recording {
                st.last_transcript = None;
                st.last_reply = None;
                st.error_message = None;
            }
        }
        self.sink.notify(StatusEvent::new(stage, message));
    }

    fn finish(
        &self,
        session: &mut InteractionSession,
        terminal: SessionState,
        message: impl Into<String>,
    ) {
        let message = message.into();
        session.state = terminal;
        {
            let mut st = self.state.lock().unwrap();
            st.session = terminal;
            if terminal == SessionState::Failed {
                st.error_message = Some(message.clone());
            }
        }
        self.sink.notify(StatusEvent::new(terminal, message));
        log::info!(
            "session {} ended {} after {} ms",
            session.id,
            terminal.label(),
            session.elapsed().as_millis()
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
