//! Application entry point — press-to-talk voice assistant console.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the four pipeline collaborators from config.
//! 5. Wire the [`InteractionController`] with a channel-backed status feed.
//! 6. Run the stdin command loop — blocks the main thread until `quit`.

use std::io::{self, BufRead};
use std::sync::{mpsc, Arc};

use async_trait::async_trait;
use voice_assistant::{
    audio::{AudioSource, MicSource},
    config::AppConfig,
    llm::{ApiGenerator, SafeGenerator, TextGenerator},
    pipeline::{
        new_shared_state, CancellationToken, ChannelSink, InteractionController, SessionSettings,
        StatusEvent,
    },
    stt::{HttpTranscriber, SpeechToText},
    tts::{ApiSynthesizer, TextToSpeech, TtsError},
};

// ---------------------------------------------------------------------------
// MuteSynthesizer
// ---------------------------------------------------------------------------

/// Stand-in synthesizer used when speech output is disabled in settings.
/// Replies still land in the status feed and shared state; nothing is
/// spoken.
struct MuteSynthesizer;

#[async_trait]
impl TextToSpeech for MuteSynthesizer {
    async fn say(&self, _text: &str) -> Result<(), TtsError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Status printer
// ---------------------------------------------------------------------------

/// Drains the status channel onto stdout so the user sees stage transitions
/// as they happen.  Runs on its own thread; exits when the controller (the
/// only sender) is dropped.
fn spawn_status_printer(rx: mpsc::Receiver<StatusEvent>) {
    std::thread::spawn(move || {
        for event in rx {
            println!("[{}] {}", event.stage.label(), event.message);
        }
    });
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Voice assistant starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (2 worker threads — capture and playback both park one
    //    in spawn_blocking while API calls run on the other)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    // Keep the runtime context entered so `start()` can spawn from this
    // thread.
    let _guard = rt.enter();

    // 4. Pipeline collaborators
    let source: Arc<dyn AudioSource> = Arc::new(MicSource::new(
        config.audio.input_device.clone(),
        config.audio.sample_rate,
    ));
    let stt: Arc<dyn SpeechToText> = Arc::new(HttpTranscriber::from_config(&config.stt));
    let llm: Arc<dyn TextGenerator> =
        Arc::new(SafeGenerator::new(ApiGenerator::from_config(&config.llm)));
    let tts: Arc<dyn TextToSpeech> = if config.tts.enabled {
        Arc::new(ApiSynthesizer::from_config(&config.tts))
    } else {
        log::info!("Speech output disabled in settings; replies will be text-only");
        Arc::new(MuteSynthesizer)
    };

    // 5. Controller + status feed
    let (status_tx, status_rx) = mpsc::channel();
    spawn_status_printer(status_rx);

    let controller = InteractionController::new(
        new_shared_state(),
        Arc::new(CancellationToken::new()),
        source,
        stt,
        llm,
        tts,
        Arc::new(ChannelSink::new(status_tx)),
        SessionSettings::from_config(&config),
    );

    // 6. Command loop
    println!("Press Enter to talk ({}s window).", config.audio.record_secs);
    println!("Commands: stop (cancel current turn), quit");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            // A rejected start already reports "Interaction already in
            // progress" through the status feed.
            "" | "start" => {
                let _ = controller.start();
            }
            "stop" => controller.cancel(),
            "quit" | "exit" => break,
            other => println!("Unknown command: {other:?} (try Enter, stop, quit)"),
        }
    }

    log::info!("Shutting down");
    Ok(())
}
