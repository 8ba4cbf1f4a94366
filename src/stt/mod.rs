//! Speech-to-text provider interface.
//!
//! [`SpeechToText`] is the seam the controller talks through;
//! [`HttpTranscriber`] is the production implementation for any
//! Deepgram-style prerecorded endpoint.

pub mod transcriber;

pub use transcriber::{HttpTranscriber, SpeechToText, SttError};
