pub mod audio_io;
pub mod language;
#[cfg(feature = "vosk")]
mod recognizer;

#[cfg(feature = "vosk")]
pub use recognizer::SpeechRecognizer;

use serde::Serialize;

/// Sample rate the recognition engine expects.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Frames handed to the engine per `accept_waveform` call.
pub const CHUNK_FRAMES: usize = 4000;

#[derive(thiserror::Error, Debug)]
pub enum AsrError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("audio decode error: {0}")]
    Audio(String),
    #[error("audio conversion failed: {0}")]
    Convert(String),
    #[error("no speech model available at {0}")]
    ModelUnavailable(String),
    #[error("speech engine failure: {0}")]
    Engine(String),
}

/// Final transcription for one input file.
#[derive(Debug, Serialize)]
pub struct Transcription {
    pub text: String,
    pub confidence: f32,
    pub language: &'static str,
    pub offline: bool,
}
