//! Offline speech recognition utilities: a Vosk model acquisition manager
//! and a thin file-transcription wrapper around the Vosk engine.

pub mod asr;
pub mod models;
