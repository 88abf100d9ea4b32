//! Pass-through to the Vosk engine.
//!
//! No recognition logic lives here: the engine gets chunks of PCM and hands
//! back text. This wrapper only owns the model handle, the decode loop, and
//! assembly of the final transcription record.

use std::path::Path;

use vosk::{CompleteResult, DecodingState, Model, Recognizer};

use super::audio_io;
use super::language::detect_language;
use super::{AsrError, Transcription, CHUNK_FRAMES};

pub struct SpeechRecognizer {
    model: Model,
    sample_rate: u32,
}

impl SpeechRecognizer {
    /// Load the model directory produced by a catalog download. The engine
    /// finds its files inside by convention.
    pub fn new(model_dir: &Path, sample_rate: u32) -> Result<Self, AsrError> {
        vosk::set_log_level(vosk::LogLevel::Error);

        let path = model_dir.to_string_lossy();
        let model = Model::new(path.as_ref())
            .ok_or_else(|| AsrError::ModelUnavailable(model_dir.display().to_string()))?;

        log::info!("loaded speech model from {}", model_dir.display());
        Ok(Self { model, sample_rate })
    }

    /// Transcribe a whole audio file. Input is normalized through
    /// `audio_io`, fed to the engine in fixed-size chunks, and finalized
    /// segments are joined into one transcript.
    pub fn transcribe_file(&self, audio: &Path) -> Result<Transcription, AsrError> {
        let samples = audio_io::load_samples(audio, self.sample_rate)?;

        let mut recognizer = Recognizer::new(&self.model, self.sample_rate as f32)
            .ok_or_else(|| {
                AsrError::Engine(format!(
                    "recognizer rejected sample rate {}",
                    self.sample_rate
                ))
            })?;

        let mut segments: Vec<String> = Vec::new();
        for chunk in samples.chunks(CHUNK_FRAMES) {
            match recognizer.accept_waveform(chunk) {
                Ok(DecodingState::Finalized) => push_text(recognizer.result(), &mut segments),
                Ok(_) => {}
                Err(err) => {
                    return Err(AsrError::Engine(format!("waveform rejected: {err:?}")));
                }
            }
        }
        push_text(recognizer.final_result(), &mut segments);

        let text = segments.join(" ").trim().to_string();
        Ok(Transcription {
            confidence: if text.is_empty() { 0.0 } else { 1.0 },
            language: detect_language(&text).code(),
            text,
            offline: true,
        })
    }
}

fn push_text(result: CompleteResult, segments: &mut Vec<String>) {
    if let Some(single) = result.single() {
        if !single.text.is_empty() {
            segments.push(single.text.to_string());
        }
    }
}
