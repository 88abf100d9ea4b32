//! Command-line surface: model catalog management and file transcription.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use offline_voice::models::{
    default_models_root, DownloadOutcome, HttpFetch, ModelStore,
};

#[derive(Debug, Parser)]
#[command(
    name = "offline-voice",
    about = "Manage offline speech models and transcribe audio files"
)]
struct Args {
    /// Root directory for downloaded models.
    #[arg(long, global = true)]
    models_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the model catalog with download markers.
    List,
    /// Download and extract one model archive.
    Download {
        /// Catalog key, e.g. `small-hi`.
        key: String,
    },
    /// Download every recommended model; failures do not stop the batch.
    DownloadRecommended,
    /// Print the store status as JSON.
    Status,
    /// Transcribe an audio file and print the result as JSON.
    #[cfg(feature = "vosk")]
    Transcribe {
        /// Audio file; non-WAV inputs are converted through ffmpeg.
        file: PathBuf,
        /// Language preference: `hi`, `en` or `or` (Odia maps to the Hindi
        /// models).
        #[arg(long, default_value = "hi")]
        language: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let root = args.models_dir.unwrap_or_else(default_models_root);

    match run(args.command, root) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, root: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let store = ModelStore::new(root)?;

    match command {
        Command::List => {
            for (model, downloaded) in store.list() {
                let marker = if downloaded { "downloaded" } else { "available " };
                let star = if model.recommended { " *" } else { "" };
                println!(
                    "[{marker}] {}: {} ({}){star}",
                    model.key, model.language_label, model.approximate_size
                );
                println!("             {}", model.archive_name);
            }
            println!();
            println!("* = recommended");
            Ok(())
        }
        Command::Download { key } => {
            let outcome = store.download_with(&key, &HttpFetch, Some(&print_progress))?;
            match outcome {
                DownloadOutcome::Downloaded => println!("downloaded {key}"),
                DownloadOutcome::AlreadyPresent => println!("{key} already present"),
            }
            Ok(())
        }
        Command::DownloadRecommended => {
            let report = store.download_recommended_with(&HttpFetch, Some(&print_progress));
            for entry in &report.entries {
                match &entry.result {
                    Ok(DownloadOutcome::Downloaded) => println!("{}: downloaded", entry.key),
                    Ok(DownloadOutcome::AlreadyPresent) => {
                        println!("{}: already present", entry.key)
                    }
                    Err(err) => println!("{}: failed ({err})", entry.key),
                }
            }
            if report.all_ok() {
                Ok(())
            } else {
                Err("one or more recommended models failed".into())
            }
        }
        Command::Status => {
            println!("{}", serde_json::to_string_pretty(&store.status())?);
            Ok(())
        }
        #[cfg(feature = "vosk")]
        Command::Transcribe { file, language } => {
            use offline_voice::asr::{SpeechRecognizer, TARGET_SAMPLE_RATE};
            use offline_voice::models::LanguagePreference;

            let preference = LanguagePreference::parse(&language)
                .ok_or_else(|| format!("unrecognized language preference: {language}"))?;
            let model_dir = store.resolve_best_available(preference).ok_or_else(|| {
                format!(
                    "no downloaded model for '{language}' under {}; run `download-recommended` first",
                    store.root().display()
                )
            })?;

            let recognizer = SpeechRecognizer::new(&model_dir, TARGET_SAMPLE_RATE)?;
            let result = recognizer.transcribe_file(&file)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}

/// Progress stays on one line; the fraction is already monotonic.
fn print_progress(fraction: f64) {
    eprint!("\rprogress: {:>5.1}%", fraction * 100.0);
    if fraction >= 1.0 {
        eprintln!();
    }
}
