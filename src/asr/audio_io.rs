//! Audio normalization for the recognizer.
//!
//! The engine wants mono 16-bit linear PCM at a fixed rate. Anything else is
//! pushed through the external `ffmpeg` binary, which is treated as a black
//! box: it either leaves a WAV at the requested path or fails. WAV parsing
//! itself goes through `hound`.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::AsrError;

/// Load `path` as mono 16-bit PCM samples at `sample_rate`, converting
/// through ffmpeg when the input is not already in that shape. Converted
/// intermediates are staged next to the input and removed before returning.
pub fn load_samples(path: &Path, sample_rate: u32) -> Result<Vec<i16>, AsrError> {
    let mut staged: Vec<PathBuf> = Vec::new();
    let result = load_samples_inner(path, sample_rate, &mut staged);

    for file in staged {
        if let Err(err) = std::fs::remove_file(&file) {
            log::warn!("could not remove converted file {}: {err}", file.display());
        }
    }

    result
}

fn load_samples_inner(
    path: &Path,
    sample_rate: u32,
    staged: &mut Vec<PathBuf>,
) -> Result<Vec<i16>, AsrError> {
    let wav_path = if is_wav(path) {
        path.to_path_buf()
    } else {
        let converted = sibling(path, "converted");
        convert(path, &converted, sample_rate, false)?;
        staged.push(converted.clone());
        converted
    };

    let reader = open_wav(&wav_path)?;
    let spec = reader.spec();
    if spec_matches(spec, sample_rate) {
        return read_all(reader, &wav_path);
    }

    log::warn!(
        "audio format {}ch {}bit {}Hz, converting to 1ch 16bit {}Hz",
        spec.channels,
        spec.bits_per_sample,
        spec.sample_rate,
        sample_rate
    );

    let formatted = sibling(&wav_path, "formatted");
    convert(&wav_path, &formatted, sample_rate, true)?;
    staged.push(formatted.clone());

    let reader = open_wav(&formatted)?;
    read_all(reader, &formatted)
}

fn open_wav(path: &Path) -> Result<hound::WavReader<std::io::BufReader<std::fs::File>>, AsrError> {
    hound::WavReader::open(path).map_err(|e| AsrError::Audio(format!("{}: {e}", path.display())))
}

fn read_all(
    mut reader: hound::WavReader<std::io::BufReader<std::fs::File>>,
    path: &Path,
) -> Result<Vec<i16>, AsrError> {
    reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AsrError::Audio(format!("{}: {e}", path.display())))
}

fn spec_matches(spec: hound::WavSpec, sample_rate: u32) -> bool {
    spec.channels == 1
        && spec.bits_per_sample == 16
        && spec.sample_rate == sample_rate
        && spec.sample_format == hound::SampleFormat::Int
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    path.with_file_name(format!("{stem}_{suffix}.wav"))
}

fn convert(
    input: &Path,
    output: &Path,
    sample_rate: u32,
    force_s16: bool,
) -> Result<(), AsrError> {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-i")
        .arg(input)
        .arg("-ar")
        .arg(sample_rate.to_string())
        .arg("-ac")
        .arg("1");
    if force_s16 {
        cmd.arg("-sample_fmt").arg("s16");
    }
    cmd.arg("-f").arg("wav").arg("-y").arg(output);

    log::debug!("running ffmpeg: {cmd:?}");
    let ran = cmd
        .output()
        .map_err(|e| AsrError::Convert(format!("could not run ffmpeg: {e}")))?;

    if !ran.status.success() {
        let stderr = String::from_utf8_lossy(&ran.stderr);
        return Err(AsrError::Convert(format!(
            "ffmpeg exited with {}: {}",
            ran.status,
            stderr.trim()
        )));
    }

    Ok(())
}
