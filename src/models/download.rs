//! Streamed archive transport and traversal-safe zip extraction.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

const CHUNK_SIZE: usize = 8192;

/// Receives a monotonically increasing completion fraction in `[0, 1]`.
pub type ProgressObserver<'a> = &'a dyn Fn(f64);

/// Transport boundary to the archive host. The production implementation
/// streams over HTTP; tests substitute canned bodies and failures.
pub trait Fetch {
    /// Stream the body at `url` into `sink`, reporting progress whenever the
    /// response declares a total length. Returns the byte count written.
    fn fetch(
        &self,
        url: &str,
        sink: &mut dyn Write,
        observer: Option<ProgressObserver>,
    ) -> Result<u64, FetchError>;
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("read failed: {0}")]
    Read(String),
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

/// Single-attempt blocking HTTP transport. No retry: a failed download is
/// surfaced immediately and the caller decides what to do.
pub struct HttpFetch;

impl Fetch for HttpFetch {
    fn fetch(
        &self,
        url: &str,
        sink: &mut dyn Write,
        observer: Option<ProgressObserver>,
    ) -> Result<u64, FetchError> {
        let response =
            reqwest::blocking::get(url).map_err(|e| FetchError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let total = response.content_length().unwrap_or(0);
        let mut reader = response;
        copy_with_progress(&mut reader, sink, total, observer)
    }
}

/// Fixed-size chunk copy loop shared by transports. Progress is emitted only
/// when `total` is known, and only when the fraction actually advances.
fn copy_with_progress(
    reader: &mut dyn Read,
    sink: &mut dyn Write,
    total: u64,
    observer: Option<ProgressObserver>,
) -> Result<u64, FetchError> {
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut downloaded: u64 = 0;
    let mut last_fraction = 0.0f64;

    loop {
        let n = reader
            .read(&mut buffer)
            .map_err(|e| FetchError::Read(e.to_string()))?;
        if n == 0 {
            return Ok(downloaded);
        }

        sink.write_all(&buffer[..n])?;
        downloaded += n as u64;

        if total > 0 {
            if let Some(observer) = observer {
                let fraction = (downloaded as f64 / total as f64).min(1.0);
                if fraction > last_fraction {
                    last_fraction = fraction;
                    observer(fraction);
                }
            }
        }
    }
}

/// Extract `archive` into `root`. The archive host is untrusted: entries
/// whose paths would escape the root (parent traversal, absolute paths) are
/// rejected and nothing is written for them.
pub(crate) fn extract_archive(archive: &Path, root: &Path) -> Result<(), String> {
    let file = fs::File::open(archive).map_err(|e| format!("open archive: {e}"))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| format!("not a valid zip archive: {e}"))?;

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| format!("read entry {index}: {e}"))?;

        let relative = match entry.enclosed_name() {
            Some(path) => path.to_path_buf(),
            None => return Err(format!("unsafe entry path: {}", entry.name())),
        };
        let target = root.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| format!("create {}: {e}", target.display()))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("create {}: {e}", parent.display()))?;
            }
            let mut out = fs::File::create(&target)
                .map_err(|e| format!("create {}: {e}", target.display()))?;
            io::copy(&mut entry, &mut out)
                .map_err(|e| format!("write {}: {e}", target.display()))?;
        }
    }

    Ok(())
}
