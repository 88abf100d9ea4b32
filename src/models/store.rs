//! Filesystem-backed model store.
//!
//! Presence is the only state: a model counts as downloaded iff a directory
//! named after its archive exists under the root. Every check re-stats the
//! filesystem so external deletion or manual installs are always visible.
//!
//! All operations are synchronous and blocking. Concurrent downloads of the
//! same key race on the staging file and target directory; callers that run
//! downloads in parallel must serialize per archive name.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::catalog::{self, LanguagePreference, ModelDescriptor};
use super::download::{extract_archive, Fetch, FetchError, HttpFetch, ProgressObserver};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("unknown model key: {0}")]
    UnknownKey(String),
    #[error("download failed for {key}: {reason}")]
    Transport { key: &'static str, reason: String },
    #[error("extraction failed for {key}: {reason}")]
    Extraction { key: &'static str, reason: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a successful `download` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Archive was fetched and extracted.
    Downloaded,
    /// Model directory already existed; no network I/O was performed.
    AlreadyPresent,
}

/// Per-entry results of a recommended-batch download. A failing entry does
/// not stop later entries.
#[derive(Debug)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

#[derive(Debug)]
pub struct BatchEntry {
    pub key: &'static str,
    pub result: Result<DownloadOutcome, StoreError>,
}

impl BatchReport {
    /// True only when every recommended entry downloaded or was present.
    pub fn all_ok(&self) -> bool {
        self.entries.iter().all(|entry| entry.result.is_ok())
    }
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub models_directory: PathBuf,
    pub downloaded_models: Vec<DownloadedModel>,
    pub available_for_download: Vec<AvailableModel>,
}

#[derive(Debug, Serialize)]
pub struct DownloadedModel {
    pub key: &'static str,
    pub name: &'static str,
    pub language: &'static str,
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct AvailableModel {
    pub key: &'static str,
    pub name: &'static str,
    pub language: &'static str,
    pub size: &'static str,
}

pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Exact directory-name match under the root; no partial or
    /// case-insensitive matching.
    pub fn is_downloaded(&self, archive_name: &str) -> bool {
        self.root.join(archive_name).is_dir()
    }

    /// Catalog entries in declaration order with current on-disk presence.
    pub fn list(&self) -> Vec<(&'static ModelDescriptor, bool)> {
        catalog::CATALOG
            .iter()
            .map(|model| (model, self.is_downloaded(model.archive_name)))
            .collect()
    }

    pub fn download(&self, key: &str) -> Result<DownloadOutcome, StoreError> {
        self.download_with(key, &HttpFetch, None)
    }

    /// Download and extract one model archive through `fetcher`.
    ///
    /// The archive streams to a staging file `root/<archive>.zip` which is
    /// removed unconditionally once extraction has been attempted, and on
    /// any failure after it was created. Removal failures are logged and
    /// never override the primary error.
    pub fn download_with(
        &self,
        key: &str,
        fetcher: &dyn Fetch,
        observer: Option<ProgressObserver>,
    ) -> Result<DownloadOutcome, StoreError> {
        let model = catalog::find(key).ok_or_else(|| StoreError::UnknownKey(key.to_string()))?;

        if self.is_downloaded(model.archive_name) {
            log::info!("model {} already present", model.archive_name);
            return Ok(DownloadOutcome::AlreadyPresent);
        }

        log::info!(
            "downloading {} ({}) from {}",
            model.archive_name,
            model.approximate_size,
            model.source_url
        );

        let staging = self.root.join(format!("{}.zip", model.archive_name));
        let result = self.fetch_and_extract(model, &staging, fetcher, observer);
        remove_staging(&staging);
        result?;

        log::info!(
            "model {} ready under {}",
            model.archive_name,
            self.root.display()
        );
        Ok(DownloadOutcome::Downloaded)
    }

    fn fetch_and_extract(
        &self,
        model: &ModelDescriptor,
        staging: &Path,
        fetcher: &dyn Fetch,
        observer: Option<ProgressObserver>,
    ) -> Result<(), StoreError> {
        {
            let mut sink = fs::File::create(staging)?;
            fetcher
                .fetch(model.source_url, &mut sink, observer)
                .map_err(|e| match e {
                    FetchError::Io(io) => StoreError::Io(io),
                    other => StoreError::Transport {
                        key: model.key,
                        reason: other.to_string(),
                    },
                })?;
        }

        extract_archive(staging, &self.root).map_err(|reason| StoreError::Extraction {
            key: model.key,
            reason,
        })
    }

    pub fn download_recommended(&self) -> BatchReport {
        self.download_recommended_with(&HttpFetch, None)
    }

    /// Run `download` for every recommended catalog entry in order. Does not
    /// short-circuit: a failure is recorded and the batch continues.
    pub fn download_recommended_with(
        &self,
        fetcher: &dyn Fetch,
        observer: Option<ProgressObserver>,
    ) -> BatchReport {
        let mut entries = Vec::new();
        for model in catalog::recommended() {
            let result = self.download_with(model.key, fetcher, observer);
            if let Err(err) = &result {
                log::error!("recommended model {} failed: {err}", model.key);
            }
            entries.push(BatchEntry {
                key: model.key,
                result,
            });
        }
        BatchReport { entries }
    }

    /// Path of the best already-downloaded model for `preference`, following
    /// the per-preference priority table. None when nothing usable is on
    /// disk.
    pub fn resolve_best_available(&self, preference: LanguagePreference) -> Option<PathBuf> {
        preference.priority().iter().find_map(|key| {
            let model = catalog::find(key)?;
            if self.is_downloaded(model.archive_name) {
                Some(self.root.join(model.archive_name))
            } else {
                None
            }
        })
    }

    /// Downloaded/available partitions, each in catalog order.
    pub fn status(&self) -> StatusReport {
        let mut downloaded = Vec::new();
        let mut available = Vec::new();

        for model in catalog::CATALOG {
            if self.is_downloaded(model.archive_name) {
                downloaded.push(DownloadedModel {
                    key: model.key,
                    name: model.archive_name,
                    language: model.language_label,
                    path: self.root.join(model.archive_name),
                });
            } else {
                available.push(AvailableModel {
                    key: model.key,
                    name: model.archive_name,
                    language: model.language_label,
                    size: model.approximate_size,
                });
            }
        }

        StatusReport {
            models_directory: self.root.clone(),
            downloaded_models: downloaded,
            available_for_download: available,
        }
    }
}

fn remove_staging(staging: &Path) {
    if !staging.exists() {
        return;
    }
    if let Err(err) = fs::remove_file(staging) {
        log::warn!(
            "could not remove staging archive {}: {err}",
            staging.display()
        );
    }
}
