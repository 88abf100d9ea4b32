pub mod catalog;
mod download;
mod store;

pub use catalog::{LanguagePreference, ModelDescriptor, CATALOG};
pub use download::{Fetch, FetchError, HttpFetch, ProgressObserver};
pub use store::{
    AvailableModel, BatchEntry, BatchReport, DownloadOutcome, DownloadedModel, ModelStore,
    StatusReport, StoreError,
};

use std::path::PathBuf;

const MODELS_DIR_ENV: &str = "OFFLINE_VOICE_MODELS_DIR";

/// Default models root: env override, then the platform data dir, then the
/// working directory.
pub fn default_models_root() -> PathBuf {
    if let Some(dir) = std::env::var_os(MODELS_DIR_ENV) {
        return PathBuf::from(dir);
    }

    let base = dirs_next::data_local_dir()
        .or_else(|| std::env::var_os("HOME").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join("offline-voice").join("models")
}
