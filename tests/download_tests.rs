use std::cell::{Cell, RefCell};
use std::fs;
use std::io::{Cursor, Write};

use offline_voice::models::{
    DownloadOutcome, Fetch, FetchError, ModelStore, ProgressObserver, StoreError,
};
use zip::write::FileOptions;
use zip::ZipWriter;

/// Build a zip body shaped like a real model archive: one top-level
/// directory with the engine's conventional layout inside.
fn model_zip(archive_name: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .add_directory(format!("{archive_name}/"), FileOptions::default())
        .unwrap();
    writer
        .start_file(format!("{archive_name}/am/final.mdl"), FileOptions::default())
        .unwrap();
    writer.write_all(b"acoustic model").unwrap();
    writer
        .start_file(
            format!("{archive_name}/conf/model.conf"),
            FileOptions::default(),
        )
        .unwrap();
    writer.write_all(b"--sample-frequency=16000").unwrap();
    writer.finish().unwrap().into_inner()
}

/// Serves one canned body for every URL and counts calls.
struct ServeBody {
    body: Vec<u8>,
    calls: Cell<usize>,
}

impl ServeBody {
    fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            calls: Cell::new(0),
        }
    }
}

impl Fetch for ServeBody {
    fn fetch(
        &self,
        _url: &str,
        sink: &mut dyn Write,
        observer: Option<ProgressObserver>,
    ) -> Result<u64, FetchError> {
        self.calls.set(self.calls.get() + 1);
        sink.write_all(&self.body)?;
        if let Some(observer) = observer {
            observer(1.0);
        }
        Ok(self.body.len() as u64)
    }
}

/// Fails every request with the given HTTP status.
struct FailWith(u16);

impl Fetch for FailWith {
    fn fetch(
        &self,
        _url: &str,
        _sink: &mut dyn Write,
        _observer: Option<ProgressObserver>,
    ) -> Result<u64, FetchError> {
        Err(FetchError::Status(self.0))
    }
}

/// Serves a model archive only for URLs containing `serve_marker`; every
/// other request fails.
struct KeyedFetch {
    serve_marker: &'static str,
    archive_name: &'static str,
}

impl Fetch for KeyedFetch {
    fn fetch(
        &self,
        url: &str,
        sink: &mut dyn Write,
        _observer: Option<ProgressObserver>,
    ) -> Result<u64, FetchError> {
        if !url.contains(self.serve_marker) {
            return Err(FetchError::Status(500));
        }
        let body = model_zip(self.archive_name);
        sink.write_all(&body)?;
        Ok(body.len() as u64)
    }
}

fn store_in(tmp: &tempfile::TempDir) -> ModelStore {
    ModelStore::new(tmp.path().join("models")).expect("store should open")
}

fn residual_archives(store: &ModelStore) -> Vec<String> {
    fs::read_dir(store.root())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".zip"))
        .collect()
}

#[test]
fn download_extracts_archive_and_removes_staging_file() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(&tmp);
    let fetcher = ServeBody::new(model_zip("vosk-model-small-hi-0.22"));

    let outcome = store
        .download_with("small-hi", &fetcher, None)
        .unwrap();

    assert_eq!(outcome, DownloadOutcome::Downloaded);
    assert!(store.is_downloaded("vosk-model-small-hi-0.22"));
    assert!(store
        .root()
        .join("vosk-model-small-hi-0.22/am/final.mdl")
        .is_file());
    assert!(residual_archives(&store).is_empty());
}

#[test]
fn second_download_is_already_present_without_network() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(&tmp);
    let fetcher = ServeBody::new(model_zip("vosk-model-small-hi-0.22"));

    let first = store.download_with("small-hi", &fetcher, None).unwrap();
    let second = store.download_with("small-hi", &fetcher, None).unwrap();

    assert_eq!(first, DownloadOutcome::Downloaded);
    assert_eq!(second, DownloadOutcome::AlreadyPresent);
    assert_eq!(fetcher.calls.get(), 1);
}

#[test]
fn transport_failure_leaves_no_staging_file() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(&tmp);

    let err = store
        .download_with("small-en", &FailWith(500), None)
        .unwrap_err();

    match err {
        StoreError::Transport { key, reason } => {
            assert_eq!(key, "small-en");
            assert!(reason.contains("500"), "got: {reason}");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
    assert!(residual_archives(&store).is_empty());
    assert!(!store.is_downloaded("vosk-model-small-en-us-0.15"));
}

#[test]
fn corrupt_archive_is_an_extraction_error_with_cleanup() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(&tmp);
    let fetcher = ServeBody::new(b"definitely not a zip archive".to_vec());

    let err = store
        .download_with("small-hi", &fetcher, None)
        .unwrap_err();

    assert!(matches!(err, StoreError::Extraction { key: "small-hi", .. }));
    assert!(residual_archives(&store).is_empty());
    assert!(!store.is_downloaded("vosk-model-small-hi-0.22"));
}

#[test]
fn traversal_entries_never_escape_the_root() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(&tmp);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("../escaped.txt", FileOptions::default())
        .unwrap();
    writer.write_all(b"should never land").unwrap();
    let fetcher = ServeBody::new(writer.finish().unwrap().into_inner());

    let err = store
        .download_with("small-hi", &fetcher, None)
        .unwrap_err();

    assert!(matches!(err, StoreError::Extraction { .. }));
    assert!(!tmp.path().join("escaped.txt").exists());
    assert!(!store.root().join("escaped.txt").exists());
    assert!(residual_archives(&store).is_empty());
}

#[test]
fn recommended_batch_does_not_short_circuit_on_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(&tmp);

    // small-hi (first recommended entry) fails, small-en succeeds.
    let fetcher = KeyedFetch {
        serve_marker: "small-en",
        archive_name: "vosk-model-small-en-us-0.15",
    };

    let report = store.download_recommended_with(&fetcher, None);

    assert!(!report.all_ok());
    let keys: Vec<_> = report.entries.iter().map(|e| e.key).collect();
    assert_eq!(keys, vec!["small-hi", "small-en"]);
    assert!(report.entries[0].result.is_err());
    assert!(report.entries[1].result.is_ok());
    assert!(store.is_downloaded("vosk-model-small-en-us-0.15"));
}

#[test]
fn recommended_batch_with_everything_present_is_ok() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(&tmp);
    fs::create_dir_all(store.root().join("vosk-model-small-hi-0.22")).unwrap();
    fs::create_dir_all(store.root().join("vosk-model-small-en-us-0.15")).unwrap();

    // Any network call would fail; presence checks must short-circuit them.
    let report = store.download_recommended_with(&FailWith(500), None);

    assert!(report.all_ok());
    assert!(report
        .entries
        .iter()
        .all(|e| matches!(e.result, Ok(DownloadOutcome::AlreadyPresent))));
}

#[test]
fn observer_sees_completion() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(&tmp);
    let fetcher = ServeBody::new(model_zip("vosk-model-small-hi-0.22"));

    let seen: RefCell<Vec<f64>> = RefCell::new(Vec::new());
    let observer = |fraction: f64| seen.borrow_mut().push(fraction);

    store
        .download_with("small-hi", &fetcher, Some(&observer))
        .unwrap();

    assert_eq!(seen.into_inner(), vec![1.0]);
}
