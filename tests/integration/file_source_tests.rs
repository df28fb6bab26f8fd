//! Local file source integration tests
//!
//! Tests for reading `{vehicle}_{date}.json` payloads from a data directory,
//! the single-file fallback and missing-file errors.

use fleetlog::adapters::{FileSource, SourceError, TelemetrySource};
use fleetlog::dashboard::Dashboard;
use fleetlog::parsers::{JsonPayload, PayloadParser};
use fleetlog::state::LoadStatus;

use crate::common::{fixture_path, scratch_dir, synthetic, test_key};

#[test]
fn test_directory_source_reads_selection_file() {
    let source = FileSource::directory(fixture_path("."));
    let body = source.fetch(&test_key("KT-204")).unwrap();
    let raw = JsonPayload.parse(&body).unwrap();
    assert_eq!(raw.digital.len(), 2);
}

#[test]
fn test_missing_selection_file_is_not_found() {
    let dir = scratch_dir("file-source-missing");
    let source = FileSource::directory(&dir);
    let err = source.fetch(&test_key("KT-999")).unwrap_err();
    assert!(matches!(err, SourceError::NotFound(path) if path.ends_with("KT-999_2024-05-02.json")));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_single_file_serves_every_selection() {
    let dir = scratch_dir("file-source-single");
    let path = dir.join("data.json");
    std::fs::write(&path, synthetic::payload_json(1, 1, 30)).unwrap();

    let source = FileSource::file(&path);
    assert_eq!(source.path_for(&test_key("A")), path);
    assert_eq!(source.path_for(&test_key("B")), path);
    assert!(source.describe().ends_with("data.json"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_directory_source_end_to_end() {
    let dir = scratch_dir("file-source-e2e");
    let key = test_key("KT-204");
    std::fs::write(dir.join(FileSource::file_name(&key)), synthetic::payload_json(2, 2, 90)).unwrap();

    let source = FileSource::directory(&dir);
    let raw = JsonPayload.parse(&source.fetch(&key).unwrap()).unwrap();

    let mut dashboard = Dashboard::default();
    let ticket = dashboard.begin_load(key);
    dashboard.accept_payload(&ticket, raw);
    while dashboard.process_frame() {}

    assert_eq!(dashboard.status(), &LoadStatus::Ready);
    assert_eq!(dashboard.series().len(), 4);

    let _ = std::fs::remove_dir_all(dir);
}
