//! Tests for snapshot files
//!
//! These tests verify:
//! - A staged but uncommitted snapshot leaves the file byte-identical
//! - Commit replaces the snapshot in one step
//! - Binary checksum corruption is detected
//! - Loading falls back to an empty mapping

use std::fs;
use std::path::PathBuf;

use snapkv::config::SnapshotFormat;
use snapkv::storage::snapshot::{self, Mapping, SnapshotWriter, HEADER_SIZE};
use snapkv::SnapError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_path() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data.snap");
    (temp_dir, path)
}

fn mapping(entries: &[(&str, &str)]) -> Mapping {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// =============================================================================
// Crash Safety Tests
// =============================================================================

#[test]
fn test_uncommitted_stage_leaves_snapshot_untouched() {
    let (temp, path) = setup_temp_path();
    let writer = SnapshotWriter::new(&path, SnapshotFormat::Json);

    writer.write(&mapping(&[("a", "1")])).unwrap();
    let before = fs::read(&path).unwrap();

    let staged = writer.stage(&mapping(&[("a", "2"), ("b", "3")])).unwrap();
    let temp_path = staged.temp_path().to_path_buf();

    // Temp file lives next to the snapshot and is complete before the rename
    assert_eq!(temp_path.parent(), Some(temp.path()));
    assert_eq!(
        snapshot::load(&temp_path).unwrap(),
        mapping(&[("a", "2"), ("b", "3")])
    );
    assert_eq!(fs::read(&path).unwrap(), before);

    // Process "dies" before commit
    drop(staged);

    assert_eq!(fs::read(&path).unwrap(), before);
    assert!(!temp_path.exists());
    assert_eq!(snapshot::load(&path).unwrap(), mapping(&[("a", "1")]));
}

#[test]
fn test_commit_replaces_snapshot() {
    let (_temp, path) = setup_temp_path();
    let writer = SnapshotWriter::new(&path, SnapshotFormat::Binary);

    writer.write(&mapping(&[("a", "1")])).unwrap();

    let staged = writer.stage(&mapping(&[("a", "9")])).unwrap();
    let temp_path = staged.temp_path().to_path_buf();
    staged.commit().unwrap();

    assert!(!temp_path.exists());
    assert_eq!(snapshot::load(&path).unwrap(), mapping(&[("a", "9")]));
}

#[test]
fn test_relative_bare_file_name_uses_current_dir() {
    let writer = SnapshotWriter::new("bare-name.json", SnapshotFormat::Json);
    assert_eq!(writer.path(), PathBuf::from("bare-name.json").as_path());
    assert_eq!(writer.format(), SnapshotFormat::Json);
}

// =============================================================================
// Format Tests
// =============================================================================

#[test]
fn test_json_snapshot_is_readable_as_json() {
    let (_temp, path) = setup_temp_path();
    SnapshotWriter::new(&path, SnapshotFormat::Json)
        .write(&mapping(&[("somekey", "somevalue")]))
        .unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, r#"{"somekey":"somevalue"}"#);
}

#[test]
fn test_binary_checksum_mismatch_detected() {
    let (_temp, path) = setup_temp_path();
    SnapshotWriter::new(&path, SnapshotFormat::Binary)
        .write(&mapping(&[("key", "value")]))
        .unwrap();

    let mut bytes = fs::read(&path).unwrap();
    bytes[HEADER_SIZE + 2] ^= 0xFF;
    fs::write(&path, &bytes).unwrap();

    match snapshot::load(&path) {
        Err(SnapError::Snapshot(msg)) => assert!(msg.contains("checksum")),
        other => panic!("expected checksum error, got {:?}", other),
    }
    assert!(snapshot::load_or_empty(&path).is_empty());
}

#[test]
fn test_binary_truncated_detected() {
    let (_temp, path) = setup_temp_path();
    SnapshotWriter::new(&path, SnapshotFormat::Binary)
        .write(&mapping(&[("key", "value")]))
        .unwrap();

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..HEADER_SIZE]).unwrap();

    assert!(matches!(
        snapshot::load(&path),
        Err(SnapError::Snapshot(_))
    ));
}

#[test]
fn test_empty_mapping_snapshot() {
    let (_temp, path) = setup_temp_path();
    SnapshotWriter::new(&path, SnapshotFormat::Binary)
        .write(&Mapping::new())
        .unwrap();

    assert!(snapshot::load(&path).unwrap().is_empty());
}

// =============================================================================
// Load Fallback Tests
// =============================================================================

#[test]
fn test_load_missing_is_io_not_found() {
    let (_temp, path) = setup_temp_path();

    match snapshot::load(&path) {
        Err(SnapError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected NotFound, got {:?}", other),
    }
    assert!(snapshot::load_or_empty(&path).is_empty());
}

#[test]
fn test_load_non_string_json_is_unreadable() {
    let (_temp, path) = setup_temp_path();
    fs::write(&path, br#"{"a": 1}"#).unwrap();

    assert!(matches!(
        snapshot::load(&path),
        Err(SnapError::Serialization(_))
    ));
    assert!(snapshot::load_or_empty(&path).is_empty());
}
