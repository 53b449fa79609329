//! Tests for Engine
//!
//! These tests verify:
//! - Command execution against both storage variants
//! - Absent keys map to an empty 200, storage failures to a 500
//! - Opening from config

use snapkv::config::{Config, SnapshotFormat};
use snapkv::engine::Engine;
use snapkv::protocol::{Command, Status};
use snapkv::storage::{DurableStorage, Storage};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_engine() -> (TempDir, Engine<DurableStorage>) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .snapshot_path(temp_dir.path().join("data.json"))
        .build();
    let engine = Engine::open_durable(&config).unwrap();
    (temp_dir, engine)
}

fn set(key: &str, value: &str) -> Command {
    Command::Set {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn get(key: &str) -> Command {
    Command::Get {
        key: key.to_string(),
    }
}

// =============================================================================
// Command Execution Tests
// =============================================================================

#[test]
fn test_engine_execute_set_then_get() {
    let (_temp, engine) = setup_temp_engine();

    let response = engine.execute(set("somekey", "somevalue"));
    assert_eq!(response.status, Status::Ok);
    assert!(response.body.is_empty());

    let response = engine.execute(get("somekey"));
    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.body, b"somevalue".to_vec());
}

#[test]
fn test_engine_execute_get_absent_is_ok_and_empty() {
    let (_temp, engine) = setup_temp_engine();

    let response = engine.execute(get("nothing"));

    assert_eq!(response.status, Status::Ok);
    assert!(response.body.is_empty());
}

#[test]
fn test_engine_execute_set_failure_is_server_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("gone").join("data.json");
    let engine = Engine::new(DurableStorage::open(&path, SnapshotFormat::Json));

    let response = engine.execute(set("k", "v"));

    assert_eq!(response.status, Status::InternalError);
    assert!(!response.body.is_empty());
    assert_eq!(engine.execute(get("k")).body, Vec::<u8>::new());
}

#[test]
fn test_engine_memory_variant() {
    let engine = Engine::open_memory();

    engine.execute(set("a", "1"));
    assert_eq!(engine.get("a"), "1");
    assert_eq!(engine.get("b"), "");
    assert_eq!(engine.storage().len(), 1);
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_open_durable_creates_parent_directory() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("nested").join("db");
    let config = Config::builder().snapshot_path(dir.join("data.json")).build();

    let engine = Engine::open_durable(&config).unwrap();
    assert!(dir.is_dir());

    engine.set("k", "v").unwrap();
    assert!(dir.join("data.json").exists());
}

#[test]
fn test_open_durable_reloads_previous_state() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .snapshot_path(temp_dir.path().join("data.bin"))
        .snapshot_format(SnapshotFormat::Binary)
        .build();

    {
        let engine = Engine::open_durable(&config).unwrap();
        engine.set("k1", "v1").unwrap();
        engine.set("k2", "v2").unwrap();
    }

    let engine = Engine::open_durable(&config).unwrap();
    assert_eq!(engine.get("k1"), "v1");
    assert_eq!(engine.get("k2"), "v2");
    assert_eq!(engine.get("k3"), "");
}

#[test]
fn test_open_durable_rejects_invalid_config() {
    let config = Config::builder().snapshot_path("").build();
    assert!(Engine::open_durable(&config).is_err());
}
