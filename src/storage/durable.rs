//! Durable storage
//!
//! A map in memory, mirrored by a snapshot file on disk.
//!
//! ## Concurrency Model: Many Readers / One Writer
//!
//! - **Reads** (`get`, `contains`, `len`): reader mode on the gate lock,
//!   concurrent with each other.
//! - **Writes** (`set`): writer mode. The map is updated and the whole
//!   snapshot rewritten before the guard drops, so a write that returned `Ok`
//!   is already on disk and memory never runs ahead of it.
//!
//! The snapshot file is only ever written while the write guard is held.

use std::path::{Path, PathBuf};

use crate::config::{Config, SnapshotFormat};
use crate::error::{Result, SnapError};
use crate::sync::GateLock;

use super::snapshot::{self, Mapping, SnapshotWriter};
use super::Storage;

/// Snapshot-backed storage, safe to share between threads
pub struct DurableStorage {
    /// In-memory mapping, guarded by the three-gate lock
    data: GateLock<Mapping>,

    /// Atomic snapshot writer for the configured path
    writer: SnapshotWriter,
}

impl DurableStorage {
    /// Open storage backed by the snapshot at `path`
    ///
    /// A missing or unreadable snapshot gives an empty store. The parent
    /// directory is not created here; `set` fails until it exists.
    pub fn open(path: impl Into<PathBuf>, format: SnapshotFormat) -> Self {
        Self::with_writer(SnapshotWriter::new(path, format))
    }

    /// Open storage that persists through `writer`
    pub fn with_writer(writer: SnapshotWriter) -> Self {
        let data = snapshot::load_or_empty(writer.path());

        tracing::debug!(
            "Opened durable storage at {} ({} keys, {:?} writes)",
            writer.path().display(),
            data.len(),
            writer.format()
        );

        Self {
            data: GateLock::new(data),
            writer,
        }
    }

    /// Open with the snapshot path and format from `config`
    pub fn from_config(config: &Config) -> Self {
        Self::open(&config.snapshot_path, config.snapshot_format)
    }

    /// Snapshot file path
    pub fn path(&self) -> &Path {
        self.writer.path()
    }

    /// Copy of the current mapping
    pub fn to_mapping(&self) -> Mapping {
        self.data.read().clone()
    }
}

impl Storage for DurableStorage {
    fn get(&self, key: &str) -> String {
        let data = self.data.read();
        data.get(key).cloned().unwrap_or_default()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self.data.write();
        let previous = data.insert(key.to_string(), value.to_string());

        match self.writer.write(&data) {
            Ok(()) => Ok(()),
            Err(e @ SnapError::DirSync(_)) => {
                // The new snapshot is already in place; memory keeps the write
                tracing::error!(
                    "Snapshot {} replaced but not synced for key {:?}: {}",
                    self.writer.path().display(),
                    key,
                    e
                );
                Err(e)
            }
            Err(e) => {
                // Snapshot still holds the last committed state
                match previous {
                    Some(old) => {
                        data.insert(key.to_string(), old);
                    }
                    None => {
                        data.remove(key);
                    }
                }
                tracing::error!(
                    "Failed to persist snapshot {} for key {:?}: {}",
                    self.writer.path().display(),
                    key,
                    e
                );
                Err(e)
            }
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    fn len(&self) -> usize {
        self.data.read().len()
    }
}
