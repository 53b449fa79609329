//! Configuration for SnapKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, SnapError};

/// Main configuration for a SnapKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the snapshot file (durable storage only)
    ///
    /// Temporary files are created next to it on every write, so the
    /// containing directory must be writable.
    pub snapshot_path: PathBuf,

    /// Encoding used when writing snapshots
    pub snapshot_format: SnapshotFormat,

    /// Which storage variant the server runs on
    pub storage_kind: StorageKind,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

/// On-disk snapshot encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotFormat {
    /// Flat JSON object (`{"key": "value"}`)
    #[default]
    Json,

    /// Magic header + bincode payload + CRC32 footer
    Binary,
}

/// Storage variant selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    /// Process memory only; requests are served one at a time
    Memory,

    /// Snapshot-backed; requests are served concurrently
    #[default]
    Durable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("./snapkv_data/data.json"),
            snapshot_format: SnapshotFormat::Json,
            storage_kind: StorageKind::Durable,
            listen_addr: "127.0.0.1:4000".to_string(),
            max_connections: 1024,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the config for values the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.snapshot_path.as_os_str().is_empty() {
            return Err(SnapError::Config("snapshot path is empty".to_string()));
        }
        if self.snapshot_path.file_name().is_none() {
            return Err(SnapError::Config(format!(
                "snapshot path has no file name: {}",
                self.snapshot_path.display()
            )));
        }
        if self.max_connections == 0 {
            return Err(SnapError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the snapshot file path
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.snapshot_path = path.into();
        self
    }

    /// Set the snapshot encoding
    pub fn snapshot_format(mut self, format: SnapshotFormat) -> Self {
        self.config.snapshot_format = format;
        self
    }

    /// Select the storage variant
    pub fn storage_kind(mut self, kind: StorageKind) -> Self {
        self.config.storage_kind = kind;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
