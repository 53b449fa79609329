//! Engine Module
//!
//! Routes parsed commands to a storage backend.
//!
//! ## Responsibilities
//! - Dispatch `get`/`set` to the `Storage` the engine was built with
//! - Map outcomes to responses: an absent key is a normal empty 200, a failed
//!   `set` is a 500
//! - Open the storage variant named by the config

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{Command, Response};
use crate::storage::{DurableStorage, MemoryStorage, Storage};

/// Dispatcher over one storage instance
///
/// The engine is `Sync` exactly when its storage is, so only an engine over
/// `DurableStorage` can be shared between connection workers.
pub struct Engine<S> {
    storage: S,
}

impl<S: Storage> Engine<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Execute a command
    ///
    /// Storage failures come back as error responses, never as `Err`.
    pub fn execute(&self, command: Command) -> Response {
        match command {
            Command::Get { key } => Response::ok(self.storage.get(&key)),
            Command::Set { key, value } => match self.storage.set(&key, &value) {
                Ok(()) => Response::empty(),
                Err(e) => Response::error(&e.to_string()),
            },
        }
    }

    /// Get a value by key (`""` when absent)
    pub fn get(&self, key: &str) -> String {
        self.storage.get(key)
    }

    /// Store a value under key
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage.set(key, value)
    }

    /// Get the storage backend
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl Engine<DurableStorage> {
    /// Open an engine over the durable storage described by `config`
    ///
    /// Creates the snapshot's parent directory if needed.
    pub fn open_durable(config: &Config) -> Result<Self> {
        config.validate()?;

        if let Some(dir) = config.snapshot_path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }

        Ok(Self::new(DurableStorage::from_config(config)))
    }
}

impl Engine<MemoryStorage> {
    /// Open an engine over fresh in-memory storage
    pub fn open_memory() -> Self {
        Self::new(MemoryStorage::new())
    }
}
