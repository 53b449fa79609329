//! Storage Module
//!
//! The `Storage` contract and its two variants.
//!
//! ## Variants
//! - [`MemoryStorage`]: a map in process memory. No locking, no I/O. It is
//!   `!Sync`, so it cannot be shared between worker threads.
//! - [`DurableStorage`]: a map in memory mirrored by a snapshot file. Reads
//!   take the lock in reader mode; writes take it in writer mode and rewrite
//!   the whole snapshot atomically before releasing it.
//!
//! ## Absent Keys
//! `get` returns an empty string for a key that was never set, so at the read
//! API an absent key looks like a key holding `""`. Use `contains` to tell the
//! two apart.

mod memory;
mod durable;
pub mod snapshot;

pub use memory::MemoryStorage;
pub use durable::DurableStorage;
pub use snapshot::{Mapping, SnapshotWriter, StagedSnapshot};

use crate::error::Result;

/// A flat string-to-string key-value store
pub trait Storage {
    /// Current value for `key`, or `""` when the key is absent
    fn get(&self, key: &str) -> String;

    /// Insert or replace the value for `key`
    ///
    /// Once this returns `Ok`, every `get` that starts afterwards sees the
    /// new value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Whether `key` has been set
    fn contains(&self, key: &str) -> bool;

    /// Number of keys
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> String {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn contains(&self, key: &str) -> bool {
        (**self).contains(key)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}
