//! # SnapKV
//!
//! A small string key-value store with:
//! - Two storage variants behind one `Storage` trait (in-memory, durable)
//! - Crash-safe snapshots: temp file, fsync, atomic rename, directory fsync
//! - A three-gate reader-writer lock that does not starve writers
//! - An HTTP `get`/`set` front end
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │        (thread per connection / sequential)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  GET /get?key=k   GET /set?k=v
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │               (Command → Storage → Response)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌──────────────────┐
//!   │MemoryStorage│          │  DurableStorage  │
//!   │  (RefCell)  │          │   (GateLock)     │
//!   └─────────────┘          └────────┬─────────┘
//!                                     │ write lock held
//!                                     ▼
//!                            ┌──────────────────┐
//!                            │ Snapshot (file)  │
//!                            │ temp → rename    │
//!                            └──────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod sync;
pub mod storage;
pub mod protocol;
pub mod engine;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, SnapError};
pub use config::{Config, SnapshotFormat, StorageKind};
pub use engine::Engine;
pub use storage::{DurableStorage, MemoryStorage, Storage};
pub use sync::{GateLock, RawRwLock};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SnapKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
