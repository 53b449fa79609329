//! Sync Module
//!
//! Concurrency guard for the durable storage.
//!
//! ## Contents
//! - `Semaphore`: FIFO binary semaphore that any thread may release
//! - `RawRwLock`: three-gate reader-writer lock (no writer starvation)
//! - `GateLock<T>`: `RawRwLock` plus data, with scoped read/write guards
//!
//! `std::sync::RwLock` leaves fairness to the platform, so a continuous stream
//! of readers may starve a writer. The gates here are built on `parking_lot`
//! primitives instead.

mod semaphore;
mod rwlock;

pub use semaphore::Semaphore;
pub use rwlock::{GateLock, RawRwLock, ReadGuard, WriteGuard};
