//! Writer-fair reader-writer lock
//!
//! Three-gate construction:
//!
//! ```text
//!   reader_acquire                         writer_acquire
//!   ──────────────                         ──────────────
//!   admission.acquire()                    admission.acquire()
//!   readers += 1                           writer_gate.acquire()
//!   if readers == 1: writer_gate.acquire()
//!   admission.release()                    writer_release
//!                                          ──────────────
//!   reader_release                         writer_gate.release()
//!   ──────────────                         admission.release()
//!   readers -= 1
//!   if readers == 0: writer_gate.release()
//! ```
//!
//! A writer holds the admission gate for the whole time it waits for active
//! readers to drain, so readers that arrive after it queue behind it instead
//! of overtaking it. Both gates are FIFO, which bounds how many readers can
//! still be admitted once a writer has queued.

use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

use super::Semaphore;

/// Reader-writer lock without attached data
///
/// The four operations must be paired by the caller. Prefer [`GateLock`],
/// whose guards release on every exit path.
#[derive(Debug, Default)]
pub struct RawRwLock {
    /// Active reader count (its mutex doubles as the counter gate)
    readers: Mutex<usize>,

    /// Held by the active writer, or by the reader group as a whole
    writer_gate: Semaphore,

    /// Passed by every reader on entry; held by a writer while it waits
    admission: Semaphore,
}

impl RawRwLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter as a reader, blocking while a writer holds or waits for the lock
    pub fn reader_acquire(&self) {
        self.admission.acquire();
        {
            let mut readers = self.readers.lock();
            *readers += 1;
            if *readers == 1 {
                // First reader in claims the writer gate for the whole group
                self.writer_gate.acquire();
            }
        }
        self.admission.release();
    }

    /// Leave as a reader; the last one out reopens the writer gate
    ///
    /// # Panics
    /// If no reader is active.
    pub fn reader_release(&self) {
        let mut readers = self.readers.lock();
        assert!(*readers > 0, "reader_release without matching reader_acquire");
        *readers -= 1;
        if *readers == 0 {
            self.writer_gate.release();
        }
    }

    /// Enter as the exclusive writer
    pub fn writer_acquire(&self) {
        self.admission.acquire();
        self.writer_gate.acquire();
    }

    /// Leave as the writer
    ///
    /// # Panics
    /// If the lock is not held in writer mode.
    pub fn writer_release(&self) {
        assert!(
            *self.readers.lock() == 0,
            "writer_release while readers are active"
        );
        self.writer_gate.release();
        self.admission.release();
    }

    /// Number of readers currently inside
    pub fn active_readers(&self) -> usize {
        *self.readers.lock()
    }

    /// Whether a writer holds the lock or is waiting for readers to drain
    pub fn writer_pending(&self) -> bool {
        let readers = self.readers.lock();
        let writer_inside = *readers == 0 && self.writer_gate.is_held();
        let writer_queued = self.admission.is_held() && self.writer_gate.waiting() > 0;
        writer_inside || writer_queued
    }
}

/// Reader-writer lock protecting a value of type `T`
pub struct GateLock<T> {
    raw: RawRwLock,
    data: UnsafeCell<T>,
}

// SAFETY: access to `data` only happens through guards, and the raw lock
// guarantees either many `ReadGuard`s (shared `&T`, needs `T: Sync`) or one
// `WriteGuard` (`&mut T`, needs `T: Send`) at a time.
unsafe impl<T: Send> Send for GateLock<T> {}
unsafe impl<T: Send + Sync> Sync for GateLock<T> {}

impl<T> GateLock<T> {
    pub fn new(value: T) -> Self {
        Self {
            raw: RawRwLock::new(),
            data: UnsafeCell::new(value),
        }
    }

    /// Shared access; released when the guard drops
    pub fn read(&self) -> ReadGuard<'_, T> {
        self.raw.reader_acquire();
        ReadGuard { lock: self }
    }

    /// Exclusive access; released when the guard drops
    pub fn write(&self) -> WriteGuard<'_, T> {
        self.raw.writer_acquire();
        WriteGuard { lock: self }
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }

    /// Number of readers currently holding a guard
    pub fn active_readers(&self) -> usize {
        self.raw.active_readers()
    }
}

impl<T: Default> Default for GateLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Shared guard returned by [`GateLock::read`]
pub struct ReadGuard<'a, T> {
    lock: &'a GateLock<T>,
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: reader mode is held for the guard's lifetime, so no
        // `WriteGuard` exists.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.raw.reader_release();
    }
}

/// Exclusive guard returned by [`GateLock::write`]
pub struct WriteGuard<'a, T> {
    lock: &'a GateLock<T>,
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: writer mode is held for the guard's lifetime.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: writer mode is held for the guard's lifetime and this is the
        // only guard in existence.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.raw.writer_release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_many_read_guards() {
        let lock = GateLock::new(7);
        let a = lock.read();
        let b = lock.read();
        assert_eq!(*a + *b, 14);
        assert_eq!(lock.active_readers(), 2);
        drop(a);
        drop(b);
        assert_eq!(lock.active_readers(), 0);
    }

    #[test]
    fn test_write_guard_mutates() {
        let lock = GateLock::new(String::from("a"));
        lock.write().push('b');
        assert_eq!(*lock.read(), "ab");
        assert_eq!(lock.into_inner(), "ab");
    }

    #[test]
    #[should_panic(expected = "without matching reader_acquire")]
    fn test_reader_release_without_acquire_panics() {
        RawRwLock::new().reader_release();
    }

    #[test]
    #[should_panic(expected = "released while not held")]
    fn test_writer_release_without_acquire_panics() {
        RawRwLock::new().writer_release();
    }

    #[test]
    fn test_writer_pending_reflects_state() {
        let lock = RawRwLock::new();
        assert!(!lock.writer_pending());

        lock.writer_acquire();
        assert!(lock.writer_pending());
        lock.writer_release();

        lock.reader_acquire();
        assert!(!lock.writer_pending());
        lock.reader_release();
    }
}
