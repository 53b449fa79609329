//! FIFO binary semaphore
//!
//! Unlike a mutex, a semaphore may be released by a different thread than the
//! one that acquired it. The reader-writer lock needs that: the first reader
//! takes the writer gate and whichever reader leaves last gives it back.

use parking_lot::{Condvar, Mutex};

/// Ticket state. The gate is held while `serving < next`; the holder is the
/// thread whose ticket equals `serving`.
#[derive(Debug, Default)]
struct Tickets {
    /// Next ticket to hand out
    next: u64,
    /// Ticket currently allowed through
    serving: u64,
}

/// Binary semaphore that admits waiters in arrival order
#[derive(Debug, Default)]
pub struct Semaphore {
    tickets: Mutex<Tickets>,
    turn: Condvar,
}

impl Semaphore {
    /// Create an available (unheld) semaphore
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until this caller's turn comes, then hold the semaphore
    pub fn acquire(&self) {
        let mut tickets = self.tickets.lock();
        let ticket = tickets.next;
        tickets.next += 1;

        while tickets.serving != ticket {
            self.turn.wait(&mut tickets);
        }
    }

    /// Take the semaphore only if it is free and nobody is queued
    pub fn try_acquire(&self) -> bool {
        let mut tickets = self.tickets.lock();
        if tickets.serving == tickets.next {
            tickets.next += 1;
            true
        } else {
            false
        }
    }

    /// Hand the semaphore to the next waiter
    ///
    /// # Panics
    /// If the semaphore is not held.
    pub fn release(&self) {
        let mut tickets = self.tickets.lock();
        assert!(
            tickets.serving < tickets.next,
            "semaphore released while not held"
        );
        tickets.serving += 1;
        drop(tickets);

        // Waiters check their own ticket, so every one of them must look.
        self.turn.notify_all();
    }

    /// Whether some caller currently holds the semaphore
    pub fn is_held(&self) -> bool {
        let tickets = self.tickets.lock();
        tickets.serving < tickets.next
    }

    /// Number of callers blocked in `acquire`
    pub fn waiting(&self) -> u64 {
        let tickets = self.tickets.lock();
        (tickets.next - tickets.serving).saturating_sub(1)
    }
}
