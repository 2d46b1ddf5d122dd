//! A hand-rolled counting semaphore.
//!
//! The pool needs exactly two semaphore shapes: a counting semaphore
//! bounding how many workers may be busy at once, and a binary doorbell
//! per worker. Both are the same primitive at different starting counts,
//! so one type covers both rather than reaching for a crate.

use std::sync::{Condvar, Mutex};

pub struct Semaphore {
    count: Mutex<usize>,
    changed: Condvar,
}

impl Semaphore {
    /// A semaphore starting at `count` permits.
    pub fn new(count: usize) -> Self {
        Semaphore {
            count: Mutex::new(count),
            changed: Condvar::new(),
        }
    }

    /// Block until a permit is available, then take it.
    pub fn acquire(&self) {
        let mut count = self.count.lock().unwrap();
        while *count == 0 {
            count = self.changed.wait(count).unwrap();
        }
        *count -= 1;
    }

    /// Return a permit, waking exactly one waiter if any are blocked.
    pub fn release(&self) {
        let mut count = self.count.lock().unwrap();
        *count += 1;
        self.changed.notify_one();
    }

    /// Current permit count, for diagnostics and tests. Racy by nature
    /// the instant it's read under concurrent use.
    pub fn available(&self) -> usize {
        *self.count.lock().unwrap()
    }
}
