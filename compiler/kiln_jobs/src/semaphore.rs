//! Counting semaphore bounding concurrently running processes.

use parking_lot::{Condvar, Mutex};

pub struct Semaphore {
    count: Mutex<usize>,
    condvar: Condvar,
    max: usize,
}

impl Semaphore {
    /// A semaphore admitting `max` holders at once. `max` is at least 1.
    pub fn new(max: usize) -> Self {
        Semaphore {
            count: Mutex::new(0),
            condvar: Condvar::new(),
            max: max.max(1),
        }
    }

    /// Block until a slot is free and take it. The slot is returned when
    /// the permit is dropped.
    pub fn acquire(&self) -> Permit<'_> {
        let mut count = self.count.lock();
        while *count >= self.max {
            self.condvar.wait(&mut count);
        }
        *count += 1;
        Permit { semaphore: self }
    }

    /// Slots currently held.
    pub fn held(&self) -> usize {
        *self.count.lock()
    }

    fn release(&self) {
        let mut count = self.count.lock();
        *count -= 1;
        self.condvar.notify_one();
    }
}

#[must_use = "the slot is released as soon as the permit is dropped"]
pub struct Permit<'a> {
    semaphore: &'a Semaphore,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.semaphore.release();
    }
}
