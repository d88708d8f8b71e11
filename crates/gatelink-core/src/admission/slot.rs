//! Counting semaphore with a bounded wait.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug)]
pub(super) struct HostSlot {
    limit: usize,
    in_use: Mutex<usize>,
    freed: Condvar,
}

impl HostSlot {
    pub(super) fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            in_use: Mutex::new(0),
            freed: Condvar::new(),
        }
    }

    /// Take one unit, waiting at most `timeout`. Returns false if none freed up in time.
    pub(super) fn acquire_for(&self, timeout: Duration) -> bool {
        let guard = self.in_use.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut in_use, _) = self
            .freed
            .wait_timeout_while(guard, timeout, |n| *n >= self.limit)
            .unwrap_or_else(PoisonError::into_inner);
        if *in_use >= self.limit {
            return false;
        }
        *in_use += 1;
        true
    }

    pub(super) fn release(&self) {
        let mut in_use = self.in_use.lock().unwrap_or_else(PoisonError::into_inner);
        *in_use = in_use.saturating_sub(1);
        drop(in_use);
        self.freed.notify_one();
    }

    pub(super) fn in_use(&self) -> usize {
        *self.in_use.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
