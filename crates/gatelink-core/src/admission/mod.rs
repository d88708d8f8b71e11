//! Per-destination-host admission control.
//!
//! One counting semaphore per host name, created lazily on first sight and
//! kept for the controller's lifetime. Waiting for a slot is bounded: on
//! timeout the caller gets nothing and must skip the item.
//!
//! The controller is owned by a dispatch run rather than being process-wide,
//! so each run (and each test) starts with fresh limiter state.

mod permit;
mod slot;

pub use permit::HostPermit;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use slot::HostSlot;

/// Host name used when a URL has none.
pub const UNKNOWN_HOST: &str = "unknown";

#[derive(Debug, Default)]
pub struct HostAdmissionController {
    slots: Mutex<HashMap<String, Arc<HostSlot>>>,
}

impl HostAdmissionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot for `host`, created with `limit` if this is the first time the host is seen.
    /// Later calls with a different limit reuse the first one.
    fn slot(&self, host: &str, limit: usize) -> Arc<HostSlot> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            slots
                .entry(host.to_string())
                .or_insert_with(|| Arc::new(HostSlot::new(limit))),
        )
    }

    /// Wait up to `timeout` for a slot on `host`. `None` means the host stayed
    /// busy for the whole wait; nothing is held in that case.
    /// The returned permit gives the slot back when dropped.
    pub fn acquire(&self, host: &str, limit: usize, timeout: Duration) -> Option<HostPermit> {
        let slot = self.slot(host, limit);
        if slot.acquire_for(timeout) {
            Some(HostPermit::new(host.to_string(), slot))
        } else {
            tracing::debug!(host, timeout_ms = timeout.as_millis() as u64, "host admission timed out");
            None
        }
    }

    /// Slots currently held for `host` (0 for unseen hosts).
    pub fn in_flight(&self, host: &str) -> usize {
        let slot = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(host)
            .cloned();
        slot.map(|s| s.in_use()).unwrap_or(0)
    }

    /// Number of distinct hosts seen so far.
    pub fn host_count(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Host used for admission bucketing: the visible URL's host, lowercased,
/// or [`UNKNOWN_HOST`] if there is none.
pub fn admission_host(url: &str) -> String {
    url::Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
        .unwrap_or_else(|| UNKNOWN_HOST.to_string())
}
