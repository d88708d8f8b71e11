//! RAII permit that releases the host slot when dropped.

use std::sync::Arc;

use super::slot::HostSlot;

/// Proof of admission for one host. Dropping it (including during unwinding)
/// gives the slot back.
#[derive(Debug)]
pub struct HostPermit {
    host: String,
    slot: Arc<HostSlot>,
}

impl HostPermit {
    pub(super) fn new(host: String, slot: Arc<HostSlot>) -> Self {
        Self { host, slot }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Give the slot back now rather than at end of scope.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for HostPermit {
    fn drop(&mut self) {
        self.slot.release();
    }
}
