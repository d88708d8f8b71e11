use std::fmt;

use crate::outcome::OutcomeKind;

/// Counts per outcome kind for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub invalid: usize,
    pub failed: usize,
    pub skipped: usize,
    pub unexpected: usize,
}

impl BatchSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Success => self.succeeded += 1,
            OutcomeKind::InvalidLink => self.invalid += 1,
            OutcomeKind::BypassFailed => self.failed += 1,
            OutcomeKind::Skipped => self.skipped += 1,
            OutcomeKind::UnexpectedError => self.unexpected += 1,
        }
    }

    /// Items that produced an outcome.
    pub fn completed(&self) -> usize {
        self.succeeded + self.invalid + self.failed + self.skipped + self.unexpected
    }

    /// Items written to the failure ledger.
    pub fn failures(&self) -> usize {
        self.invalid + self.failed + self.unexpected
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} resolved, {} invalid, {} failed, {} skipped, {} unexpected",
            self.succeeded, self.total, self.invalid, self.failed, self.skipped, self.unexpected
        )
    }
}
