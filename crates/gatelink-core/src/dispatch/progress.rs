use std::sync::mpsc::Sender;
use std::sync::{Mutex, PoisonError};

use crate::input::WorkItem;
use crate::outcome::{OutcomeKind, ResolutionOutcome};

/// One completed item, sent to the progress listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// 1-based input position of the item.
    pub index: usize,
    /// Items completed so far, this one included.
    pub done: usize,
    pub total: usize,
    pub url: String,
    pub kind: OutcomeKind,
    /// Exchange attempts made for this item.
    pub attempts: u32,
    /// Rendered outcome.
    pub summary: String,
}

struct State {
    done: usize,
    listener: Option<Sender<ProgressEvent>>,
}

/// Completed-count for one run. The log line and the event are produced
/// under the same lock as the increment so they always agree.
pub(super) struct Progress {
    total: usize,
    state: Mutex<State>,
}

impl Progress {
    pub(super) fn new(total: usize, listener: Option<Sender<ProgressEvent>>) -> Self {
        Self {
            total,
            state: Mutex::new(State { done: 0, listener }),
        }
    }

    pub(super) fn complete(&self, item: &WorkItem, outcome: &ResolutionOutcome, attempts: u32) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.done += 1;
        let done = state.done;
        tracing::info!(
            done,
            total = self.total,
            index = item.index,
            attempts,
            url = %item.url,
            "{}",
            outcome
        );
        if let Some(tx) = &state.listener {
            let event = ProgressEvent {
                index: item.index,
                done,
                total: self.total,
                url: item.url.clone(),
                kind: outcome.kind(),
                attempts,
                summary: outcome.to_string(),
            };
            if tx.send(event).is_err() {
                // Listener went away; keep counting without it.
                state.listener = None;
            }
        }
    }
}
