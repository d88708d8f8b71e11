use anyhow::Result;
use std::collections::VecDeque;
use std::sync::mpsc::{self, Sender};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::admission::HostAdmissionController;
use crate::config::{GatelinkConfig, SessionScope};
use crate::cookies::{CookieJar, SharedCookieJar};
use crate::input::WorkItem;
use crate::protocol::ResolverSettings;
use crate::retry::RetryPolicy;
use crate::session::SessionFactory;
use crate::sink::{FailureLedger, ResultSink};

use super::progress::{Progress, ProgressEvent};
use super::summary::BatchSummary;
use super::worker::Worker;

/// Knobs of one batch run.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Worker threads (capped at the number of items).
    pub workers: usize,
    /// Concurrent items per destination host.
    pub per_host_limit: usize,
    /// How long a worker waits for a host slot before skipping the item.
    pub admission_timeout: Duration,
    pub retry: RetryPolicy,
    pub resolver: ResolverSettings,
    pub session_scope: SessionScope,
}

impl DispatchConfig {
    pub fn from_config(cfg: &GatelinkConfig, check_domain: bool) -> Self {
        Self {
            workers: cfg.workers,
            per_host_limit: cfg.per_host_limit,
            admission_timeout: cfg.admission_timeout(),
            retry: RetryPolicy::from(&cfg.retry_config()),
            resolver: ResolverSettings::from_config(cfg, check_domain),
            session_scope: cfg.session_scope,
        }
    }
}

/// Owns everything a batch run shares between workers: the admission
/// controller, the merged cookie jar and both output files.
pub struct DispatchEngine<F: SessionFactory> {
    pub(super) config: DispatchConfig,
    pub(super) factory: F,
    pub(super) admission: HostAdmissionController,
    pub(super) jar: SharedCookieJar,
    pub(super) sink: ResultSink,
    pub(super) ledger: FailureLedger,
}

impl<F: SessionFactory> DispatchEngine<F> {
    pub fn new(config: DispatchConfig, factory: F, sink: ResultSink, ledger: FailureLedger) -> Self {
        Self {
            config,
            factory,
            admission: HostAdmissionController::new(),
            jar: SharedCookieJar::default(),
            sink,
            ledger,
        }
    }

    /// Seed the shared jar, usually with the persisted session.
    pub fn with_cookies(mut self, seed: CookieJar) -> Self {
        self.jar = SharedCookieJar::new(seed);
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn admission(&self) -> &HostAdmissionController {
        &self.admission
    }

    pub fn sink(&self) -> &ResultSink {
        &self.sink
    }

    pub fn ledger(&self) -> &FailureLedger {
        &self.ledger
    }

    /// Seed cookies plus everything merged back by finished items.
    pub fn merged_jar(&self) -> CookieJar {
        self.jar.snapshot()
    }

    pub fn run(&self, items: Vec<WorkItem>) -> Result<BatchSummary> {
        self.run_with_progress(items, None)
    }

    /// Truncate the output files, then resolve every item on the worker pool.
    /// Returns once every item has an outcome. Per-item failures never make
    /// this return an error; only truncating the output files can.
    pub fn run_with_progress(
        &self,
        items: Vec<WorkItem>,
        listener: Option<Sender<ProgressEvent>>,
    ) -> Result<BatchSummary> {
        self.sink.truncate()?;
        self.ledger.truncate()?;

        let total = items.len();
        let mut summary = BatchSummary::new(total);
        if total == 0 {
            return Ok(summary);
        }

        let num_workers = self.config.workers.max(1).min(total);
        tracing::info!(
            total,
            workers = num_workers,
            per_host_limit = self.config.per_host_limit,
            scope = ?self.config.session_scope,
            "starting batch"
        );

        let queue: Mutex<VecDeque<WorkItem>> = Mutex::new(items.into_iter().collect());
        let progress = Progress::new(total, listener);
        let (tx, rx) = mpsc::channel();

        std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(num_workers);
            for worker_id in 0..num_workers {
                let tx = tx.clone();
                let queue = &queue;
                let progress = &progress;
                handles.push(scope.spawn(move || {
                    let mut worker = Worker::new(self, progress, worker_id);
                    loop {
                        let item = match queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front() {
                            Some(item) => item,
                            None => break,
                        };
                        let kind = worker.process(&item);
                        let _ = tx.send(kind);
                    }
                }));
            }
            drop(tx);

            for kind in rx.iter() {
                summary.record(kind);
            }
            for (worker_id, handle) in handles.into_iter().enumerate() {
                if handle.join().is_err() {
                    tracing::error!(worker = worker_id, "worker thread panicked");
                }
            }
        });

        if summary.completed() < total {
            tracing::error!(
                missing = total - summary.completed(),
                "some items finished without a recorded outcome"
            );
        }
        tracing::info!(%summary, "batch finished");
        Ok(summary)
    }
}
