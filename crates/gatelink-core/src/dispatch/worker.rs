use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::admission::admission_host;
use crate::config::SessionScope;
use crate::cookies::CookieJar;
use crate::input::WorkItem;
use crate::link::parse_link;
use crate::outcome::{OutcomeKind, ResolutionOutcome};
use crate::protocol::ResolutionClient;
use crate::retry::run_with_retry;
use crate::session::{SessionFactory, Transport};

use super::engine::DispatchEngine;
use super::progress::Progress;
use super::SKIPPED_REASON;

struct ItemResult {
    outcome: ResolutionOutcome,
    attempts: u32,
    cookies: Option<CookieJar>,
}

impl ItemResult {
    fn unattempted(outcome: ResolutionOutcome) -> Self {
        Self {
            outcome,
            attempts: 0,
            cookies: None,
        }
    }
}

/// State of one worker thread. With [`SessionScope::Worker`] it keeps its
/// session between items.
pub(super) struct Worker<'e, F: SessionFactory> {
    engine: &'e DispatchEngine<F>,
    progress: &'e Progress,
    id: usize,
    session: Option<F::Session>,
}

impl<'e, F: SessionFactory> Worker<'e, F> {
    pub(super) fn new(engine: &'e DispatchEngine<F>, progress: &'e Progress, id: usize) -> Self {
        Self {
            engine,
            progress,
            id,
            session: None,
        }
    }

    /// Runs one item end to end and returns the kind of outcome recorded.
    pub(super) fn process(&mut self, item: &WorkItem) -> OutcomeKind {
        let engine = self.engine;
        let host = admission_host(&item.url);
        let permit = match engine.admission.acquire(
            &host,
            engine.config.per_host_limit,
            engine.config.admission_timeout,
        ) {
            Some(p) => p,
            None => {
                tracing::warn!(worker = self.id, index = item.index, host = %host, "host busy, skipping item");
                let outcome = ResolutionOutcome::Skipped(SKIPPED_REASON.to_string());
                self.finish(item, &outcome, 0, None);
                return outcome.kind();
            }
        };

        let result = match panic::catch_unwind(AssertUnwindSafe(|| self.resolve(item))) {
            Ok(r) => r,
            Err(payload) => {
                // Whatever the session was doing is unknown now.
                self.session = None;
                let msg = panic_message(payload.as_ref());
                tracing::error!(worker = self.id, index = item.index, panic = %msg, "item panicked");
                ItemResult::unattempted(ResolutionOutcome::UnexpectedError(msg))
            }
        };
        drop(permit);

        self.finish(item, &result.outcome, result.attempts, result.cookies.as_ref());
        result.outcome.kind()
    }

    fn resolve(&mut self, item: &WorkItem) -> ItemResult {
        let engine = self.engine;
        let settings = &engine.config.resolver;

        let id = match parse_link(&item.url, settings.check_domain) {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!(index = item.index, error = %e, "rejected link");
                return ItemResult::unattempted(ResolutionOutcome::InvalidLink(e.to_string()));
            }
        };

        let mut session = match self.session.take() {
            Some(s) => s,
            None => match engine.factory.open(&engine.jar.snapshot()) {
                Ok(s) => s,
                Err(e) => {
                    return ItemResult::unattempted(ResolutionOutcome::UnexpectedError(format!(
                        "failed to open session: {}",
                        e
                    )))
                }
            },
        };
        tracing::debug!(
            worker = self.id,
            index = item.index,
            owner = id.owner_id(),
            user_agent = session.user_agent(),
            "resolving"
        );

        let attempted = run_with_retry(&engine.config.retry, |attempt| {
            tracing::debug!(worker = self.id, index = item.index, attempt, "attempt");
            ResolutionClient::new(&mut session, settings).attempt(&item.url, &id)
        });

        let cookies = match session.cookies() {
            Ok(jar) => Some(jar),
            Err(e) => {
                tracing::warn!(index = item.index, error = %e, "could not read session cookies");
                None
            }
        };

        let outcome = match attempted.result {
            Ok(url) => ResolutionOutcome::Success(url),
            Err(e) if e.is_invalid_link() => ResolutionOutcome::InvalidLink(e.to_string()),
            Err(e) => ResolutionOutcome::BypassFailed {
                reason: e.to_string(),
                attempts: attempted.attempts,
            },
        };

        // A session the service kept rejecting is not handed to the next item.
        if engine.config.session_scope == SessionScope::Worker
            && outcome.kind() != OutcomeKind::BypassFailed
        {
            self.session = Some(session);
        }

        ItemResult {
            outcome,
            attempts: attempted.attempts,
            cookies,
        }
    }

    /// Record the outcome, merge cookies, then report progress.
    fn finish(
        &self,
        item: &WorkItem,
        outcome: &ResolutionOutcome,
        attempts: u32,
        cookies: Option<&CookieJar>,
    ) {
        let engine = self.engine;
        if let Err(e) = engine.sink.append(item, outcome) {
            tracing::error!(index = item.index, error = %e, "failed to write result");
        }
        if let Err(e) = engine.ledger.record(&item.url, outcome) {
            tracing::error!(index = item.index, error = %e, "failed to write failure ledger");
        }
        if let Some(jar) = cookies {
            engine.jar.merge(jar);
        }
        self.progress.complete(item, outcome, attempts);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
