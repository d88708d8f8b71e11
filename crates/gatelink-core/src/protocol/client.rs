//! Resolution client: warm-up plus the token exchange on a borrowed session.

use std::time::Duration;

use crate::config::GatelinkConfig;
use crate::error::ResolveError;
use crate::link::{parse_link, LinkIdentifier};
use crate::session::Transport;

use super::exchange::run_exchange;

/// Per-run settings of the resolution protocol.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// GraphQL endpoint all three calls go to.
    pub endpoint: String,
    /// Pause after the warm-up GET; `None` skips warm-up entirely.
    pub warmup_pause: Option<Duration>,
    /// Reject links outside the known service hosts.
    pub check_domain: bool,
}

impl ResolverSettings {
    pub fn from_config(cfg: &GatelinkConfig, check_domain: bool) -> Self {
        Self {
            endpoint: cfg.graphql_endpoint.clone(),
            warmup_pause: cfg.warmup_pause(),
            check_domain,
        }
    }
}

/// Drives one resolution over a session it does not own.
pub struct ResolutionClient<'a, T: Transport> {
    session: &'a mut T,
    settings: &'a ResolverSettings,
}

impl<'a, T: Transport> ResolutionClient<'a, T> {
    pub fn new(session: &'a mut T, settings: &'a ResolverSettings) -> Self {
        Self { session, settings }
    }

    /// Parse `link` and run one attempt.
    pub fn resolve(&mut self, link: &str) -> Result<String, ResolveError> {
        let id = parse_link(link, self.settings.check_domain)?;
        self.attempt(link, &id)
    }

    /// One full attempt: optional warm-up, then the exchange from the start.
    pub fn attempt(&mut self, link: &str, id: &LinkIdentifier) -> Result<String, ResolveError> {
        if let Some(pause) = self.settings.warmup_pause {
            self.warm_up(link, pause);
        }
        run_exchange(&mut *self.session, &self.settings.endpoint, id)
    }

    /// Visit the gated page so the service can set its cookies. Never fails.
    fn warm_up(&mut self, link: &str, pause: Duration) {
        match self.session.get(link) {
            Ok(res) if res.is_success() => {
                tracing::debug!(link, status = res.status, "warm-up done");
            }
            Ok(res) => {
                tracing::warn!(link, status = res.status, "warm-up returned non-success status");
            }
            Err(e) => {
                tracing::warn!(link, error = %e, "warm-up failed, continuing");
            }
        }
        if !pause.is_zero() {
            std::thread::sleep(pause);
        }
    }
}
