//! CLI command handlers.

mod resolve;
mod run;

pub use resolve::run_resolve;
pub use run::run_batch;

use anyhow::Result;
use gatelink_core::config::GatelinkConfig;
use gatelink_core::session::{CurlSessionFactory, SessionOptions, UserAgentPolicy};
use gatelink_core::session_store::SessionStore;
use std::path::Path;

fn open_session_store(path: Option<&Path>) -> Result<SessionStore> {
    match path {
        Some(p) => Ok(SessionStore::new(p)),
        None => SessionStore::at_default_path(),
    }
}

fn curl_factory(cfg: &GatelinkConfig) -> CurlSessionFactory {
    CurlSessionFactory::new(
        SessionOptions {
            http_timeout: cfg.http_timeout(),
            connect_timeout: cfg.connect_timeout(),
        },
        UserAgentPolicy::from_override(cfg.user_agent.as_deref()),
    )
}
