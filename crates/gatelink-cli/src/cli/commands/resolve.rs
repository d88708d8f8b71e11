//! `gatelink resolve <url>`: one link, one session, printed to stdout.

use anyhow::{Context, Result};
use gatelink_core::config::GatelinkConfig;
use gatelink_core::link::parse_link;
use gatelink_core::protocol::{ResolutionClient, ResolverSettings};
use gatelink_core::retry::{run_with_retry, RetryPolicy};
use gatelink_core::session::{SessionFactory, Transport};
use std::path::Path;

use super::{curl_factory, open_session_store};

pub fn run_resolve(
    cfg: &GatelinkConfig,
    url: &str,
    no_warmup: bool,
    no_check_domain: bool,
    session_path: Option<&Path>,
) -> Result<()> {
    let mut cfg = cfg.clone();
    if no_warmup {
        cfg.warmup = false;
    }
    let settings = ResolverSettings::from_config(&cfg, !no_check_domain);
    let id = parse_link(url, settings.check_domain)?;

    let store = open_session_store(session_path)?;
    let mut jar = store.load().unwrap_or_default();
    let mut session = curl_factory(&cfg)
        .open(&jar)
        .context("failed to open session")?;

    let policy = RetryPolicy::from(&cfg.retry_config());
    let attempted = run_with_retry(&policy, |attempt| {
        tracing::debug!(attempt, link = %id, "resolving");
        ResolutionClient::new(&mut session, &settings).attempt(url, &id)
    });

    match session.cookies() {
        Ok(cookies) => {
            jar.merge(&cookies);
            store.save(&jar);
        }
        Err(e) => tracing::warn!(error = %e, "could not read session cookies"),
    }

    let final_url = attempted
        .result
        .with_context(|| format!("bypass failed after {} attempt(s)", attempted.attempts))?;
    println!("{}", final_url);
    Ok(())
}
