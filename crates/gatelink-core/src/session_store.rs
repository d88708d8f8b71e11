//! Persist the merged cookie jar across runs.
//!
//! Best-effort in both directions: a missing or unreadable file means "no
//! prior session", and a failed save is logged. Neither ever fails a batch.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cookies::{Cookie, CookieJar};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    version: u32,
    cookies: Vec<Cookie>,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.local/state/gatelink/session.json`.
    pub fn at_default_path() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn default_path() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("gatelink")?;
        Ok(xdg_dirs.get_state_home().join("gatelink").join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Jar from the previous run, or `None` if there is none or it cannot be read.
    pub fn load(&self) -> Option<CookieJar> {
        match self.try_load() {
            Ok(jar) => jar,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %format!("{e:#}"), "ignoring unreadable session file");
                None
            }
        }
    }

    fn try_load(&self) -> Result<Option<CookieJar>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("read session: {}", self.path.display())),
        };
        let persisted: PersistedSession = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse session: {}", self.path.display()))?;
        Ok(Some(persisted.cookies.into_iter().collect()))
    }

    /// Overwrite the file with `jar`. Failures are logged and reported as `false`.
    pub fn save(&self, jar: &CookieJar) -> bool {
        match self.try_save(jar) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), cookies = jar.len(), "session saved");
                true
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %format!("{e:#}"), "could not save session");
                false
            }
        }
    }

    fn try_save(&self, jar: &CookieJar) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let persisted = PersistedSession {
            version: FORMAT_VERSION,
            cookies: jar.iter().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&persisted).context("serialize session")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write session: {}", self.path.display()))?;
        Ok(())
    }
}
