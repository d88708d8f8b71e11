//! Logging init: append to a file under the XDG state dir, or stderr if that
//! file cannot be opened. Never fails.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,gatelink=debug,gatelink_core=debug";

/// Where log lines ended up.
#[derive(Debug)]
pub enum LogTarget {
    File(PathBuf),
    /// The log file could not be opened; holds the reason.
    Stderr(anyhow::Error),
}

/// Path of the log file: `~/.local/state/gatelink/gatelink.log`.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("gatelink")?;
    Ok(xdg_dirs.place_state_file("gatelink.log")?)
}

/// Open `path` for appending, creating parent directories as needed.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create log dir: {}", dir.display()))?;
    }
    File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file: {}", path.display()))
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
/// If a subscriber is already installed this is a no-op apart from the
/// returned target.
pub fn init_logging() -> LogTarget {
    let opened = log_file_path().and_then(|path| open_log_file(&path).map(|file| (path, file)));
    let (writer, target) = match opened {
        // `&File` is `Write`, so one shared handle serves every event.
        Ok((path, file)) => (BoxMakeWriter::new(Arc::new(file)), LogTarget::File(path)),
        Err(e) => (BoxMakeWriter::new(std::io::stderr), LogTarget::Stderr(e)),
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();

    match &target {
        LogTarget::File(path) => {
            tracing::info!("gatelink logging initialized at {}", path.display())
        }
        LogTarget::Stderr(e) => tracing::warn!("file logging unavailable, using stderr: {:#}", e),
    }
    target
}
