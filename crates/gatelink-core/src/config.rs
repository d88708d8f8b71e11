use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Default GraphQL endpoint of the link service.
pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "https://publisher.linkvertise.com/graphql";

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per link (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 30,
        }
    }
}

/// How long a resolution session lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionScope {
    /// Fresh session per work item, seeded from the persisted jar.
    #[default]
    Item,
    /// One session per worker thread, reused across that worker's items.
    Worker,
}

/// Layout of one record in the result file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordLayout {
    /// Title, input URL, outcome, blank line.
    #[default]
    Full,
    /// Title, outcome, blank line.
    Compact,
}

/// Global configuration loaded from `~/.config/gatelink/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatelinkConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Maximum concurrent resolutions per destination host.
    pub per_host_limit: usize,
    /// How long a worker waits for a host slot before skipping the item.
    pub admission_timeout_secs: u64,
    /// Upper bound for a single HTTP call.
    pub http_timeout_secs: u64,
    /// Upper bound for establishing a connection.
    pub connect_timeout_secs: u64,
    /// Fetch the gated link page before the API calls so the service can set cookies.
    pub warmup: bool,
    /// Pause after the warm-up request, in milliseconds.
    pub warmup_pause_ms: u64,
    /// GraphQL endpoint of the service.
    pub graphql_endpoint: String,
    /// Fixed user agent; if missing, each session draws one from the rotation pool.
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub session_scope: SessionScope,
    #[serde(default)]
    pub record_layout: RecordLayout,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for GatelinkConfig {
    fn default() -> Self {
        Self {
            workers: 6,
            per_host_limit: 2,
            admission_timeout_secs: 60,
            http_timeout_secs: 30,
            connect_timeout_secs: 15,
            warmup: true,
            warmup_pause_ms: 1500,
            graphql_endpoint: DEFAULT_GRAPHQL_ENDPOINT.to_string(),
            user_agent: None,
            session_scope: SessionScope::Item,
            record_layout: RecordLayout::Full,
            retry: None,
        }
    }
}

impl GatelinkConfig {
    pub fn retry_config(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    pub fn admission_timeout(&self) -> Duration {
        Duration::from_secs(self.admission_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Warm-up pause, or `None` when warm-up is disabled.
    pub fn warmup_pause(&self) -> Option<Duration> {
        self.warmup.then(|| Duration::from_millis(self.warmup_pause_ms))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("gatelink")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GatelinkConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GatelinkConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: GatelinkConfig = toml::from_str(&data)?;
    Ok(cfg)
}
