//! Error type for a single resolution attempt.
//!
//! Kept separate from `anyhow` so the retry layer can classify failures
//! before they are turned into a recorded outcome.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// Link is structurally malformed or not on a known service host. Never retried.
    #[error("invalid link: {0}")]
    InvalidLink(String),

    /// Curl reported an error (timeout, connection, DNS, ...).
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),

    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),

    /// GraphQL response carried an `errors` array; holds the first message.
    #[error("error: {0}")]
    Protocol(String),

    /// Response body was not the JSON we expected.
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON parsed but the expected field was absent or null.
    #[error("response missing {0}")]
    MissingField(&'static str),

    /// The session could not be opened or configured.
    #[error("session: {0}")]
    Session(String),
}

impl ResolveError {
    pub fn is_invalid_link(&self) -> bool {
        matches!(self, ResolveError::InvalidLink(_))
    }
}
