//! Retry and backoff policy.
//!
//! Error classification and exponential backoff decisions for the
//! resolution loop. Each attempt re-runs the whole token exchange.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, Attempted};
