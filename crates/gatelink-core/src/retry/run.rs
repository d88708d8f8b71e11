//! Retry loop: run a closure until success or policy says stop.

use crate::error::ResolveError;

use super::classify;
use super::policy::{RetryDecision, RetryPolicy};

/// Final result of a retried operation plus how many attempts were made.
#[derive(Debug)]
pub struct Attempted<T> {
    pub result: Result<T, ResolveError>,
    pub attempts: u32,
}

/// Runs `f` until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again.
/// `f` receives the 1-based attempt number.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, mut f: F) -> Attempted<T>
where
    F: FnMut(u32) -> Result<T, ResolveError>,
{
    let mut attempt = 1u32;
    loop {
        match f(attempt) {
            Ok(v) => {
                return Attempted {
                    result: Ok(v),
                    attempts: attempt,
                }
            }
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => {
                        return Attempted {
                            result: Err(e),
                            attempts: attempt,
                        }
                    }
                    RetryDecision::RetryAfter(d) => {
                        tracing::debug!(attempt, ?kind, delay_ms = d.as_millis() as u64, error = %e, "attempt failed, backing off");
                        std::thread::sleep(d);
                        attempt += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn succeeds_after_transient_failures() {
        let policy = RetryPolicy::immediate(5);
        let mut calls = 0;
        let out = run_with_retry(&policy, |_| {
            calls += 1;
            if calls <= 2 {
                Err(ResolveError::Http(502))
            } else {
                Ok("done")
            }
        });
        assert_eq!(out.result.unwrap(), "done");
        assert_eq!(out.attempts, 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn stops_at_max_attempts() {
        let policy = RetryPolicy::immediate(4);
        let out: Attempted<()> = run_with_retry(&policy, |_| Err(ResolveError::Protocol("x".into())));
        assert!(out.result.is_err());
        assert_eq!(out.attempts, 4);
    }

    #[test]
    fn invalid_link_stops_immediately() {
        let policy = RetryPolicy::immediate(4);
        let out: Attempted<()> =
            run_with_retry(&policy, |_| Err(ResolveError::InvalidLink("bad".into())));
        assert_eq!(out.attempts, 1);
    }
}
