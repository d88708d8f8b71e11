//! Per-item outcome, produced exactly once for every work item.

use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Final destination URL.
    Success(String),
    /// Malformed or wrong-domain link; never attempted.
    InvalidLink(String),
    /// Every attempt of the exchange failed; `reason` is the last error.
    BypassFailed { reason: String, attempts: u32 },
    /// Not attempted because the host stayed busy for the whole admission wait.
    Skipped(String),
    /// Anything else that escaped an attempt (session setup failure, panic).
    UnexpectedError(String),
}

/// Outcome variant without its payload, for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Success,
    InvalidLink,
    BypassFailed,
    Skipped,
    UnexpectedError,
}

impl ResolutionOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            ResolutionOutcome::Success(_) => OutcomeKind::Success,
            ResolutionOutcome::InvalidLink(_) => OutcomeKind::InvalidLink,
            ResolutionOutcome::BypassFailed { .. } => OutcomeKind::BypassFailed,
            ResolutionOutcome::Skipped(_) => OutcomeKind::Skipped,
            ResolutionOutcome::UnexpectedError(_) => OutcomeKind::UnexpectedError,
        }
    }

    /// Failures go to the failure ledger. A skip is not a failure.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ResolutionOutcome::InvalidLink(_)
                | ResolutionOutcome::BypassFailed { .. }
                | ResolutionOutcome::UnexpectedError(_)
        )
    }

    /// Attempts of the token exchange that were made (0 if never attempted).
    pub fn attempts(&self) -> u32 {
        match self {
            ResolutionOutcome::BypassFailed { attempts, .. } => *attempts,
            _ => 0,
        }
    }

    pub fn final_url(&self) -> Option<&str> {
        match self {
            ResolutionOutcome::Success(url) => Some(url),
            _ => None,
        }
    }
}

/// Rendered outcomes end up as one line of the result file and the failure
/// ledger, so text from the service or the environment is flattened.
impl fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionOutcome::Success(url) => f.write_str(&single_line(url)),
            ResolutionOutcome::InvalidLink(reason) => {
                write!(f, "Bypass failed: {}", single_line(reason))
            }
            ResolutionOutcome::BypassFailed { reason, attempts } => write!(
                f,
                "Bypass failed after {} attempt{}: {}",
                attempts,
                if *attempts == 1 { "" } else { "s" },
                single_line(reason)
            ),
            ResolutionOutcome::Skipped(reason) => write!(f, "Skipped ({})", single_line(reason)),
            ResolutionOutcome::UnexpectedError(reason) => {
                write!(f, "Unexpected error: {}", single_line(reason))
            }
        }
    }
}

/// Replaces line breaks and other control characters with a space.
fn single_line(text: &str) -> Cow<'_, str> {
    if text.chars().any(char::is_control) {
        Cow::Owned(
            text.chars()
                .map(|c| if c.is_control() { ' ' } else { c })
                .collect(),
        )
    } else {
        Cow::Borrowed(text)
    }
}
