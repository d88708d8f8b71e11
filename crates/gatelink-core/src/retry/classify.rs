//! Classify HTTP status and curl errors into retry policy error kinds.

use crate::error::ResolveError;

use super::policy::ErrorKind;

/// Classify a non-2xx HTTP status code.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        _ => ErrorKind::Http(u16::try_from(code).unwrap_or(u16::MAX)),
    }
}

/// Classify a curl error. Anything that is not a timeout is treated as a
/// connection-level failure (reset, DNS, TLS, short read).
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        ErrorKind::Timeout
    } else {
        ErrorKind::Connection
    }
}

/// Classify a resolution error.
pub fn classify(e: &ResolveError) -> ErrorKind {
    match e {
        ResolveError::InvalidLink(_) => ErrorKind::InvalidLink,
        ResolveError::Transport(ce) => classify_curl_error(ce),
        ResolveError::Http(code) => classify_http_status(*code),
        ResolveError::Protocol(_) => ErrorKind::Protocol,
        ResolveError::Json(_) | ResolveError::MissingField(_) => ErrorKind::Malformed,
        ResolveError::Session(_) => ErrorKind::Connection,
    }
}
