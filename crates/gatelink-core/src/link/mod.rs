//! Gated-link parsing.
//!
//! Validates a URL against the known service hostnames and decomposes its
//! path into an owner id and a post id. Pure: no I/O.

mod identifier;

pub use identifier::{LinkIdentifier, OWNER_ID_LEN};

use crate::error::ResolveError;

/// Hostnames the service publishes gated links under.
pub const SERVICE_HOSTS: [&str; 5] = [
    "linkvertise.com",
    "link-target.net",
    "link-center.net",
    "link-hub.net",
    "direct-link.net",
];

/// True if `host` is one of [`SERVICE_HOSTS`].
pub fn is_service_host(host: &str) -> bool {
    SERVICE_HOSTS.iter().any(|h| h.eq_ignore_ascii_case(host))
}

/// Parses a gated link into a [`LinkIdentifier`].
///
/// With `check_domain`, any host outside [`SERVICE_HOSTS`] is rejected. The
/// path must be exactly `/<owner>/<post>` (leading/trailing slashes ignored)
/// and the owner id must be [`OWNER_ID_LEN`] characters.
pub fn parse_link(link: &str, check_domain: bool) -> Result<LinkIdentifier, ResolveError> {
    let invalid = || ResolveError::InvalidLink(link.to_string());

    let parsed = url::Url::parse(link.trim()).map_err(|_| invalid())?;

    if check_domain {
        let host = parsed.host_str().unwrap_or("");
        if !is_service_host(host) || parsed.port().is_some() {
            return Err(invalid());
        }
    }

    let segments: Vec<&str> = parsed.path().trim_matches('/').split('/').collect();
    match segments.as_slice() {
        [owner, post] if !owner.is_empty() && !post.is_empty() => {
            LinkIdentifier::new(*owner, *post).map_err(|_| invalid())
        }
        _ => Err(invalid()),
    }
}
