//! HTTP sessions used by the resolution protocol.
//!
//! A session owns one cookie jar and one user agent chosen at creation; the
//! three protocol calls for a link must all go through the same session.
//! [`Transport`] is the seam between the protocol and the network so the
//! protocol and the dispatch engine can be unit tested with scripted
//! in-memory sessions.

mod curl_session;
#[cfg(test)]
pub(crate) mod mock;
mod user_agent;

pub use curl_session::{CurlSession, CurlSessionFactory, SessionOptions, SERVICE_ORIGIN};
pub use user_agent::{UserAgentPolicy, USER_AGENTS};

use crate::cookies::CookieJar;
use crate::error::ResolveError;

/// Buffered response of one HTTP call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u32,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One HTTP session: persistent cookies and a user agent fixed for its lifetime.
pub trait Transport {
    /// User agent chosen when the session was opened.
    fn user_agent(&self) -> &str;

    /// Plain GET, following redirects.
    fn get(&mut self, url: &str) -> Result<HttpResponse, ResolveError>;

    /// POST a JSON body.
    fn post_json(
        &mut self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, ResolveError>;

    /// Snapshot of the session's cookies.
    fn cookies(&mut self) -> Result<CookieJar, ResolveError>;
}

/// Opens sessions for the dispatch engine. Shared by all workers.
pub trait SessionFactory: Send + Sync {
    type Session: Transport;

    /// Open a new session whose jar starts as a copy of `seed`.
    fn open(&self, seed: &CookieJar) -> Result<Self::Session, ResolveError>;
}
