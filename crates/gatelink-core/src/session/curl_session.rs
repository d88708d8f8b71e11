//! libcurl-backed session.
//!
//! One `Easy` handle per session: curl's cookie engine holds the jar and the
//! handle keeps its connection cache, so consecutive calls look like one
//! browser. Calls block the current thread.

use curl::easy::{Easy, List};
use std::time::Duration;

use crate::cookies::CookieJar;
use crate::error::ResolveError;

use super::{HttpResponse, SessionFactory, Transport, UserAgentPolicy};

/// Origin the service's own pages are served from; sent as Origin/Referer.
pub const SERVICE_ORIGIN: &str = "https://linkvertise.com";

/// Transfer limits applied to every call of a session.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub http_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(15),
        }
    }
}

pub struct CurlSession {
    easy: Easy,
    user_agent: String,
}

impl CurlSession {
    /// Open a session with the given user agent, seeding curl's cookie engine from `seed`.
    pub fn open(
        user_agent: String,
        options: SessionOptions,
        seed: &CookieJar,
    ) -> Result<Self, ResolveError> {
        let mut easy = Easy::new();
        // Empty file name turns the cookie engine on without reading anything.
        easy.cookie_file("")?;
        easy.useragent(&user_agent)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.accept_encoding("")?;
        easy.connect_timeout(options.connect_timeout)?;
        easy.timeout(options.http_timeout)?;
        for cookie in seed.iter() {
            easy.cookie_list(&cookie.to_netscape())?;
        }
        Ok(Self { easy, user_agent })
    }

    fn headers(lines: &[&str]) -> Result<List, ResolveError> {
        let mut list = List::new();
        for line in lines {
            list.append(line)?;
        }
        Ok(list)
    }

    fn perform(&mut self) -> Result<HttpResponse, ResolveError> {
        let mut body = Vec::new();
        {
            let mut transfer = self.easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }
        let status = self.easy.response_code()?;
        Ok(HttpResponse {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

impl Transport for CurlSession {
    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn get(&mut self, url: &str) -> Result<HttpResponse, ResolveError> {
        self.easy.get(true)?;
        self.easy.url(url)?;
        self.easy.http_headers(Self::headers(&[
            "Accept: text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            "Accept-Language: en-US,en;q=0.9",
        ])?)?;
        self.perform()
    }

    fn post_json(
        &mut self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, ResolveError> {
        let payload = serde_json::to_vec(body)?;
        self.easy.url(url)?;
        self.easy.post(true)?;
        self.easy.post_fields_copy(&payload)?;
        let origin = format!("Origin: {SERVICE_ORIGIN}");
        let referer = format!("Referer: {SERVICE_ORIGIN}/");
        self.easy.http_headers(Self::headers(&[
            "Content-Type: application/json",
            "Accept: application/json, text/plain, */*",
            "Accept-Language: en-US,en;q=0.9",
            origin.as_str(),
            referer.as_str(),
            // No 100-continue round trip for bodies over 1 KiB.
            "Expect:",
        ])?)?;
        self.perform()
    }

    fn cookies(&mut self) -> Result<CookieJar, ResolveError> {
        let list = self.easy.cookies()?;
        let lines: Vec<String> = list
            .iter()
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect();
        Ok(CookieJar::from_netscape_lines(lines.iter().map(String::as_str)))
    }
}

/// Opens a [`CurlSession`] per call, each with its own user agent.
#[derive(Debug, Clone)]
pub struct CurlSessionFactory {
    options: SessionOptions,
    user_agents: UserAgentPolicy,
}

impl CurlSessionFactory {
    pub fn new(options: SessionOptions, user_agents: UserAgentPolicy) -> Self {
        Self {
            options,
            user_agents,
        }
    }
}

impl SessionFactory for CurlSessionFactory {
    type Session = CurlSession;

    fn open(&self, seed: &CookieJar) -> Result<CurlSession, ResolveError> {
        let user_agent = self.user_agents.choose();
        tracing::debug!(user_agent = %user_agent, seeded_cookies = seed.len(), "opening session");
        CurlSession::open(user_agent, self.options, seed)
    }
}
