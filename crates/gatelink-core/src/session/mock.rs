//! Scripted in-memory sessions for tests.
//!
//! Every call is recorded and answered by a shared handler, so tests can
//! assert on the order of calls, session affinity and user agents without
//! touching the network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::cookies::{Cookie, CookieJar};
use crate::error::ResolveError;
use crate::protocol::Operation;

use super::{HttpResponse, SessionFactory, Transport};

/// Domain of the cookies mock sessions hand out.
pub const MOCK_COOKIE_DOMAIN: &str = "mock.test";

/// One recorded call.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub session_id: usize,
    pub user_agent: String,
    pub method: &'static str,
    pub url: String,
    pub operation: Option<Operation>,
    pub body: Option<serde_json::Value>,
}

type Handler = dyn Fn(&MockRequest) -> Result<HttpResponse, ResolveError> + Send + Sync;

/// Opens [`MockSession`]s that all answer through one handler.
#[derive(Clone)]
pub struct MockSessionFactory {
    handler: Arc<Handler>,
    log: Arc<Mutex<Vec<MockRequest>>>,
    opened: Arc<AtomicUsize>,
    fail_open: bool,
}

impl MockSessionFactory {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&MockRequest) -> Result<HttpResponse, ResolveError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            log: Arc::new(Mutex::new(Vec::new())),
            opened: Arc::new(AtomicUsize::new(0)),
            fail_open: false,
        }
    }

    /// Factory whose sessions resolve every link to `final_url`.
    pub fn resolving(final_url: &str) -> Self {
        let final_url = final_url.to_string();
        Self::new(move |req| service_response(req, &final_url))
    }

    /// Make every `open` fail.
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// All calls made so far, in order.
    pub fn requests(&self) -> Vec<MockRequest> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Number of sessions opened.
    pub fn sessions_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl SessionFactory for MockSessionFactory {
    type Session = MockSession;

    fn open(&self, seed: &CookieJar) -> Result<MockSession, ResolveError> {
        if self.fail_open {
            return Err(ResolveError::Session("mock open failure".to_string()));
        }
        let id = self.opened.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MockSession {
            id,
            user_agent: format!("mock-agent/{id}"),
            jar: seed.clone(),
            calls: 0,
            handler: Arc::clone(&self.handler),
            log: Arc::clone(&self.log),
        })
    }
}

/// In-memory session; a successful call sets cookie `seen-<id>` to the call count.
pub struct MockSession {
    id: usize,
    user_agent: String,
    jar: CookieJar,
    calls: usize,
    handler: Arc<Handler>,
    log: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockSession {
    pub fn id(&self) -> usize {
        self.id
    }

    fn dispatch(
        &mut self,
        method: &'static str,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, ResolveError> {
        let request = MockRequest {
            session_id: self.id,
            user_agent: self.user_agent.clone(),
            method,
            url: url.to_string(),
            operation: body
                .and_then(|b| b["operationName"].as_str())
                .and_then(Operation::from_name),
            body: body.cloned(),
        };
        if let Ok(mut log) = self.log.lock() {
            log.push(request.clone());
        }
        let res = (self.handler)(&request)?;
        self.calls += 1;
        self.jar.insert(Cookie {
            domain: MOCK_COOKIE_DOMAIN.to_string(),
            include_subdomains: false,
            path: "/".to_string(),
            secure: false,
            expires: 0,
            name: format!("seen-{}", self.id),
            value: self.calls.to_string(),
            http_only: false,
        });
        Ok(res)
    }
}

impl Transport for MockSession {
    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn get(&mut self, url: &str) -> Result<HttpResponse, ResolveError> {
        self.dispatch("GET", url, None)
    }

    fn post_json(
        &mut self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, ResolveError> {
        self.dispatch("POST", url, Some(body))
    }

    fn cookies(&mut self) -> Result<CookieJar, ResolveError> {
        Ok(self.jar.clone())
    }
}

/// Well-behaved service: GETs return a page; each operation returns the next
/// token (`access-<owner>`, `post-<owner>`) and finally `final_url`.
pub fn service_response(req: &MockRequest, final_url: &str) -> Result<HttpResponse, ResolveError> {
    let owner = req
        .body
        .as_ref()
        .and_then(|b| b["variables"]["linkIdentificationInput"]["userIdAndUrl"]["user_id"].as_str())
        .unwrap_or("")
        .to_string();
    let body = match req.operation {
        None => return Ok(ok("<html></html>".to_string())),
        Some(Operation::GetDetailPageContent) => json!({
            "data": { "getDetailPageContent": { "access_token": format!("access-{owner}") } }
        }),
        Some(Operation::CompleteDetailPageContent) => json!({
            "data": { "completeDetailPageContent": { "TARGET": format!("post-{owner}") } }
        }),
        Some(Operation::GetDetailPageTarget) => json!({
            "data": { "getDetailPageTarget": { "url": final_url } }
        }),
    };
    Ok(ok(body.to_string()))
}

fn ok(body: String) -> HttpResponse {
    HttpResponse { status: 200, body }
}
