//! Minimal HTTP/1.1 server imitating the service for integration tests.
//!
//! `GET /<owner>/<post>` serves a page and sets the `lv_session` cookie.
//! `POST /graphql` answers the three operations, but only for requests that
//! carry that cookie; tokens must be forwarded from the previous step.
//! Every connection is closed after one response.

use serde_json::{json, Value};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const SESSION_COOKIE: &str = "lv_session";
pub const SESSION_VALUE: &str = "warm";
/// Owner id the server answers with a GraphQL `errors` array.
pub const UNKNOWN_OWNER: &str = "nope00";

#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Destination returned by the last step.
    pub final_url: String,
    /// Answer this many first `getDetailPageContent` calls with 503.
    pub throttle_first: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            final_url: "https://final.example.com/page".to_string(),
            throttle_first: 0,
        }
    }
}

/// One request as the server saw it.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub user_agent: Option<String>,
    pub cookie: Option<String>,
    pub operation: Option<String>,
}

struct State {
    opts: ServerOptions,
    seen: Mutex<Vec<SeenRequest>>,
    content_calls: AtomicUsize,
}

pub struct GraphqlServer {
    base: String,
    state: Arc<State>,
}

impl GraphqlServer {
    /// Base URL with trailing slash, e.g. `http://127.0.0.1:12345/`.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn endpoint(&self) -> String {
        format!("{}graphql", self.base)
    }

    pub fn link(&self, owner: &str, post: &str) -> String {
        format!("{}{}/{}", self.base, owner, post)
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start(opts: ServerOptions) -> GraphqlServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(State {
        opts,
        seen: Mutex::new(Vec::new()),
        content_calls: AtomicUsize::new(0),
    });
    let server_state = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&server_state);
            thread::spawn(move || handle(stream, &state));
        }
    });
    GraphqlServer {
        base: format!("http://127.0.0.1:{}/", port),
        state,
    }
}

struct Request {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Request {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = std::str::from_utf8(&data[..header_end]).ok()?;
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = data[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
    }
    Some(Request {
        method,
        path,
        headers,
        body,
    })
}

fn respond(stream: &mut TcpStream, status: &str, extra_headers: &str, content_type: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        extra_headers,
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

fn handle(mut stream: TcpStream, state: &State) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let req = match read_request(&mut stream) {
        Some(r) => r,
        None => return,
    };
    let body: Value = serde_json::from_slice(&req.body).unwrap_or(Value::Null);
    let operation = body["operationName"].as_str().map(str::to_string);
    state.seen.lock().unwrap().push(SeenRequest {
        method: req.method.clone(),
        path: req.path.clone(),
        user_agent: req.header("user-agent").map(str::to_string),
        cookie: req.header("cookie").map(str::to_string),
        operation: operation.clone(),
    });

    if req.method == "GET" {
        let cookie = format!("Set-Cookie: {}={}; Path=/\r\n", SESSION_COOKIE, SESSION_VALUE);
        respond(&mut stream, "200 OK", &cookie, "text/html", "<html><body>gated</body></html>");
        return;
    }
    if req.method != "POST" || req.path != "/graphql" {
        respond(&mut stream, "404 Not Found", "", "text/plain", "not found");
        return;
    }

    let expected = format!("{}={}", SESSION_COOKIE, SESSION_VALUE);
    let has_session = req
        .header("cookie")
        .map(|c| c.split(';').any(|kv| kv.trim() == expected))
        .unwrap_or(false);
    if !has_session {
        respond(&mut stream, "403 Forbidden", "", "text/plain", "no session");
        return;
    }

    let vars = &body["variables"];
    let owner = vars["linkIdentificationInput"]["userIdAndUrl"]["user_id"]
        .as_str()
        .unwrap_or("")
        .to_string();
    let answer = match operation.as_deref() {
        Some("getDetailPageContent") => {
            if state.content_calls.fetch_add(1, Ordering::SeqCst) < state.opts.throttle_first {
                respond(&mut stream, "503 Service Unavailable", "", "text/plain", "slow down");
                return;
            }
            if owner == UNKNOWN_OWNER {
                json!({ "data": null, "errors": [{ "message": "link not found" }] })
            } else {
                json!({ "data": { "getDetailPageContent": { "access_token": format!("access-{owner}") } } })
            }
        }
        Some("completeDetailPageContent") => {
            if vars["completeDetailPageContentInput"]["access_token"] != format!("access-{owner}") {
                json!({ "errors": [{ "message": "bad access token" }] })
            } else {
                json!({ "data": { "completeDetailPageContent": { "TARGET": format!("post-{owner}") } } })
            }
        }
        Some("getDetailPageTarget") => {
            if vars["token"] != format!("post-{owner}") {
                json!({ "errors": [{ "message": "bad post token" }] })
            } else {
                json!({ "data": { "getDetailPageTarget": { "url": state.opts.final_url } } })
            }
        }
        _ => json!({ "errors": [{ "message": "unknown operation" }] }),
    };
    respond(&mut stream, "200 OK", "", "application/json", &answer.to_string());
}
