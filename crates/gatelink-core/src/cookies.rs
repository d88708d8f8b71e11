//! Cookie jar shared between sessions.
//!
//! Cookies are exchanged with curl's cookie engine as Netscape cookie-file
//! lines. A jar is keyed by `(domain, path, name)`; merging is last-writer-wins.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

/// One cookie as stored by curl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    /// Unix timestamp; 0 for a session cookie.
    pub expires: i64,
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub http_only: bool,
}

impl Cookie {
    /// Parse one Netscape cookie-file line (as returned by `curl::easy::Easy::cookies`).
    pub fn from_netscape(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (http_only, line) = match line.strip_prefix(HTTP_ONLY_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 6 {
            return None;
        }
        Some(Self {
            domain: fields[0].to_string(),
            include_subdomains: fields[1].eq_ignore_ascii_case("TRUE"),
            path: fields[2].to_string(),
            secure: fields[3].eq_ignore_ascii_case("TRUE"),
            expires: fields[4].parse().unwrap_or(0),
            name: fields[5].to_string(),
            value: fields.get(6).copied().unwrap_or("").to_string(),
            http_only,
        })
    }

    /// Render as a Netscape cookie-file line (accepted by `curl::easy::Easy::cookie_list`).
    pub fn to_netscape(&self) -> String {
        let flag = |b: bool| if b { "TRUE" } else { "FALSE" };
        format!(
            "{}{}\t{}\t{}\t{}\t{}\t{}\t{}",
            if self.http_only { HTTP_ONLY_PREFIX } else { "" },
            self.domain,
            flag(self.include_subdomains),
            self.path,
            flag(self.secure),
            self.expires,
            self.name,
            self.value
        )
    }

    fn key(&self) -> (String, String, String) {
        (self.domain.clone(), self.path.clone(), self.name.clone())
    }
}

/// Set of cookies keyed by `(domain, path, name)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: BTreeMap<(String, String, String), Cookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Insert, replacing any cookie with the same key.
    pub fn insert(&mut self, cookie: Cookie) {
        self.cookies.insert(cookie.key(), cookie);
    }

    pub fn get(&self, domain: &str, path: &str, name: &str) -> Option<&Cookie> {
        self.cookies
            .get(&(domain.to_string(), path.to_string(), name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.values()
    }

    /// Union with `other`; cookies from `other` overwrite same-keyed ones here.
    pub fn merge(&mut self, other: &CookieJar) {
        for cookie in other.iter() {
            self.insert(cookie.clone());
        }
    }

    /// Build a jar from Netscape lines, skipping any that do not parse.
    pub fn from_netscape_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        lines.into_iter().filter_map(Cookie::from_netscape).collect()
    }
}

impl FromIterator<Cookie> for CookieJar {
    fn from_iter<I: IntoIterator<Item = Cookie>>(iter: I) -> Self {
        let mut jar = CookieJar::new();
        for cookie in iter {
            jar.insert(cookie);
        }
        jar
    }
}

/// Process-wide jar that finished sessions merge into, in completion order.
#[derive(Debug, Default)]
pub struct SharedCookieJar {
    inner: Mutex<CookieJar>,
}

impl SharedCookieJar {
    pub fn new(initial: CookieJar) -> Self {
        Self {
            inner: Mutex::new(initial),
        }
    }

    pub fn merge(&self, jar: &CookieJar) {
        match self.inner.lock() {
            Ok(mut merged) => merged.merge(jar),
            Err(poisoned) => poisoned.into_inner().merge(jar),
        }
    }

    pub fn snapshot(&self) -> CookieJar {
        match self.inner.lock() {
            Ok(jar) => jar.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
