//! User-agent selection for new sessions.

/// Desktop and mobile browser user agents sessions rotate through.
pub const USER_AGENTS: [&str; 6] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:128.0) Gecko/20100101 Firefox/128.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Linux; Android 10; Mobile) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1",
];

/// How a new session picks its user agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAgentPolicy {
    /// Every session uses this string.
    Fixed(String),
    /// Each session draws one from [`USER_AGENTS`].
    Rotate,
}

impl UserAgentPolicy {
    pub fn from_override(user_agent: Option<&str>) -> Self {
        match user_agent {
            Some(ua) if !ua.trim().is_empty() => UserAgentPolicy::Fixed(ua.trim().to_string()),
            _ => UserAgentPolicy::Rotate,
        }
    }

    pub fn choose(&self) -> String {
        match self {
            UserAgentPolicy::Fixed(ua) => ua.clone(),
            UserAgentPolicy::Rotate => USER_AGENTS[fastrand::usize(..USER_AGENTS.len())].to_string(),
        }
    }
}
