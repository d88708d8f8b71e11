//! Three-step token exchange as an explicit state machine.

use serde_json::Value;

use crate::error::ResolveError;
use crate::link::LinkIdentifier;
use crate::session::Transport;

use super::{requests, response};

/// Where an exchange stands. Tokens are carried by the state that received them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeState {
    Start,
    HaveAccessToken(String),
    HavePostToken(String),
    Resolved(String),
}

impl ExchangeState {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ExchangeState::Resolved(_))
    }

    /// Perform the one network call that leaves this state.
    /// `Resolved` is terminal and is returned unchanged.
    pub fn advance<T: Transport>(
        self,
        session: &mut T,
        endpoint: &str,
        link: &LinkIdentifier,
    ) -> Result<ExchangeState, ResolveError> {
        match self {
            ExchangeState::Start => {
                let body = call(session, endpoint, &requests::access_token_request(link))?;
                let token = response::access_token(&body)?;
                tracing::debug!(link = %link, "received access token");
                Ok(ExchangeState::HaveAccessToken(token))
            }
            ExchangeState::HaveAccessToken(access_token) => {
                let body = call(
                    session,
                    endpoint,
                    &requests::post_token_request(link, &access_token),
                )?;
                let token = response::post_token(&body)?;
                tracing::debug!(link = %link, "received post token");
                Ok(ExchangeState::HavePostToken(token))
            }
            ExchangeState::HavePostToken(post_token) => {
                let body = call(session, endpoint, &requests::target_request(link, &post_token))?;
                let url = response::target_url(&body)?;
                tracing::debug!(link = %link, "resolved target");
                Ok(ExchangeState::Resolved(url))
            }
            resolved @ ExchangeState::Resolved(_) => Ok(resolved),
        }
    }
}

/// POST one request; non-2xx is an error.
fn call<T: Transport>(session: &mut T, endpoint: &str, payload: &Value) -> Result<String, ResolveError> {
    let res = session.post_json(endpoint, payload)?;
    tracing::trace!(
        operation = payload["operationName"].as_str().unwrap_or(""),
        status = res.status,
        "graphql call"
    );
    if !res.is_success() {
        return Err(ResolveError::Http(res.status));
    }
    Ok(res.body)
}

/// Run the exchange from `Start` to `Resolved` and return the final URL.
pub fn run_exchange<T: Transport>(
    session: &mut T,
    endpoint: &str,
    link: &LinkIdentifier,
) -> Result<String, ResolveError> {
    let mut state = ExchangeState::Start;
    loop {
        state = state.advance(session, endpoint, link)?;
        if let ExchangeState::Resolved(url) = state {
            return Ok(url);
        }
    }
}
