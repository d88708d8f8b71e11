//! Typed GraphQL responses and field extraction.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ResolveError;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessTokenData {
    get_detail_page_content: Option<AccessTokenPayload>,
}

#[derive(Debug, Deserialize)]
struct AccessTokenPayload {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostTokenData {
    complete_detail_page_content: Option<PostTokenPayload>,
}

#[derive(Debug, Deserialize)]
struct PostTokenPayload {
    #[serde(rename = "TARGET")]
    target: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TargetData {
    get_detail_page_target: Option<TargetPayload>,
}

#[derive(Debug, Deserialize)]
struct TargetPayload {
    url: Option<String>,
}

/// Decode the envelope; a non-empty `errors` array wins over `data`.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ResolveError> {
    let response: GraphQlResponse<T> = serde_json::from_str(body)?;
    if let Some(first) = response.errors.as_deref().and_then(|e| e.first()) {
        return Err(ResolveError::Protocol(first.message.clone()));
    }
    response.data.ok_or(ResolveError::MissingField("data"))
}

fn non_empty(value: Option<String>, field: &'static str) -> Result<String, ResolveError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ResolveError::MissingField(field))
}

pub(super) fn access_token(body: &str) -> Result<String, ResolveError> {
    let data: AccessTokenData = decode(body)?;
    non_empty(
        data.get_detail_page_content.and_then(|p| p.access_token),
        "getDetailPageContent.access_token",
    )
}

pub(super) fn post_token(body: &str) -> Result<String, ResolveError> {
    let data: PostTokenData = decode(body)?;
    non_empty(
        data.complete_detail_page_content.and_then(|p| p.target),
        "completeDetailPageContent.TARGET",
    )
}

pub(super) fn target_url(body: &str) -> Result<String, ResolveError> {
    let data: TargetData = decode(body)?;
    non_empty(
        data.get_detail_page_target.and_then(|p| p.url),
        "getDetailPageTarget.url",
    )
}
