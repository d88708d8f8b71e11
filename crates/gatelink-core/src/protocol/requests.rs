//! GraphQL request bodies for the three protocol steps.

use serde_json::{json, Value};

use crate::link::LinkIdentifier;

const GET_DETAIL_PAGE_CONTENT: &str = include_str!("queries/get_detail_page_content.graphql");
const COMPLETE_DETAIL_PAGE_CONTENT: &str =
    include_str!("queries/complete_detail_page_content.graphql");
const GET_DETAIL_PAGE_TARGET: &str = include_str!("queries/get_detail_page_target.graphql");

/// The three operations of the exchange, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetDetailPageContent,
    CompleteDetailPageContent,
    GetDetailPageTarget,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::GetDetailPageContent => "getDetailPageContent",
            Operation::CompleteDetailPageContent => "completeDetailPageContent",
            Operation::GetDetailPageTarget => "getDetailPageTarget",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            Operation::GetDetailPageContent,
            Operation::CompleteDetailPageContent,
            Operation::GetDetailPageTarget,
        ]
        .into_iter()
        .find(|op| op.name() == name)
    }

    fn query(self) -> &'static str {
        match self {
            Operation::GetDetailPageContent => GET_DETAIL_PAGE_CONTENT,
            Operation::CompleteDetailPageContent => COMPLETE_DETAIL_PAGE_CONTENT,
            Operation::GetDetailPageTarget => GET_DETAIL_PAGE_TARGET,
        }
    }
}

fn link_identification(link: &LinkIdentifier) -> Value {
    json!({
        "userIdAndUrl": {
            "user_id": link.owner_id(),
            "url": link.post_id(),
        }
    })
}

fn envelope(op: Operation, variables: Value) -> Value {
    json!({
        "operationName": op.name(),
        "variables": variables,
        "query": op.query(),
    })
}

pub(super) fn access_token_request(link: &LinkIdentifier) -> Value {
    envelope(
        Operation::GetDetailPageContent,
        json!({
            "linkIdentificationInput": link_identification(link),
            "origin": "sharing",
            "additional_data": {
                "taboola": {
                    "user_id": "fallbackUserId",
                    "url": link.canonical_url(),
                }
            }
        }),
    )
}

pub(super) fn post_token_request(link: &LinkIdentifier, access_token: &str) -> Value {
    envelope(
        Operation::CompleteDetailPageContent,
        json!({
            "linkIdentificationInput": link_identification(link),
            "completeDetailPageContentInput": {
                "access_token": access_token,
            }
        }),
    )
}

pub(super) fn target_request(link: &LinkIdentifier, post_token: &str) -> Value {
    envelope(
        Operation::GetDetailPageTarget,
        json!({
            "linkIdentificationInput": link_identification(link),
            "token": post_token,
        }),
    )
}
