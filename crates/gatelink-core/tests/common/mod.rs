// Each test binary uses a different subset of the helpers.
#![allow(dead_code)]

pub mod graphql_server;
