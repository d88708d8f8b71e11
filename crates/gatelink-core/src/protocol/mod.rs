//! Link-resolution protocol.
//!
//! Turns a [`LinkIdentifier`](crate::link::LinkIdentifier) into the final
//! destination URL through three GraphQL calls on one session:
//!
//! `Start → HaveAccessToken → HavePostToken → Resolved`
//!
//! Each transition is one network call; any failure aborts the whole
//! exchange. Retrying is the caller's business and always restarts from
//! `Start`.

mod client;
mod exchange;
mod requests;
mod response;

pub use client::{ResolutionClient, ResolverSettings};
pub use exchange::{run_exchange, ExchangeState};
pub use requests::Operation;
