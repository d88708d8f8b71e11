pub mod config;
pub mod logging;

pub mod admission;
pub mod cookies;
pub mod dispatch;
pub mod error;
pub mod input;
pub mod link;
pub mod outcome;
pub mod protocol;
pub mod retry;
pub mod session;
pub mod session_store;
pub mod sink;
