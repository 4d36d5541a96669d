#![forbid(unsafe_code)]

//! Single-flight relay between a game server and a player database API.
//!
//! The host reports joins and `lookup` commands; the relay queues them,
//! keeps at most one request in flight against the remote endpoint, and
//! routes each response line either back to the requester or to the
//! administrators.

pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod host;
pub mod models;
pub mod service;
pub mod transport;

pub use config::GlobalConfig;
pub use errors::{AppError, CommandRejection, Result};
