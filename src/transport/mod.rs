//! Transports that carry dispatched requests to the remote API.
//!
//! - `http`: `reqwest` client posting form bodies and streaming replies back
//!   as [`TransportEvent`](crate::models::outcome::TransportEvent)s.

pub mod http;

pub use http::HttpTransport;
