//! Host bridge: NDJSON over the relay's stdio.
//!
//! The host writes [`HostEvent`](crate::host::HostEvent)s to the relay's
//! stdin, one JSON object per line, and reads
//! [`HostAction`](crate::host::HostAction)s from its stdout the same way.
//!
//! - `codec`: line framing with a per-line size cap.
//! - `reader`: stdin → host inbox.
//! - `writer`: outbound actions → stdout.

pub mod codec;
pub mod reader;
pub mod writer;
