//! Requests produced by host lifecycle events.

use crate::models::request::PendingRequest;
use crate::models::session::SessionRecord;

/// Registration request for a freshly joined player. Nobody awaits a reply.
#[must_use]
pub fn join_request(record: &SessionRecord) -> PendingRequest {
    PendingRequest::join(
        &record.callsign,
        &record.bzid,
        &record.ipaddress,
        &record.build,
    )
}
