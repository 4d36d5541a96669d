//! Response line classification and delivery.

use tracing::debug;

use super::Host;
use crate::models::request::{PendingRequest, RequesterIdentity};

/// Lines starting with this prefix are diagnostics for administrators.
pub const ADMIN_PREFIX: &str = "ERROR:";

/// Notice sent to the requester when the transport times out.
pub const TIMEOUT_NOTICE: &str = "A timeout occurred during the lookup.";

/// Notice sent to the requester when the transport fails.
pub const ERROR_NOTICE: &str = "An error occurred during the lookup.";

/// Where a response line is headed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Business-logic diagnostic for the administrator channel.
    Administrative,
    /// Result text for the original requester.
    Reply,
}

/// Classify a single response line.
#[must_use]
pub fn classify(line: &str) -> LineKind {
    if line.starts_with(ADMIN_PREFIX) {
        LineKind::Administrative
    } else {
        LineKind::Reply
    }
}

/// Tally of what happened to the lines of one response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteReport {
    /// Lines broadcast to administrators.
    pub administrative: usize,
    /// Lines delivered to a revalidated requester.
    pub delivered: usize,
    /// Lines dropped because the requester no longer occupies the slot.
    pub stale: usize,
    /// Reply lines for requests without a requester (joins).
    pub unaddressed: usize,
}

/// Stateless router applying the delivery rules to one request's output.
pub struct ResponseRouter;

impl ResponseRouter {
    /// Deliver every line of a completed response, in order.
    pub fn route<H: Host + ?Sized>(
        request: &PendingRequest,
        lines: &[String],
        host: &mut H,
    ) -> RouteReport {
        let mut report = RouteReport::default();

        for line in lines {
            match classify(line) {
                LineKind::Administrative => {
                    host.broadcast_admins(line);
                    report.administrative += 1;
                }
                LineKind::Reply => match request.requester {
                    Some(ref requester) => {
                        if Self::deliver_private(requester, line, host) {
                            report.delivered += 1;
                        } else {
                            report.stale += 1;
                        }
                    }
                    None => {
                        debug!(kind = %request.kind, line = line.as_str(), "reply line without requester");
                        report.unaddressed += 1;
                    }
                },
            }
        }

        report
    }

    /// Send a single fixed notice to the requester, if there is one.
    pub fn notify<H: Host + ?Sized>(
        request: &PendingRequest,
        notice: &str,
        host: &mut H,
    ) -> RouteReport {
        let mut report = RouteReport::default();
        match request.requester {
            Some(ref requester) => {
                if Self::deliver_private(requester, notice, host) {
                    report.delivered = 1;
                } else {
                    report.stale = 1;
                }
            }
            None => report.unaddressed = 1,
        }
        report
    }

    /// Revalidate `requester` against the slot's current occupant and send.
    ///
    /// Returns `false` (and sends nothing) when the slot is empty or now
    /// belongs to somebody else.
    fn deliver_private<H: Host + ?Sized>(
        requester: &RequesterIdentity,
        text: &str,
        host: &mut H,
    ) -> bool {
        let current = host.current_identity(requester.session);
        if !requester.matches(current.as_ref()) {
            debug!(
                session = %requester.session,
                "requester no longer occupies session, dropping reply"
            );
            return false;
        }

        host.send_private(requester.session, text);
        true
    }
}
