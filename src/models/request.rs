//! Pending request model.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::{IdentityToken, SessionRef};

/// Discriminator sent to the remote API as the `action` field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Registration of a player who just joined; nobody awaits a reply.
    Join,
    /// Free-text lookup issued by a player command.
    Query,
}

impl RequestKind {
    /// Wire value of the `action` field.
    #[must_use]
    pub fn action(self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::Query => "query",
        }
    }
}

impl Display for RequestKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.action())
    }
}

/// Ordered field-name to raw-value mapping.
///
/// Declaration order is preserved so encoded payloads are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFields(Vec<(String, String)>);

impl RequestFields {
    /// Empty field list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, keeping declaration order.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((name.into(), value.into()));
        self
    }

    /// Raw value of the first field called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no fields are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Weak capability pointing back at whoever issued a request.
///
/// Holding one does not keep the session alive. Before any private
/// delivery the token must be compared with the slot's current occupant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequesterIdentity {
    /// Slot the request was issued from.
    pub session: SessionRef,
    /// Identity of the occupant at issue time.
    pub token: IdentityToken,
}

impl RequesterIdentity {
    /// Capture the requester behind `session`.
    #[must_use]
    pub fn new(session: SessionRef, token: IdentityToken) -> Self {
        Self { session, token }
    }

    /// Whether `current` (the slot's present identity) is still the requester.
    #[must_use]
    pub fn matches(&self, current: Option<&IdentityToken>) -> bool {
        current.is_some_and(|identity| *identity == self.token)
    }
}

/// A request waiting in the queue or occupying the in-flight slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    /// Action sent to the remote API.
    pub kind: RequestKind,
    /// Fields appended after the API key.
    pub fields: RequestFields,
    /// Who receives reply lines; `None` for host-generated requests.
    pub requester: Option<RequesterIdentity>,
    /// When the request entered the queue.
    pub enqueued_at: DateTime<Utc>,
}

impl PendingRequest {
    /// Registration request for a player who just joined.
    #[must_use]
    pub fn join(callsign: &str, bzid: &str, ipaddress: &str, build: &str) -> Self {
        Self {
            kind: RequestKind::Join,
            fields: RequestFields::new()
                .with("callsign", callsign)
                .with("bzid", bzid)
                .with("ipaddress", ipaddress)
                .with("build", build),
            requester: None,
            enqueued_at: Utc::now(),
        }
    }

    /// Lookup request on behalf of `requester`.
    #[must_use]
    pub fn query(term: &str, requester: RequesterIdentity) -> Self {
        Self {
            kind: RequestKind::Query,
            fields: RequestFields::new().with("query", term),
            requester: Some(requester),
            enqueued_at: Utc::now(),
        }
    }
}
