//! Host session records and the weak references that point at them.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Slot index of a session on the host.
///
/// Slots are reused: the same `SessionRef` may denote a different player
/// after the original occupant leaves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SessionRef(pub u32);

impl Display for SessionRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable identity of a registered player (the host's global account id).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct IdentityToken(pub String);

impl IdentityToken {
    /// Wrap a raw identity id.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw identity id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Current occupant of a session slot as reported by the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SessionRecord {
    /// Slot the occupant is connected on.
    pub session: SessionRef,
    /// Display name.
    pub callsign: String,
    /// Global account id; empty for unregistered players.
    pub bzid: String,
    /// Network address the player connected from.
    pub ipaddress: String,
    /// Client build string.
    pub build: String,
    /// Whether the host authenticated `bzid`.
    #[serde(default)]
    pub verified: bool,
    /// Permission names granted to the occupant.
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl SessionRecord {
    /// Identity the occupant can be revalidated against, if any.
    ///
    /// Unverified players have no stable identity and never match a token.
    #[must_use]
    pub fn identity(&self) -> Option<IdentityToken> {
        (self.verified && !self.bzid.is_empty()).then(|| IdentityToken::new(self.bzid.clone()))
    }

    /// Whether the occupant holds `permission`.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|granted| granted == permission)
    }
}
