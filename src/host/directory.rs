//! Table of sessions currently connected to the host.

use std::collections::HashMap;

use tracing::debug;

use crate::models::session::{IdentityToken, SessionRecord, SessionRef};

/// Current occupant of every session slot.
#[derive(Debug, Default)]
pub struct SessionDirectory {
    sessions: HashMap<SessionRef, SessionRecord>,
}

impl SessionDirectory {
    /// Empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new occupant, replacing whoever held the slot before.
    pub fn insert(&mut self, record: SessionRecord) {
        if let Some(previous) = self.sessions.insert(record.session, record) {
            debug!(session = %previous.session, callsign = %previous.callsign, "session slot reused");
        }
    }

    /// Vacate a slot, returning its last occupant.
    pub fn remove(&mut self, session: SessionRef) -> Option<SessionRecord> {
        self.sessions.remove(&session)
    }

    /// Occupant of `session`, if any.
    #[must_use]
    pub fn get(&self, session: SessionRef) -> Option<&SessionRecord> {
        self.sessions.get(&session)
    }

    /// Revalidation lookup: the verified identity in `session`, if any.
    #[must_use]
    pub fn identity(&self, session: SessionRef) -> Option<IdentityToken> {
        self.get(session).and_then(SessionRecord::identity)
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
