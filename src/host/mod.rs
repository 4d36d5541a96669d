//! Host-facing intake: the session table and the request producers.
//!
//! - `directory`: sessions currently connected to the host.
//! - `commands`: the `lookup` chat command.
//! - `events`: requests generated by host lifecycle events.

pub mod commands;
pub mod directory;
pub mod events;

use serde::{Deserialize, Serialize};

use crate::models::session::{SessionRecord, SessionRef};

/// Something the host reports to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    /// A player connected and was assigned a session slot.
    SessionJoined(SessionRecord),
    /// The player in `session` disconnected; the slot may be reused.
    SessionLeft {
        /// Slot that was vacated.
        session: SessionRef,
    },
    /// A player issued a chat command.
    Command {
        /// Slot of the invoking player.
        session: SessionRef,
        /// Command name without the leading slash.
        name: String,
        /// Everything after the command name.
        #[serde(default)]
        argument: String,
    },
}

/// Something the relay asks the host to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HostAction {
    /// Send `text` to the player in `session`.
    PrivateMessage {
        /// Target slot.
        session: SessionRef,
        /// Message body.
        text: String,
    },
    /// Send `text` to every administrator.
    AdminBroadcast {
        /// Message body.
        text: String,
    },
}
