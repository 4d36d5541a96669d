//! Single-flight request dispatch.
//!
//! Requests are queued in FIFO order and handed to a [`Transport`] one at a
//! time. Whatever the transport reports back for the in-flight job is
//! assembled into lines and routed through a [`Host`] either to the original
//! requester (after identity revalidation) or to the administrators.
//!
//! Submodules:
//! - `builder`: form payload encoding.
//! - `queue`: the pending-request FIFO.
//! - `assembler`: chunk accumulation and line splitting.
//! - `router`: line classification and delivery.
//! - `dispatcher`: the in-flight slot and its state machine.

pub mod assembler;
pub mod builder;
pub mod dispatcher;
pub mod queue;
pub mod router;

pub use dispatcher::{DispatchState, DispatchStats, Dispatcher};

use crate::models::outcome::JobId;
use crate::models::session::{IdentityToken, SessionRef};

/// Outbound side of the relay: something that can run one request job.
///
/// Implementations must eventually report exactly one terminal outcome for
/// every submitted job, optionally preceded by body chunks.
pub trait Transport {
    /// Start `job` with the encoded form `payload`. Must not block.
    fn submit(&mut self, job: JobId, payload: String);
}

/// The host application as seen by the router.
pub trait Host {
    /// Identity currently occupying `session`, if the slot is occupied by a
    /// verified player.
    fn current_identity(&self, session: SessionRef) -> Option<IdentityToken>;

    /// Deliver `text` privately to whoever is in `session` right now.
    fn send_private(&mut self, session: SessionRef, text: &str);

    /// Deliver `text` to every administrator.
    fn broadcast_admins(&mut self, text: &str);
}
