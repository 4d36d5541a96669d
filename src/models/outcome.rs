//! Job identities and terminal transport outcomes.

use std::fmt::{Display, Formatter};

use bytes::Bytes;
use uuid::Uuid;

/// Opaque identity of one submitted transport job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    /// Fresh, unique job identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for JobId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The single terminal signal a transport delivers for each job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOutcome {
    /// Body fully received; carries the final fragment (possibly empty).
    Completed(Bytes),
    /// The transport's deadline elapsed.
    TimedOut,
    /// Transport-level failure with a diagnostic description.
    Errored(String),
}

impl TransportOutcome {
    /// Short label used in logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed(_) => "completed",
            Self::TimedOut => "timed_out",
            Self::Errored(_) => "errored",
        }
    }
}

/// Events a transport emits while a job runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A body fragment arrived before completion.
    Chunk {
        /// Job the fragment belongs to.
        job: JobId,
        /// Raw bytes.
        data: Bytes,
    },
    /// The job reached its terminal outcome.
    Finished {
        /// Job that finished.
        job: JobId,
        /// How it finished.
        outcome: TransportOutcome,
    },
}
