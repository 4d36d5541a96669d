//! Pending-request FIFO.

use std::collections::VecDeque;

use crate::models::request::PendingRequest;

/// Unbounded first-in-first-out queue of requests awaiting dispatch.
#[derive(Debug, Default)]
pub struct RequestQueue {
    items: VecDeque<PendingRequest>,
}

impl RequestQueue {
    /// Empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail.
    pub fn push(&mut self, request: PendingRequest) {
        self.items.push_back(request);
    }

    /// Remove and return the oldest request.
    pub fn pop(&mut self) -> Option<PendingRequest> {
        self.items.pop_front()
    }

    /// Number of queued requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove every queued request, oldest first.
    pub fn drain(&mut self) -> Vec<PendingRequest> {
        self.items.drain(..).collect()
    }
}
