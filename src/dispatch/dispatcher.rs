//! In-flight slot and the single-flight state machine.
//!
//! The slot moves `Idle → Sending → {Completed, TimedOut, Errored} → Idle`.
//! Leaving `Sending` always clears the slot and pumps the queue again, so the
//! queue drains without any external polling.

use chrono::Utc;
use tracing::{debug, info, warn};

use super::assembler::ResponseAssembler;
use super::builder::RequestBuilder;
use super::queue::RequestQueue;
use super::router::{ResponseRouter, RouteReport, ERROR_NOTICE, TIMEOUT_NOTICE};
use super::{Host, Transport};
use crate::models::outcome::{JobId, TransportEvent, TransportOutcome};
use crate::models::request::PendingRequest;

/// Observable state of the in-flight slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// No request is in flight.
    Idle,
    /// A request has been submitted and awaits its terminal outcome.
    Sending,
}

/// Running counters kept by the dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Jobs handed to the transport.
    pub submitted: u64,
    /// Jobs that completed with a body.
    pub completed: u64,
    /// Jobs that timed out.
    pub timed_out: u64,
    /// Jobs that failed at the transport layer.
    pub errored: u64,
    /// Lines broadcast to administrators.
    pub administrative_lines: u64,
    /// Private messages delivered to requesters.
    pub replies_delivered: u64,
    /// Private messages dropped after failed revalidation.
    pub stale_drops: u64,
    /// Reply lines discarded because the request had no requester.
    pub unaddressed_lines: u64,
    /// Chunks or outcomes that did not belong to the in-flight job.
    pub stray_events: u64,
}

impl DispatchStats {
    fn record(&mut self, report: RouteReport) {
        self.administrative_lines += report.administrative as u64;
        self.replies_delivered += report.delivered as u64;
        self.stale_drops += report.stale as u64;
        self.unaddressed_lines += report.unaddressed as u64;
    }
}

/// The request occupying the slot together with its partial response.
#[derive(Debug)]
struct InFlight {
    job: JobId,
    request: PendingRequest,
    assembler: ResponseAssembler,
}

/// Owns the queue and the single in-flight slot.
#[derive(Debug)]
pub struct Dispatcher<T> {
    queue: RequestQueue,
    slot: Option<InFlight>,
    builder: RequestBuilder,
    transport: T,
    stats: DispatchStats,
}

impl<T: Transport> Dispatcher<T> {
    /// Create an idle dispatcher submitting through `transport`.
    pub fn new(builder: RequestBuilder, transport: T) -> Self {
        Self {
            queue: RequestQueue::new(),
            slot: None,
            builder,
            transport,
            stats: DispatchStats::default(),
        }
    }

    /// Append a request to the queue without dispatching it.
    pub fn enqueue(&mut self, request: PendingRequest) {
        debug!(kind = %request.kind, pending = self.queue.len() + 1, "request queued");
        self.queue.push(request);
    }

    /// Enqueue a request and immediately try to dispatch.
    ///
    /// Returns the job started by this call, if any.
    pub fn submit(&mut self, request: PendingRequest) -> Option<JobId> {
        self.enqueue(request);
        self.pump()
    }

    /// Start the next queued request when the slot is free.
    ///
    /// Returns the identity of the job just submitted, or `None` when the slot
    /// was busy or the queue empty.
    pub fn pump(&mut self) -> Option<JobId> {
        if self.slot.is_some() {
            return None;
        }
        let request = self.queue.pop()?;

        let job = JobId::new();
        let payload = self.builder.build(request.kind, &request.fields);
        let waited_ms = (Utc::now() - request.enqueued_at).num_milliseconds();
        info!(
            %job,
            kind = %request.kind,
            waited_ms,
            pending = self.queue.len(),
            "submitting request"
        );

        self.slot = Some(InFlight {
            job,
            request,
            assembler: ResponseAssembler::new(),
        });
        self.stats.submitted += 1;
        self.transport.submit(job, payload);
        Some(job)
    }

    /// Buffer a body fragment for the in-flight job.
    pub fn on_chunk(&mut self, job: JobId, data: &[u8]) {
        match self.slot {
            Some(ref mut in_flight) if in_flight.job == job => in_flight.assembler.push(data),
            _ => {
                warn!(%job, bytes = data.len(), "chunk for a job that is not in flight, ignoring");
                self.stats.stray_events += 1;
            }
        }
    }

    /// Process the terminal outcome of `job`, free the slot and pump.
    ///
    /// Returns the next job started as a consequence, if any. Outcomes for
    /// jobs that are not in flight are ignored.
    pub fn on_outcome<H: Host + ?Sized>(
        &mut self,
        job: JobId,
        outcome: TransportOutcome,
        host: &mut H,
    ) -> Option<JobId> {
        let in_flight = match self.slot.take() {
            Some(in_flight) if in_flight.job == job => in_flight,
            other => {
                self.slot = other;
                warn!(%job, outcome = outcome.label(), "outcome for a job that is not in flight, ignoring");
                self.stats.stray_events += 1;
                return None;
            }
        };

        let InFlight {
            request,
            mut assembler,
            ..
        } = in_flight;

        let report = match outcome {
            TransportOutcome::Completed(tail) => {
                assembler.push(&tail);
                let lines = assembler.finish();
                self.stats.completed += 1;
                info!(%job, kind = %request.kind, lines = lines.len(), "request completed");
                ResponseRouter::route(&request, &lines, host)
            }
            TransportOutcome::TimedOut => {
                self.stats.timed_out += 1;
                warn!(%job, kind = %request.kind, "request timed out");
                ResponseRouter::notify(&request, TIMEOUT_NOTICE, host)
            }
            TransportOutcome::Errored(info) => {
                self.stats.errored += 1;
                warn!(%job, kind = %request.kind, error = info.as_str(), "request failed");
                ResponseRouter::notify(&request, ERROR_NOTICE, host)
            }
        };
        self.stats.record(report);

        self.pump()
    }

    /// Apply a transport event of either kind.
    pub fn handle<H: Host + ?Sized>(&mut self, event: TransportEvent, host: &mut H) -> Option<JobId> {
        match event {
            TransportEvent::Chunk { job, data } => {
                self.on_chunk(job, &data);
                None
            }
            TransportEvent::Finished { job, outcome } => self.on_outcome(job, outcome, host),
        }
    }

    /// Current state of the slot.
    #[must_use]
    pub fn state(&self) -> DispatchState {
        if self.slot.is_some() {
            DispatchState::Sending
        } else {
            DispatchState::Idle
        }
    }

    /// Request currently in flight, with its job identity.
    #[must_use]
    pub fn in_flight(&self) -> Option<(JobId, &PendingRequest)> {
        self.slot
            .as_ref()
            .map(|in_flight| (in_flight.job, &in_flight.request))
    }

    /// Number of requests waiting behind the slot.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Counters accumulated so far.
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// The transport jobs are submitted through.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Remove every queued request that has not been dispatched yet.
    pub fn drain_pending(&mut self) -> Vec<PendingRequest> {
        self.queue.drain()
    }
}
