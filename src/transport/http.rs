//! HTTP transport backed by `reqwest`.
//!
//! Every submitted job runs on its own tokio task. The task streams the
//! response body back as [`TransportEvent::Chunk`]s and finishes with exactly
//! one [`TransportEvent::Finished`], whatever happens.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use tokio::sync::mpsc;
use tracing::{debug, info_span, warn, Instrument};

use crate::dispatch::Transport;
use crate::models::outcome::{JobId, TransportEvent, TransportOutcome};
use crate::{AppError, Result};

/// Content type of every request body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const CLIENT_USER_AGENT: &str = concat!("playerdb-relay/", env!("CARGO_PKG_VERSION"));

/// Posts request payloads to a single endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    events: mpsc::Sender<TransportEvent>,
}

impl HttpTransport {
    /// Build a transport for `url` whose jobs time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` if the HTTP client cannot be created.
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Transport(format!("failed to create http client: {err}")))?;

        Ok(Self {
            client,
            url: url.into(),
            events,
        })
    }
}

impl Transport for HttpTransport {
    fn submit(&mut self, job: JobId, payload: String) {
        let client = self.client.clone();
        let url = self.url.clone();
        let events = self.events.clone();

        tokio::spawn(
            async move {
                let outcome = match post(&client, &url, job, payload, &events).await {
                    Ok(()) => TransportOutcome::Completed(Bytes::new()),
                    Err(outcome) => outcome,
                };
                debug!(outcome = outcome.label(), "job finished");

                if events
                    .send(TransportEvent::Finished { job, outcome })
                    .await
                    .is_err()
                {
                    warn!("dispatcher gone before job outcome could be delivered");
                }
            }
            .instrument(info_span!("http_job", %job)),
        );
    }
}

/// Run one POST, forwarding body chunks as they arrive.
///
/// `Err` carries the terminal outcome for anything but a clean completion.
async fn post(
    client: &reqwest::Client,
    url: &str,
    job: JobId,
    payload: String,
    events: &mpsc::Sender<TransportEvent>,
) -> std::result::Result<(), TransportOutcome> {
    let mut response = client
        .post(url)
        .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
        .header(USER_AGENT, CLIENT_USER_AGENT)
        .body(payload)
        .send()
        .await
        .map_err(failure_outcome)?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransportOutcome::Errored(format!("HTTP {status}")));
    }

    while let Some(data) = response.chunk().await.map_err(failure_outcome)? {
        if events.send(TransportEvent::Chunk { job, data }).await.is_err() {
            return Err(TransportOutcome::Errored("dispatcher gone".into()));
        }
    }

    Ok(())
}

fn failure_outcome(err: reqwest::Error) -> TransportOutcome {
    if err.is_timeout() {
        TransportOutcome::TimedOut
    } else {
        TransportOutcome::Errored(err.to_string())
    }
}
