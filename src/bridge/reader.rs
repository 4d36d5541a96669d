//! Bridge reader task.
//!
//! Reads NDJSON lines from the host, parses each into a [`HostEvent`] and
//! forwards it to the dispatch service inbox. Bad lines are logged and
//! skipped; they never stop the reader.

use futures_util::StreamExt;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::bridge::codec::BridgeCodec;
use crate::host::HostEvent;
use crate::{AppError, Result};

/// Why the reader stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderExit {
    /// The host closed its end of the stream.
    Eof,
    /// The cancellation token fired.
    Cancelled,
    /// The service inbox was closed.
    InboxClosed,
    /// The underlying stream failed.
    StreamError,
}

/// Parse one inbound line.
///
/// Returns `Ok(None)` for blank lines.
///
/// # Errors
///
/// Returns `AppError::Bridge` if the line is not a known event object.
pub fn parse_inbound_line(line: &str) -> Result<Option<HostEvent>> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| AppError::Bridge(format!("malformed event: {e}")))
}

/// Read events from `input` until EOF, cancellation, or a closed inbox.
pub async fn run_reader<R>(
    input: R,
    inbox: mpsc::Sender<HostEvent>,
    cancel: CancellationToken,
) -> ReaderExit
where
    R: AsyncRead + Unpin + Send,
{
    let mut framed = FramedRead::new(input, BridgeCodec::new());
    // FramedRead yields a single `None` after a decode error before resuming.
    let mut resuming = false;

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                debug!("bridge reader: cancellation received, stopping");
                return ReaderExit::Cancelled;
            }

            item = framed.next() => {
                match item {
                    None if resuming => resuming = false,

                    None => {
                        debug!("bridge reader: EOF detected");
                        return ReaderExit::Eof;
                    }

                    Some(Err(AppError::Bridge(ref msg))) => {
                        warn!(error = msg.as_str(), "bridge reader: framing error, skipping");
                        resuming = true;
                    }

                    Some(Err(e)) => {
                        warn!(error = %e, "bridge reader: IO error, stopping");
                        return ReaderExit::StreamError;
                    }

                    Some(Ok(line)) => match parse_inbound_line(&line) {
                        Ok(Some(event)) => {
                            if inbox.send(event).await.is_err() {
                                debug!("bridge reader: inbox closed, stopping");
                                return ReaderExit::InboxClosed;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            warn!(error = %e, raw_line = %line, "bridge reader: parse error, skipping line");
                        }
                    },
                }
            }
        }
    }
}
