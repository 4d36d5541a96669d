//! Bridge writer task.
//!
//! Serialises every [`HostAction`] to a single JSON line and writes it to the
//! host, flushing after each line so deliveries are not held back.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::host::HostAction;
use crate::{AppError, Result};

/// Encode one action as an NDJSON line, newline included.
///
/// # Errors
///
/// Returns `AppError::Bridge` if serialisation fails.
pub fn encode_action(action: &HostAction) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec(action)
        .map_err(|e| AppError::Bridge(format!("failed to serialise outbound action: {e}")))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Write actions from `actions` to `output` until cancelled or the channel
/// closes. Actions still queued at cancellation are written first.
///
/// # Errors
///
/// Returns `AppError::Bridge` if a write fails (the host went away).
pub async fn run_writer<W>(
    output: W,
    mut actions: mpsc::Receiver<HostAction>,
    cancel: CancellationToken,
) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut output = output;

    loop {
        let action = tokio::select! {
            maybe_action = actions.recv() => match maybe_action {
                Some(action) => action,
                None => {
                    debug!("bridge writer: action channel closed, stopping");
                    break;
                }
            },
            () = cancel.cancelled() => {
                debug!("bridge writer: cancellation received, flushing backlog");
                while let Ok(action) = actions.try_recv() {
                    write_action(&mut output, &action).await?;
                }
                break;
            }
        };

        write_action(&mut output, &action).await?;
    }

    Ok(())
}

async fn write_action<W>(output: &mut W, action: &HostAction) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let bytes = encode_action(action)?;
    output
        .write_all(&bytes)
        .await
        .map_err(|e| AppError::Bridge(format!("write failed: {e}")))?;
    output
        .flush()
        .await
        .map_err(|e| AppError::Bridge(format!("flush failed: {e}")))
}
