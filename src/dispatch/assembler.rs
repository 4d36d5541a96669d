//! Response body accumulation.

use bytes::BytesMut;
use tracing::warn;

/// Largest response body kept for a single request: 1 MiB.
///
/// Bytes past this limit are discarded; whatever was assembled up to the
/// limit is still split and routed.
pub const MAX_RESPONSE_BYTES: usize = 1_048_576;

/// Buffers the body of the in-flight request until the transport completes.
#[derive(Debug, Default)]
pub struct ResponseAssembler {
    buffer: BytesMut,
    discarded: usize,
}

impl ResponseAssembler {
    /// Empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a body fragment.
    pub fn push(&mut self, chunk: &[u8]) {
        let room = MAX_RESPONSE_BYTES.saturating_sub(self.buffer.len());
        let take = chunk.len().min(room);
        self.buffer.extend_from_slice(&chunk[..take]);

        if take < chunk.len() {
            if self.discarded == 0 {
                warn!(
                    limit = MAX_RESPONSE_BYTES,
                    "response body exceeds limit, discarding remainder"
                );
            }
            self.discarded += chunk.len() - take;
        }
    }

    /// Bytes buffered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing has been buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes dropped because of [`MAX_RESPONSE_BYTES`].
    #[must_use]
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Consume the buffer and split it into response lines.
    #[must_use]
    pub fn finish(self) -> Vec<String> {
        split_lines(&self.buffer)
    }
}

/// Split a body on `\n`, dropping empty lines and a trailing `\r` per line.
#[must_use]
pub fn split_lines(body: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(body)
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}
