//! Pass-through relay of an upstream body to the client.
//!
//! Bytes are forwarded chunk by chunk, in order, without parsing or
//! re-framing. Every write is followed by a flush so the client sees each
//! chunk as soon as it leaves the upstream.

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use hogwarts_types::error::RelayError;
use hogwarts_types::relay::UpstreamEvent;

use super::dispatcher::ByteStream;

/// The client side of the connection went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("client sink closed")]
pub struct SinkClosed;

/// Destination of relayed bytes.
pub trait ChunkSink: Send {
    /// Queue a chunk for delivery.
    fn write(
        &mut self,
        chunk: Bytes,
    ) -> impl std::future::Future<Output = Result<(), SinkClosed>> + Send;

    /// Push everything queued so far to the client.
    fn flush(&mut self) -> impl std::future::Future<Output = Result<(), SinkClosed>> + Send;
}

/// Sink backed by a bounded channel that feeds the HTTP response body.
///
/// The bound gives back-pressure: a slow client stalls the upstream read
/// instead of growing a buffer.
pub struct ChannelSink {
    tx: mpsc::Sender<Bytes>,
    pending: Option<Bytes>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Bytes>) -> Self {
        Self { tx, pending: None }
    }
}

impl ChunkSink for ChannelSink {
    async fn write(&mut self, chunk: Bytes) -> Result<(), SinkClosed> {
        if let Some(previous) = self.pending.take() {
            self.tx.send(previous).await.map_err(|_| SinkClosed)?;
        }
        self.pending = Some(chunk);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkClosed> {
        match self.pending.take() {
            Some(chunk) => self.tx.send(chunk).await.map_err(|_| SinkClosed),
            None if self.tx.is_closed() => Err(SinkClosed),
            None => Ok(()),
        }
    }
}

/// Relay behaviour knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelayOptions {
    /// Append an `error` record after a mid-stream upstream failure.
    pub emit_error_marker: bool,
}

/// How a relay ended.
#[derive(Debug)]
pub enum RelayOutcome {
    /// Upstream reached end of stream and every chunk was delivered.
    Completed { bytes: u64, chunks: u64 },
    /// The client went away; the upstream read was abandoned.
    ClientDisconnected { bytes: u64 },
    /// Upstream failed after the response had started.
    UpstreamFailed { bytes: u64, error: RelayError },
}

impl RelayOutcome {
    pub fn bytes(&self) -> u64 {
        match self {
            RelayOutcome::Completed { bytes, .. }
            | RelayOutcome::ClientDisconnected { bytes }
            | RelayOutcome::UpstreamFailed { bytes, .. } => *bytes,
        }
    }
}

/// Text of the optional interruption marker.
pub const INTERRUPTED_MESSAGE: &str = "upstream stream interrupted";

/// Copy `source` into `sink` until end of stream, upstream failure, or
/// cancellation.
///
/// A failed write means the client is gone: `cancel` is triggered so the
/// upstream request is torn down too. The source is dropped on every exit
/// path, which closes the upstream connection.
pub async fn relay_pass_through<S: ChunkSink>(
    mut source: ByteStream,
    sink: &mut S,
    cancel: &CancellationToken,
    options: RelayOptions,
) -> RelayOutcome {
    let mut bytes = 0u64;
    let mut chunks = 0u64;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return RelayOutcome::ClientDisconnected { bytes },
            next = source.next() => next,
        };

        let chunk = match next {
            None => return RelayOutcome::Completed { bytes, chunks },
            Some(Err(error)) => {
                tracing::warn!(bytes, error = %error, "upstream stream failed mid-relay");
                if options.emit_error_marker {
                    let marker = format!("\n\n{}", UpstreamEvent::error(INTERRUPTED_MESSAGE).to_data_line());
                    if deliver(sink, Bytes::from(marker), cancel).await.is_err() {
                        return RelayOutcome::ClientDisconnected { bytes };
                    }
                }
                return RelayOutcome::UpstreamFailed { bytes, error };
            }
            Some(Ok(chunk)) if chunk.is_empty() => continue,
            Some(Ok(chunk)) => chunk,
        };

        let len = chunk.len() as u64;
        if deliver(sink, chunk, cancel).await.is_err() {
            cancel.cancel();
            tracing::debug!(bytes, "client went away during relay");
            return RelayOutcome::ClientDisconnected { bytes };
        }
        bytes += len;
        chunks += 1;
    }
}

async fn deliver<S: ChunkSink>(
    sink: &mut S,
    chunk: Bytes,
    cancel: &CancellationToken,
) -> Result<(), SinkClosed> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SinkClosed),
        result = async {
            sink.write(chunk).await?;
            sink.flush().await
        } => result,
    }
}
