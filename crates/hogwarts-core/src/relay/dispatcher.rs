//! UpstreamDispatcher trait definition.
//!
//! The concrete HTTP implementation lives in hogwarts-infra. Tests in this
//! crate substitute in-memory fakes.

use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;
use tokio_util::sync::CancellationToken;

use hogwarts_types::error::RelayError;
use hogwarts_types::relay::UpstreamTarget;

use super::envelope::UpstreamEnvelope;

/// A live, incrementally readable upstream body.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, RelayError>> + Send + 'static>>;

/// Issues exactly one outbound request per call. Implementations must not retry:
/// inference calls are not idempotent.
pub trait UpstreamDispatcher: Send + Sync {
    /// Send the envelope to `target` and return the response body once the
    /// headers arrived with a success status.
    ///
    /// Cancelling `cancel` before headers arrive aborts the request with
    /// [`RelayError::ClientDisconnected`]. Dropping the returned stream aborts
    /// the transfer.
    fn dispatch(
        &self,
        target: UpstreamTarget,
        envelope: &UpstreamEnvelope,
        cancel: &CancellationToken,
    ) -> impl std::future::Future<Output = Result<ByteStream, RelayError>> + Send;
}
