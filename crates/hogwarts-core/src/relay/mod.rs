//! Routing, dispatch and streaming of chat turns to the inference service.

pub mod aggregate;
pub mod dispatcher;
pub mod envelope;
pub mod router;
pub mod service;
pub mod stream;

pub use aggregate::aggregate_events;
pub use dispatcher::{ByteStream, UpstreamDispatcher};
pub use envelope::UpstreamEnvelope;
pub use router::{AgentRouter, RoutedRequest};
pub use service::{ChatPhase, ChatRelayService};
pub use stream::{relay_pass_through, ChannelSink, ChunkSink, RelayOptions, RelayOutcome, SinkClosed};
