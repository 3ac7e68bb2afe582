//! Connection port - the two message-exchange primitives the transport
//! hands to the handler alongside each event.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DispatchError;

/// Message payload. The core never inspects it; it is relayed verbatim.
pub type Payload = serde_json::Value;

/// A bidirectional message channel to one peer (a requester or a worker).
///
/// Design intent:
/// - The transport owns framing and delivery; the core only sequences calls.
/// - Both operations suspend: `receive` until a message is available,
///   `send` until the payload has been handed to the peer's transport.
/// - A closed channel surfaces as `ChannelClosed`, never as a hang.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn receive(&self) -> Result<Payload, DispatchError>;

    async fn send(&self, payload: Payload) -> Result<(), DispatchError>;
}

/// Shared handle to a worker's channel, owned by the registry while the
/// worker is on duty.
pub type WorkerHandle = Arc<dyn Connection>;
