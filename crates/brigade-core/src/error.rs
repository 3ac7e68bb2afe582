use thiserror::Error;

use crate::domain::WorkerId;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// An order arrived while zero workers were on duty. Nothing was sent
    /// on any channel; the transport decides whether to retry.
    #[error("no worker available to take the order")]
    NoWorkerAvailable,

    /// The chosen worker's channel died before the relay completed.
    /// The order is not retried against a different worker.
    #[error("worker {0} became unavailable mid-relay")]
    WorkerUnavailable(WorkerId),

    /// `remove_worker` was called for an identifier that is not on duty.
    /// Removal of an unknown worker is an error, not a no-op; callers that
    /// want silent removal must check existence first.
    #[error("worker {0} is not on duty")]
    WorkerNotFound(WorkerId),

    /// Event scope missing required fields or bearing an unrecognized type.
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// The worker half of a relay exceeded the configured bound.
    /// Only raised when a relay timeout is configured; the default is to
    /// wait indefinitely.
    #[error("relay to worker {0} timed out")]
    RelayTimeout(WorkerId),

    /// The peer on a message channel hung up.
    #[error("message channel closed by peer")]
    ChannelClosed,
}
