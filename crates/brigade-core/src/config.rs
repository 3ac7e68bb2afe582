use std::time::Duration;

use serde::Deserialize;

/// Dispatch configuration.
///
/// The default preserves the baseline behavior: no relay timeout, a worker
/// that never answers blocks that order's task indefinitely.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DispatchConfig {
    /// Bound on the worker half of an order relay (send + receive),
    /// in milliseconds. `None` waits indefinitely.
    #[serde(default)]
    pub relay_timeout_ms: Option<u64>,
}

impl DispatchConfig {
    pub fn relay_timeout(&self) -> Option<Duration> {
        self.relay_timeout_ms.map(Duration::from_millis)
    }
}
