//! ShiftBuilder - wiring for one operating period.
//!
//! The registry is an explicitly constructed instance scoped to a shift,
//! not ambient process state: build at start of day, drop at close. No
//! state survives into the next shift.

use std::sync::Arc;
use std::time::Duration;

use crate::config::DispatchConfig;
use crate::handler::DispatchHandler;
use crate::registry::CapabilityRegistry;

pub struct ShiftBuilder {
    config: DispatchConfig,
}

impl ShiftBuilder {
    pub fn new() -> Self {
        Self {
            config: DispatchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Bound the worker half of each order relay. Without this, the
    /// baseline behavior applies (wait indefinitely).
    ///
    /// Bounds beyond `u64::MAX` milliseconds saturate rather than wrap.
    pub fn relay_timeout(mut self, limit: Duration) -> Self {
        self.config.relay_timeout_ms =
            Some(u64::try_from(limit.as_millis()).unwrap_or(u64::MAX));
        self
    }

    #[cfg(test)]
    fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn build(self) -> Shift {
        let registry = Arc::new(CapabilityRegistry::new());
        let handler = Arc::new(DispatchHandler::new(Arc::clone(&registry), self.config));
        Shift { registry, handler }
    }
}

impl Default for ShiftBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One operating period: a fresh registry plus the handler bound to it.
/// Dropping the shift tears both down.
pub struct Shift {
    registry: Arc<CapabilityRegistry>,
    handler: Arc<DispatchHandler>,
}

impl Shift {
    pub fn handler(&self) -> Arc<DispatchHandler> {
        Arc::clone(&self.handler)
    }

    pub fn registry(&self) -> Arc<CapabilityRegistry> {
        Arc::clone(&self.registry)
    }
}
