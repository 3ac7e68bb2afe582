//! DispatchHandler - one invocation per incoming event.
//!
//! Duty events mutate the registry synchronously; order events pick a
//! worker (first qualified, else an arbitrary active one) and run the
//! two-hop relay: requester -> worker -> requester.
//!
//! Concurrency model: `handle` takes `&self` and may be invoked from many
//! tasks at once over the shared registry. A relay suspended on a slow
//! worker does not block duty changes or other orders; only the registry's
//! own lock serializes state access, one operation at a time.

use std::future::Future;
use std::sync::Arc;

use crate::config::DispatchConfig;
use crate::domain::{Capability, Event, EventKind, WorkerId};
use crate::error::DispatchError;
use crate::ports::Connection;
use crate::registry::CapabilityRegistry;

pub struct DispatchHandler {
    registry: Arc<CapabilityRegistry>,
    config: DispatchConfig,
}

impl DispatchHandler {
    pub fn new(registry: Arc<CapabilityRegistry>, config: DispatchConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Handle one event. Errors propagate to the transport for this event
    /// only; registry state stays consistent for subsequent events.
    pub async fn handle(&self, event: Event) -> Result<(), DispatchError> {
        match EventKind::classify(&event.scope)? {
            EventKind::DutyStart { id, capabilities } => {
                tracing::info!(worker = %id, ?capabilities, "worker on duty");
                self.registry.add_worker(id, event.conn, capabilities).await;
                Ok(())
            }
            EventKind::DutyEnd { id } => {
                tracing::info!(worker = %id, "worker off duty");
                self.registry.remove_worker(&id).await
            }
            EventKind::Order { capability } => {
                self.relay_order(&capability, event.conn).await
            }
        }
    }

    /// Two-tier selection, then the strict sequential relay (each hop is
    /// awaited to completion before the next begins, no fan-out).
    async fn relay_order(
        &self,
        capability: &Capability,
        requester: Arc<dyn Connection>,
    ) -> Result<(), DispatchError> {
        let chosen = match self.registry.pick_for_capability(capability).await {
            Some(id) => id,
            None => {
                // No qualified worker (or unknown capability): any active
                // worker takes the order.
                let id = self
                    .registry
                    .pick_any()
                    .await
                    .ok_or(DispatchError::NoWorkerAvailable)?;
                tracing::debug!(%capability, worker = %id, "no qualified worker, falling back");
                id
            }
        };

        // The worker may go off duty between selection and resolution.
        let worker = self
            .registry
            .handle_of(&chosen)
            .await
            .ok_or_else(|| DispatchError::WorkerUnavailable(chosen.clone()))?;

        tracing::debug!(%capability, worker = %chosen, "relaying order");

        let full_order = requester.receive().await?;
        self.worker_exchange(&chosen, worker.send(full_order)).await?;
        let result = self.worker_exchange(&chosen, worker.receive()).await?;
        requester.send(result).await
    }

    /// Run one worker-side hop of the relay. A dead channel becomes
    /// `WorkerUnavailable`; an exceeded bound (when configured) becomes
    /// `RelayTimeout`. Requester-side hops are not bounded.
    async fn worker_exchange<T, F>(&self, id: &WorkerId, hop: F) -> Result<T, DispatchError>
    where
        F: Future<Output = Result<T, DispatchError>>,
    {
        let result = match self.config.relay_timeout() {
            Some(limit) => tokio::time::timeout(limit, hop)
                .await
                .map_err(|_| DispatchError::RelayTimeout(id.clone()))?,
            None => hop.await,
        };
        result.map_err(|_| {
            tracing::warn!(worker = %id, "worker channel died mid-relay");
            DispatchError::WorkerUnavailable(id.clone())
        })
    }
}
