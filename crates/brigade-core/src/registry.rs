//! CapabilityRegistry - authoritative record of on-duty workers.
//!
//! Single source of truth for "is this worker currently reachable". The
//! active-worker map and the capability index live behind one lock and
//! mutate together, so no event ever observes them out of step.

use std::collections::HashMap;

use rand::seq::IteratorRandom;
use tokio::sync::Mutex;

use crate::domain::{Capability, WorkerId};
use crate::error::DispatchError;
use crate::observability::RegistryCounts;
use crate::ports::WorkerHandle;

/// Registry state.
///
/// Invariant: every id appearing in any `index` sequence is a key of
/// `active`. Both maps are only ever touched under the registry lock,
/// within a single operation.
struct RegistryState {
    /// On-duty workers and their message channels.
    active: HashMap<WorkerId, WorkerHandle>,

    /// Capability -> worker ids offering it, in registration order
    /// (earliest-registered first).
    index: HashMap<Capability, Vec<WorkerId>>,
}

impl RegistryState {
    fn new() -> Self {
        Self {
            active: HashMap::new(),
            index: HashMap::new(),
        }
    }

    /// Drop `id` from every capability sequence, pruning emptied ones.
    fn unindex(&mut self, id: &WorkerId) {
        self.index.retain(|_, ids| {
            ids.retain(|other| other != id);
            !ids.is_empty()
        });
    }
}

/// Tracks which workers are on duty and which capabilities each offers.
///
/// Built once per operating period and shared across concurrent handler
/// invocations; every operation takes the lock for its whole duration.
pub struct CapabilityRegistry {
    state: Mutex<RegistryState>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::new()),
        }
    }

    /// Register `id` as on duty with the given channel, indexed under every
    /// capability in `capabilities`.
    ///
    /// Re-registering an active id overwrites its handle and replaces its
    /// capability entries (old entries are removed first), so an id never
    /// appears twice in any sequence. An empty capability set is legal;
    /// such a worker is only reachable through the random fallback.
    pub async fn add_worker(
        &self,
        id: WorkerId,
        handle: WorkerHandle,
        capabilities: Vec<Capability>,
    ) {
        let mut state = self.state.lock().await;
        if state.active.contains_key(&id) {
            tracing::debug!(worker = %id, "re-registering active worker, replacing handle");
            state.unindex(&id);
        }
        for capability in &capabilities {
            state
                .index
                .entry(capability.clone())
                .or_default()
                .push(id.clone());
        }
        state.active.insert(id, handle);
    }

    /// Take `id` off duty, removing it from the active map and from every
    /// capability sequence it was indexed under.
    ///
    /// Removing an unknown id is an error (`WorkerNotFound`), applied
    /// uniformly; callers wanting silent removal must check first.
    pub async fn remove_worker(&self, id: &WorkerId) -> Result<(), DispatchError> {
        let mut state = self.state.lock().await;
        if state.active.remove(id).is_none() {
            return Err(DispatchError::WorkerNotFound(id.clone()));
        }
        state.unindex(id);
        Ok(())
    }

    /// First (earliest-registered) worker offering `capability`.
    ///
    /// This is a read, not a queue pop: repeated lookups return the same
    /// worker as long as no removal occurs.
    pub async fn pick_for_capability(&self, capability: &Capability) -> Option<WorkerId> {
        let state = self.state.lock().await;
        state
            .index
            .get(capability)
            .and_then(|ids| ids.first())
            .cloned()
    }

    /// An active worker chosen uniformly at random, or `None` if nobody is
    /// on duty.
    pub async fn pick_any(&self) -> Option<WorkerId> {
        let state = self.state.lock().await;
        state.active.keys().choose(&mut rand::thread_rng()).cloned()
    }

    /// Resolve an id to its current message channel.
    pub async fn handle_of(&self, id: &WorkerId) -> Option<WorkerHandle> {
        let state = self.state.lock().await;
        state.active.get(id).cloned()
    }

    /// Observability hook.
    pub async fn counts(&self) -> RegistryCounts {
        let state = self.state.lock().await;
        RegistryCounts {
            active_workers: state.active.len(),
            capabilities: state.index.len(),
        }
    }

    /// Check the consistency invariant (for tests): every indexed id is
    /// also active.
    #[cfg(test)]
    pub async fn index_is_consistent(&self) -> bool {
        let state = self.state.lock().await;
        state
            .index
            .values()
            .flatten()
            .all(|id| state.active.contains_key(id))
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{Connection, Payload};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Registry tests never exchange messages; the handle is inert.
    struct NullConnection;

    #[async_trait]
    impl Connection for NullConnection {
        async fn receive(&self) -> Result<Payload, DispatchError> {
            Err(DispatchError::ChannelClosed)
        }

        async fn send(&self, _payload: Payload) -> Result<(), DispatchError> {
            Err(DispatchError::ChannelClosed)
        }
    }

    fn handle() -> WorkerHandle {
        Arc::new(NullConnection)
    }

    fn caps(names: &[&str]) -> Vec<Capability> {
        names.iter().copied().map(Capability::new).collect()
    }

    #[tokio::test]
    async fn pick_for_capability_returns_earliest_registered() {
        let registry = CapabilityRegistry::new();
        registry
            .add_worker(WorkerId::new("w1"), handle(), caps(&["grill"]))
            .await;
        registry
            .add_worker(WorkerId::new("w2"), handle(), caps(&["grill"]))
            .await;

        // First-registered wins, and the lookup is non-destructive.
        for _ in 0..3 {
            let picked = registry
                .pick_for_capability(&Capability::new("grill"))
                .await;
            assert_eq!(picked, Some(WorkerId::new("w1")));
        }
    }

    #[tokio::test]
    async fn pick_for_unknown_capability_returns_none() {
        let registry = CapabilityRegistry::new();
        registry
            .add_worker(WorkerId::new("w1"), handle(), caps(&["grill"]))
            .await;

        let picked = registry
            .pick_for_capability(&Capability::new("sushi"))
            .await;
        assert_eq!(picked, None);
    }

    #[tokio::test]
    async fn remove_purges_every_capability_sequence() {
        let registry = CapabilityRegistry::new();
        registry
            .add_worker(WorkerId::new("w1"), handle(), caps(&["grill", "fry"]))
            .await;
        registry
            .add_worker(WorkerId::new("w2"), handle(), caps(&["grill"]))
            .await;

        registry.remove_worker(&WorkerId::new("w1")).await.unwrap();

        assert_eq!(
            registry.pick_for_capability(&Capability::new("grill")).await,
            Some(WorkerId::new("w2"))
        );
        assert_eq!(
            registry.pick_for_capability(&Capability::new("fry")).await,
            None
        );
        assert!(registry.index_is_consistent().await);
    }

    #[tokio::test]
    async fn remove_unknown_worker_is_an_error() {
        let registry = CapabilityRegistry::new();
        let err = registry
            .remove_worker(&WorkerId::new("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::WorkerNotFound(_)));
    }

    #[tokio::test]
    async fn re_registration_deduplicates_index_entries() {
        let registry = CapabilityRegistry::new();
        registry
            .add_worker(WorkerId::new("w1"), handle(), caps(&["grill", "fry"]))
            .await;
        registry
            .add_worker(WorkerId::new("w1"), handle(), caps(&["grill"]))
            .await;

        // One removal must fully clear the worker from the index.
        registry.remove_worker(&WorkerId::new("w1")).await.unwrap();
        assert_eq!(
            registry.pick_for_capability(&Capability::new("grill")).await,
            None
        );
        assert_eq!(
            registry.pick_for_capability(&Capability::new("fry")).await,
            None
        );
        let counts = registry.counts().await;
        assert_eq!(counts.active_workers, 0);
        assert_eq!(counts.capabilities, 0);
    }

    #[tokio::test]
    async fn pick_any_covers_all_active_workers() {
        let registry = CapabilityRegistry::new();
        assert_eq!(registry.pick_any().await, None);

        registry
            .add_worker(WorkerId::new("w1"), handle(), caps(&[]))
            .await;
        registry
            .add_worker(WorkerId::new("w2"), handle(), caps(&["fry"]))
            .await;

        // Random choice, but always one of the active ids.
        for _ in 0..20 {
            let picked = registry.pick_any().await.unwrap();
            assert!(picked == WorkerId::new("w1") || picked == WorkerId::new("w2"));
        }
    }

    #[tokio::test]
    async fn handle_of_resolves_only_active_workers() {
        let registry = CapabilityRegistry::new();
        registry
            .add_worker(WorkerId::new("w1"), handle(), caps(&["grill"]))
            .await;

        assert!(registry.handle_of(&WorkerId::new("w1")).await.is_some());
        registry.remove_worker(&WorkerId::new("w1")).await.unwrap();
        assert!(registry.handle_of(&WorkerId::new("w1")).await.is_none());
    }

    #[tokio::test]
    async fn index_stays_consistent_across_duty_sequences() {
        let registry = CapabilityRegistry::new();
        for round in 0..5 {
            let id = WorkerId::new(format!("w{round}"));
            registry
                .add_worker(id.clone(), handle(), caps(&["grill", "fry", "sushi"]))
                .await;
            assert!(registry.index_is_consistent().await);
            if round % 2 == 0 {
                registry.remove_worker(&id).await.unwrap();
                assert!(registry.index_is_consistent().await);
            }
        }
    }
}
