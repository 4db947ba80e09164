// ABOUTME: Multi-engine inventory: engine registry plus containers and pods under one lock.
// ABOUTME: Refresh tickets keep evicted engines from being repopulated by in-flight refreshes.

mod filter;
mod refresh;

pub use filter::ContainerFilter;
pub use refresh::{RefreshReport, refresh_all, refresh_engine};

use crate::engine::{EngineConnection, EngineRegistry, RegistryError};
use crate::normalize::{self, NativeContainer, NativePod, NormalizeError};
use crate::translate::{
    self, ContainerCreateOptions, EngineCreatePayload, EnvFileReader, TranslateError,
};
use crate::types::{ContainerId, ContainerRecord, EngineId, PodId, PodRef};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Permission to commit a refresh for one engine.
///
/// Captures the engine's generation when the refresh began. Any eviction or
/// re-registration of the engine afterwards invalidates the ticket.
#[derive(Debug, Clone)]
pub struct RefreshTicket {
    engine: EngineConnection,
    generation: u64,
}

impl RefreshTicket {
    pub fn engine(&self) -> &EngineConnection {
        &self.engine
    }
}

/// Result of a single upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// The record's engine is not registered, or the ticket is outdated.
    Stale,
}

/// Result of committing a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed { containers: usize, pods: usize },
    Stale,
}

#[derive(Default)]
struct State {
    registry: EngineRegistry,
    containers: BTreeMap<(EngineId, ContainerId), Arc<ContainerRecord>>,
    pods: BTreeMap<(EngineId, PodId), PodRef>,
    generations: HashMap<EngineId, u64>,
    next_generation: u64,
}

impl State {
    /// Move a registered engine to a fresh generation, invalidating
    /// outstanding tickets. Unknown ids get no entry.
    fn bump(&mut self, engine_id: &EngineId) {
        if !self.registry.contains(engine_id) {
            return;
        }
        self.next_generation += 1;
        self.generations
            .insert(engine_id.clone(), self.next_generation);
    }

    fn is_current(&self, ticket: &RefreshTicket) -> bool {
        self.registry.contains(&ticket.engine.id)
            && self.generations.get(&ticket.engine.id) == Some(&ticket.generation)
    }

    fn evict(&mut self, engine_id: &EngineId) -> usize {
        let before = self.containers.len();
        self.containers.retain(|(engine, _), _| engine != engine_id);
        self.pods.retain(|(engine, _), _| engine != engine_id);
        self.bump(engine_id);
        before - self.containers.len()
    }

    fn insert(&mut self, record: ContainerRecord) -> UpsertOutcome {
        let key = (record.engine_id.clone(), record.id.clone());
        match self.containers.insert(key, Arc::new(record)) {
            Some(_) => UpsertOutcome::Updated,
            None => UpsertOutcome::Inserted,
        }
    }
}

/// Container and pod inventory across all registered engine connections.
///
/// Construct one per application (or per test) and share it behind an `Arc`.
/// Records are keyed by `(engine_id, container_id)`.
#[derive(Default)]
pub struct Inventory {
    state: Mutex<State>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Engine connections
    // -------------------------------------------------------------------------

    /// Register an engine connection. Fails with `Conflict` on a duplicate id.
    pub fn register(
        &self,
        connection: EngineConnection,
    ) -> Result<EngineConnection, RegistryError> {
        let mut state = self.state.lock();
        let connection = state.registry.register(connection)?;
        state.bump(&connection.id);
        tracing::debug!("registered engine {}", connection.id);
        Ok(connection)
    }

    /// Unregister an engine and evict everything it contributed.
    /// Unknown ids are ignored.
    pub fn unregister(&self, id: &EngineId) -> Option<EngineConnection> {
        let mut state = self.state.lock();
        let connection = state.registry.unregister(id)?;
        let evicted = state.evict(id);
        state.generations.remove(id);
        tracing::debug!("unregistered engine {}, evicted {} container(s)", id, evicted);
        Some(connection)
    }

    /// Registered connections, ordered by id.
    pub fn engines(&self) -> Vec<EngineConnection> {
        self.state.lock().registry.list()
    }

    pub fn engine(&self, id: &EngineId) -> Option<EngineConnection> {
        self.state.lock().registry.get(id).cloned()
    }

    /// Look up a connection, failing with `StaleEngine` when it is gone.
    pub fn resolve(&self, id: &EngineId) -> Result<EngineConnection, RegistryError> {
        self.state.lock().registry.resolve(id).cloned()
    }

    // -------------------------------------------------------------------------
    // Normalization and translation against registered engines
    // -------------------------------------------------------------------------

    /// Normalize a native record for a registered engine.
    pub fn normalize(
        &self,
        engine_id: &EngineId,
        native: NativeContainer,
    ) -> Result<ContainerRecord, NormalizeError> {
        let engine = self
            .engine(engine_id)
            .ok_or_else(|| NormalizeError::StaleEngine(engine_id.clone()))?;
        normalize::normalize(&engine, native)
    }

    /// Normalize a native pod for a registered engine.
    pub fn normalize_pod(
        &self,
        engine_id: &EngineId,
        native: NativePod,
    ) -> Result<PodRef, NormalizeError> {
        let engine = self
            .engine(engine_id)
            .ok_or_else(|| NormalizeError::StaleEngine(engine_id.clone()))?;
        Ok(normalize::normalize_pod(&engine, native))
    }

    /// Translate create options for a registered engine.
    pub fn translate_for<R>(
        &self,
        engine_id: &EngineId,
        options: ContainerCreateOptions,
        env_reader: &R,
    ) -> Result<(EngineConnection, EngineCreatePayload), TranslateError>
    where
        R: EnvFileReader + ?Sized,
    {
        let engine = self
            .engine(engine_id)
            .ok_or_else(|| TranslateError::StaleEngine(engine_id.clone()))?;
        let payload = translate::translate(options, env_reader)?;
        Ok((engine, payload))
    }

    // -------------------------------------------------------------------------
    // Records
    // -------------------------------------------------------------------------

    /// Insert or replace a record. Records whose engine is not registered
    /// are dropped.
    ///
    /// Only registration is checked. A record normalized before its engine
    /// was evicted or re-registered still lands; refreshes go through
    /// [`Inventory::upsert_with`] or [`Inventory::commit_refresh`] instead.
    pub fn upsert(&self, record: ContainerRecord) -> UpsertOutcome {
        let mut state = self.state.lock();
        if !state.registry.contains(&record.engine_id) {
            tracing::debug!(
                "dropping container {} for unregistered engine {}",
                record.id,
                record.engine_id
            );
            return UpsertOutcome::Stale;
        }
        state.insert(record)
    }

    /// Upsert under a refresh ticket. Dropped if the engine was evicted or
    /// re-registered since the ticket was issued.
    pub fn upsert_with(&self, ticket: &RefreshTicket, record: ContainerRecord) -> UpsertOutcome {
        let mut state = self.state.lock();
        if !state.is_current(ticket) || record.engine_id != ticket.engine.id {
            tracing::debug!(
                "dropping stale container {} for engine {}",
                record.id,
                record.engine_id
            );
            return UpsertOutcome::Stale;
        }
        state.insert(record)
    }

    /// Remove one record. Returns whether it was present.
    pub fn remove(&self, engine_id: &EngineId, id: &ContainerId) -> bool {
        self.state
            .lock()
            .containers
            .remove(&(engine_id.clone(), id.clone()))
            .is_some()
    }

    /// Remove every record and pod from an engine and invalidate its
    /// outstanding refresh tickets. Returns the number of records removed.
    pub fn evict_by_engine(&self, engine_id: &EngineId) -> usize {
        let evicted = self.state.lock().evict(engine_id);
        tracing::debug!("evicted {} container(s) from engine {}", evicted, engine_id);
        evicted
    }

    /// Records matching `filter`.
    ///
    /// The matching set is fixed when `query` is called; iteration is lazy and
    /// holds no lock.
    pub fn query(&self, filter: ContainerFilter) -> impl Iterator<Item = Arc<ContainerRecord>> {
        let snapshot: Vec<Arc<ContainerRecord>> =
            self.state.lock().containers.values().cloned().collect();
        snapshot.into_iter().filter(move |record| filter.matches(record))
    }

    /// A single record.
    pub fn get(&self, engine_id: &EngineId, id: &ContainerId) -> Option<Arc<ContainerRecord>> {
        self.state
            .lock()
            .containers
            .get(&(engine_id.clone(), id.clone()))
            .cloned()
    }

    /// Pods, optionally limited to one engine.
    pub fn pods(&self, engine_id: Option<&EngineId>) -> Vec<PodRef> {
        self.state
            .lock()
            .pods
            .values()
            .filter(|pod| engine_id.is_none_or(|id| &pod.engine_id == id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().containers.is_empty()
    }

    // -------------------------------------------------------------------------
    // Refresh
    // -------------------------------------------------------------------------

    /// Start a refresh for an engine.
    pub fn begin_refresh(&self, engine_id: &EngineId) -> Result<RefreshTicket, RegistryError> {
        let state = self.state.lock();
        let engine = state.registry.resolve(engine_id)?.clone();
        let generation = state.generations.get(engine_id).copied().unwrap_or_default();
        Ok(RefreshTicket { engine, generation })
    }

    /// Replace everything an engine contributed with a fresh listing.
    ///
    /// Nothing is written when the ticket is outdated. Records and pods that
    /// belong to another engine are skipped.
    pub fn commit_refresh(
        &self,
        ticket: &RefreshTicket,
        records: Vec<ContainerRecord>,
        pods: Vec<PodRef>,
    ) -> CommitOutcome {
        let engine_id = &ticket.engine.id;
        let mut state = self.state.lock();
        if !state.is_current(ticket) {
            tracing::debug!("discarding stale refresh for engine {}", engine_id);
            return CommitOutcome::Stale;
        }

        state.containers.retain(|(engine, _), _| engine != engine_id);
        state.pods.retain(|(engine, _), _| engine != engine_id);

        let mut committed_pods = 0;
        for pod in pods {
            if &pod.engine_id != engine_id {
                tracing::debug!("skipping pod {} from engine {}", pod.id, pod.engine_id);
                continue;
            }
            state.pods.insert((pod.engine_id.clone(), pod.id.clone()), pod);
            committed_pods += 1;
        }

        let mut committed = 0;
        for record in records {
            if &record.engine_id != engine_id {
                tracing::debug!(
                    "skipping container {} from engine {}",
                    record.id,
                    record.engine_id
                );
                continue;
            }
            state.insert(record);
            committed += 1;
        }

        CommitOutcome::Committed {
            containers: committed,
            pods: committed_pods,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineType;

    fn connection(id: &str) -> EngineConnection {
        EngineConnection {
            id: EngineId::new(id),
            name: id.to_string(),
            engine_type: EngineType::Docker,
        }
    }

    #[test]
    fn generations_track_only_registered_engines() {
        let inventory = Inventory::new();
        inventory.evict_by_engine(&EngineId::new("ghost"));
        assert!(inventory.state.lock().generations.is_empty());

        let engine = inventory.register(connection("docker.default")).unwrap();
        assert_eq!(inventory.state.lock().generations.len(), 1);

        inventory.unregister(&engine.id);
        assert!(inventory.state.lock().generations.is_empty());
    }

    #[test]
    fn reregistration_gets_a_new_generation() {
        let inventory = Inventory::new();
        let engine = inventory.register(connection("docker.default")).unwrap();
        let before = inventory.begin_refresh(&engine.id).unwrap();

        inventory.unregister(&engine.id);
        inventory.register(engine.clone()).unwrap();
        let after = inventory.begin_refresh(&engine.id).unwrap();

        assert_ne!(before.generation, after.generation);
    }
}
