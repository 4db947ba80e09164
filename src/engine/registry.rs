// ABOUTME: Registry of live engine connections keyed by engine id.
// ABOUTME: Rejects duplicate ids; unregistering an unknown id is a no-op.

use super::types::EngineConnection;
use crate::types::EngineId;
use std::collections::HashMap;

/// Errors from registry lookups and mutations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("engine already registered: {0}")]
    Conflict(EngineId),

    #[error("engine not registered: {0}")]
    StaleEngine(EngineId),
}

/// Tracks the engine connections that are currently established.
///
/// The registry itself holds no lock. `Inventory` owns one behind the same
/// mutex as the container records so that unregistering and evicting happen
/// in one critical section.
#[derive(Debug, Default)]
pub struct EngineRegistry {
    engines: HashMap<EngineId, EngineConnection>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection. Fails with `Conflict` if the id is taken.
    pub fn register(
        &mut self,
        connection: EngineConnection,
    ) -> Result<EngineConnection, RegistryError> {
        use std::collections::hash_map::Entry;

        match self.engines.entry(connection.id.clone()) {
            Entry::Occupied(_) => Err(RegistryError::Conflict(connection.id)),
            Entry::Vacant(slot) => Ok(slot.insert(connection).clone()),
        }
    }

    /// Remove a connection, returning it if it was registered.
    pub fn unregister(&mut self, id: &EngineId) -> Option<EngineConnection> {
        self.engines.remove(id)
    }

    pub fn get(&self, id: &EngineId) -> Option<&EngineConnection> {
        self.engines.get(id)
    }

    /// Like `get`, but an unknown id is a `StaleEngine` error.
    pub fn resolve(&self, id: &EngineId) -> Result<&EngineConnection, RegistryError> {
        self.engines
            .get(id)
            .ok_or_else(|| RegistryError::StaleEngine(id.clone()))
    }

    pub fn contains(&self, id: &EngineId) -> bool {
        self.engines.contains_key(id)
    }

    /// All registered connections, ordered by id.
    pub fn list(&self) -> Vec<EngineConnection> {
        let mut engines: Vec<EngineConnection> = self.engines.values().cloned().collect();
        engines.sort_by(|a, b| a.id.cmp(&b.id));
        engines
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
