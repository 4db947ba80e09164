// ABOUTME: Query filter over canonical container records.
// ABOUTME: All set criteria must match; an empty filter matches everything.

use crate::engine::EngineType;
use crate::types::{ContainerRecord, ContainerState, EngineId, PodId};
use std::collections::HashMap;

/// Filters for querying the inventory.
#[derive(Debug, Clone, Default)]
pub struct ContainerFilter {
    /// Only records from this engine connection.
    pub engine_id: Option<EngineId>,
    /// Only records from engines of this type.
    pub engine_type: Option<EngineType>,
    /// Only records in this state.
    pub state: Option<ContainerState>,
    /// Only members of this pod.
    pub pod_id: Option<PodId>,
    /// Substring of any container name.
    pub name: Option<String>,
    /// Labels that must be present with these values.
    pub labels: HashMap<String, String>,
}

impl ContainerFilter {
    /// A filter that matches every record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn engine(mut self, id: EngineId) -> Self {
        self.engine_id = Some(id);
        self
    }

    pub fn engine_type(mut self, engine_type: EngineType) -> Self {
        self.engine_type = Some(engine_type);
        self
    }

    pub fn state(mut self, state: ContainerState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn pod(mut self, id: PodId) -> Self {
        self.pod_id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn matches(&self, record: &ContainerRecord) -> bool {
        if let Some(ref id) = self.engine_id
            && &record.engine_id != id
        {
            return false;
        }

        if let Some(engine_type) = self.engine_type
            && record.engine_type != engine_type
        {
            return false;
        }

        if let Some(state) = self.state
            && record.state != state
        {
            return false;
        }

        if let Some(ref pod_id) = self.pod_id
            && record.pod.as_ref().map(|p| &p.id) != Some(pod_id)
        {
            return false;
        }

        if let Some(ref name) = self.name
            && !record.names.iter().any(|n| n.contains(name.as_str()))
        {
            return false;
        }

        self.labels
            .iter()
            .all(|(key, value)| record.labels.get(key) == Some(value))
    }
}
