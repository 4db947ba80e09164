// ABOUTME: Engine type definitions for Docker and Podman.
// ABOUTME: Includes EngineType, EngineConnection, and EngineEndpoint.

use crate::types::EngineId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The container engine type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineType {
    Docker,
    Podman,
}

impl EngineType {
    /// Human-readable product name.
    pub fn display_name(&self) -> &'static str {
        match self {
            EngineType::Docker => "Docker",
            EngineType::Podman => "Podman",
        }
    }
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineType::Docker => write!(f, "docker"),
            EngineType::Podman => write!(f, "podman"),
        }
    }
}

impl FromStr for EngineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "docker" => Ok(EngineType::Docker),
            "podman" => Ok(EngineType::Podman),
            other => Err(format!("unknown engine type: {}", other)),
        }
    }
}

/// An established connection to an engine daemon, as tracked by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EngineConnection {
    pub id: EngineId,
    pub name: String,
    #[serde(rename = "type")]
    pub engine_type: EngineType,
}

impl EngineConnection {
    pub fn new(id: impl Into<String>, name: impl Into<String>, engine_type: EngineType) -> Self {
        Self {
            id: EngineId::new(id),
            name: name.into(),
            engine_type,
        }
    }
}

/// Where an engine daemon listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEndpoint {
    /// The type of engine behind the socket.
    pub engine_type: EngineType,
    /// Path to the engine socket.
    pub socket_path: String,
    /// Short qualifier such as `rootless`, `rootful` or `default`.
    pub label: String,
}

impl EngineEndpoint {
    /// Connection identity derived from the endpoint, e.g. `podman.rootless`.
    pub fn connection(&self) -> EngineConnection {
        EngineConnection::new(
            format!("{}.{}", self.engine_type, self.label),
            format!("{} ({})", self.engine_type.display_name(), self.label),
            self.engine_type,
        )
    }
}
