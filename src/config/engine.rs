// ABOUTME: Engine entries in dockhand.yml.
// ABOUTME: Parses short forms like "docker", "podman:/run/podman/podman.sock".

use crate::engine::{EngineConnection, EngineEndpoint, EngineType, default_socket_path};
use crate::types::EngineId;
use serde::Deserialize;

/// One configured engine connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Connection id. Defaults to `{type}.{label}` of the endpoint.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name. Defaults to `"{Docker|Podman} (config)"`.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub engine_type: EngineType,
    /// Socket path. Defaults to the engine's standard socket.
    #[serde(default)]
    pub socket: Option<String>,
}

/// A configured or detected engine, ready to connect and register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEngine {
    pub connection: EngineConnection,
    pub endpoint: EngineEndpoint,
}

impl EngineConfig {
    /// Parse the short form `type[:socket]`.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("engine entry cannot be empty".to_string());
        }

        let (type_part, socket) = match s.split_once(':') {
            Some((t, path)) if path.is_empty() => {
                return Err(format!("empty socket path for engine '{}'", t));
            }
            Some((t, path)) => (t, Some(path.to_string())),
            None => (s, None),
        };

        Ok(EngineConfig {
            id: None,
            name: None,
            engine_type: type_part.parse()?,
            socket,
        })
    }

    pub fn endpoint(&self) -> EngineEndpoint {
        EngineEndpoint {
            engine_type: self.engine_type,
            socket_path: self
                .socket
                .clone()
                .unwrap_or_else(|| default_socket_path(self.engine_type)),
            label: "config".to_string(),
        }
    }

    pub fn connection(&self) -> EngineConnection {
        let derived = self.endpoint().connection();
        EngineConnection {
            id: self.id.clone().map(EngineId::new).unwrap_or(derived.id),
            name: self.name.clone().unwrap_or(derived.name),
            engine_type: self.engine_type,
        }
    }

    pub fn resolve(&self) -> ResolvedEngine {
        ResolvedEngine {
            connection: self.connection(),
            endpoint: self.endpoint(),
        }
    }
}

impl From<EngineEndpoint> for ResolvedEngine {
    fn from(endpoint: EngineEndpoint) -> Self {
        Self {
            connection: endpoint.connection(),
            endpoint,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum EngineEntry {
    Simple(String),
    Detailed(EngineConfig),
}

impl EngineEntry {
    pub(super) fn into_engine_config(self) -> Result<EngineConfig, String> {
        match self {
            EngineEntry::Simple(s) => EngineConfig::parse(&s),
            EngineEntry::Detailed(c) => Ok(c),
        }
    }
}
