// ABOUTME: Canonical, engine-agnostic container and pod records.
// ABOUTME: Every engine-native shape is normalized into these types.

use super::id::{ContainerId, EngineId, ImageId, PodId};
use crate::engine::EngineType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// Transport protocol of a port.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            other => Err(format!("unsupported protocol: {}", other)),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A container port and where (if anywhere) it is published on the host.
///
/// `public_port == 0` means the port is not published.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PortMapping {
    pub host_ip: String,
    pub private_port: u16,
    pub public_port: u16,
    pub protocol: Protocol,
}

impl PortMapping {
    pub fn is_published(&self) -> bool {
        self.public_port != 0
    }
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_published() {
            return write!(f, "{}/{}", self.private_port, self.protocol);
        }
        let host_ip = if self.host_ip.is_empty() {
            "0.0.0.0"
        } else {
            &self.host_ip
        };
        write!(
            f,
            "{}:{}->{}/{}",
            host_ip, self.public_port, self.private_port, self.protocol
        )
    }
}

/// Lifecycle state of a container, across Docker and Podman.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    /// Podman: container exists but its runtime spec is not yet written.
    Configured,
    /// Podman: runtime spec written, process not started.
    Initialized,
    /// Podman: stop requested, process still shutting down.
    Stopping,
    /// Podman: stopped but not yet cleaned up.
    Stopped,
}

impl ContainerState {
    /// Parse an engine state string. Returns `None` for states this crate
    /// does not know about.
    pub fn parse(value: &str) -> Option<Self> {
        let state = match value.trim().to_ascii_lowercase().as_str() {
            "created" => ContainerState::Created,
            "running" => ContainerState::Running,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "removing" => ContainerState::Removing,
            "exited" => ContainerState::Exited,
            "dead" => ContainerState::Dead,
            "configured" => ContainerState::Configured,
            "initialized" => ContainerState::Initialized,
            "stopping" => ContainerState::Stopping,
            "stopped" => ContainerState::Stopped,
            _ => return None,
        };
        Some(state)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerState::Created => "created",
            ContainerState::Running => "running",
            ContainerState::Paused => "paused",
            ContainerState::Restarting => "restarting",
            ContainerState::Removing => "removing",
            ContainerState::Exited => "exited",
            ContainerState::Dead => "dead",
            ContainerState::Configured => "configured",
            ContainerState::Initialized => "initialized",
            ContainerState::Stopping => "stopping",
            ContainerState::Stopped => "stopped",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ContainerState::Running)
    }
}

impl FromStr for ContainerState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContainerState::parse(s).ok_or_else(|| format!("unknown container state: {}", s))
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weak reference to a pod, resolved by id at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PodRef {
    pub id: PodId,
    pub name: String,
    pub status: String,
    pub engine_id: EngineId,
}

/// Canonical container record.
///
/// Records are rebuilt on every refresh and never edited in place. The
/// `engine_*` fields always come from the registered connection the record
/// was normalized against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerRecord {
    pub id: ContainerId,
    pub names: Vec<String>,
    pub image: String,
    pub image_id: ImageId,
    pub command: Option<String>,
    pub created_at: DateTime<Utc>,
    pub ports: BTreeSet<PortMapping>,
    pub labels: HashMap<String, String>,
    pub state: ContainerState,
    pub status: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod: Option<PodRef>,
    pub engine_id: EngineId,
    pub engine_name: String,
    pub engine_type: EngineType,
}

impl ContainerRecord {
    /// Primary name (first entry of `names`), or empty.
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or_default()
    }

    /// Short form of the id as shown by engine CLIs.
    pub fn short_id(&self) -> &str {
        let id = self.id.as_str();
        id.get(..12).unwrap_or(id)
    }
}
