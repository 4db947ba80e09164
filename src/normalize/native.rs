// ABOUTME: Engine-native container and pod shapes as returned by engine APIs.
// ABOUTME: Docker's list shape and Podman's libpod list shape, deserialized as-is.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// A creation/start timestamp as engines report it.
///
/// Docker uses Unix seconds, libpod uses RFC 3339 text for `Created`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Unix(i64),
    Text(String),
}

impl Timestamp {
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Unix(secs) => DateTime::from_timestamp(*secs, 0),
            Timestamp::Text(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

/// A container as listed by the Docker Engine API (`GET /containers/json`).
///
/// Podman's Docker-compatible endpoint emits the same shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DockerContainer {
    pub id: String,
    pub names: Option<Vec<String>>,
    pub image: Option<String>,
    #[serde(rename = "ImageID")]
    pub image_id: Option<String>,
    pub command: Option<String>,
    pub created: Option<Timestamp>,
    pub ports: Option<Vec<DockerPort>>,
    pub labels: Option<HashMap<String, String>>,
    pub state: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DockerPort {
    #[serde(rename = "IP")]
    pub ip: Option<String>,
    pub private_port: u16,
    pub public_port: Option<u16>,
    #[serde(rename = "Type")]
    pub protocol: Option<String>,
}

/// A container as listed by libpod (`GET /libpod/containers/json`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PodmanContainer {
    pub id: String,
    pub names: Option<Vec<String>>,
    pub image: Option<String>,
    #[serde(rename = "ImageID")]
    pub image_id: Option<String>,
    pub command: Option<Vec<String>>,
    pub created: Option<Timestamp>,
    pub started_at: Option<i64>,
    pub ports: Option<Vec<PodmanPort>>,
    pub labels: Option<HashMap<String, String>>,
    pub state: Option<String>,
    pub status: Option<String>,
    pub pod: Option<String>,
    pub pod_name: Option<String>,
}

/// libpod port mapping. `range` counts consecutive ports starting at
/// `container_port` / `host_port`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodmanPort {
    pub host_ip: Option<String>,
    pub container_port: u16,
    pub host_port: Option<u16>,
    pub range: Option<u16>,
    pub protocol: Option<String>,
}

/// A pod as listed by libpod (`GET /libpod/pods/json`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NativePod {
    pub id: String,
    pub name: Option<String>,
    pub status: Option<String>,
}

/// Engine-native container record, tagged by wire shape.
///
/// The shape is independent of the engine type: a Podman connection queried
/// through its Docker-compatible API yields `Docker` records.
#[derive(Debug, Clone)]
pub enum NativeContainer {
    Docker(DockerContainer),
    Podman(PodmanContainer),
}

impl NativeContainer {
    pub fn id(&self) -> &str {
        match self {
            NativeContainer::Docker(c) => &c.id,
            NativeContainer::Podman(c) => &c.id,
        }
    }
}

impl From<DockerContainer> for NativeContainer {
    fn from(value: DockerContainer) -> Self {
        NativeContainer::Docker(value)
    }
}

impl From<PodmanContainer> for NativeContainer {
    fn from(value: PodmanContainer) -> Self {
        NativeContainer::Podman(value)
    }
}
