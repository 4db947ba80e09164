// ABOUTME: Converts engine-native container and pod records into canonical records.
// ABOUTME: Provenance is stamped from the owning engine connection, never trusted.

mod native;

pub use native::{
    DockerContainer, DockerPort, NativeContainer, NativePod, PodmanContainer, PodmanPort,
    Timestamp,
};

use crate::engine::EngineConnection;
use crate::types::{
    ContainerId, ContainerRecord, ContainerState, EngineId, ImageId, PodId, PodRef, PortMapping,
    Protocol,
};
use std::collections::{BTreeSet, HashMap};

/// Errors from normalization.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("container {container}: unknown state '{state}'")]
    UnknownState { container: String, state: String },

    #[error("container {container}: invalid port: {reason}")]
    InvalidPort { container: String, reason: String },

    #[error("engine not registered: {0}")]
    StaleEngine(EngineId),
}

/// Normalize one native container against its engine connection.
pub fn normalize(
    engine: &EngineConnection,
    native: NativeContainer,
) -> Result<ContainerRecord, NormalizeError> {
    Normalizer::new(engine).container(native)
}

/// Normalize one native pod against its engine connection.
pub fn normalize_pod(engine: &EngineConnection, native: NativePod) -> PodRef {
    Normalizer::new(engine).pod(native)
}

/// Normalizer bound to one engine connection.
///
/// Carries an optional index of the engine's pods so that container pod
/// references get the pod's status, which container listings don't include.
pub struct Normalizer<'a> {
    engine: &'a EngineConnection,
    pods: HashMap<PodId, PodRef>,
}

impl<'a> Normalizer<'a> {
    pub fn new(engine: &'a EngineConnection) -> Self {
        Self {
            engine,
            pods: HashMap::new(),
        }
    }

    /// Index pods used to resolve container pod references. Pods that belong
    /// to another engine are ignored.
    pub fn with_pods(mut self, pods: impl IntoIterator<Item = PodRef>) -> Self {
        for pod in pods {
            if pod.engine_id == self.engine.id {
                self.pods.insert(pod.id.clone(), pod);
            }
        }
        self
    }

    pub fn pod(&self, native: NativePod) -> PodRef {
        PodRef {
            id: PodId::new(native.id),
            name: native.name.unwrap_or_default(),
            status: native.status.unwrap_or_default(),
            engine_id: self.engine.id.clone(),
        }
    }

    pub fn container(&self, native: NativeContainer) -> Result<ContainerRecord, NormalizeError> {
        match native {
            NativeContainer::Docker(c) => self.docker(c),
            NativeContainer::Podman(c) => self.podman(c),
        }
    }

    fn docker(&self, c: DockerContainer) -> Result<ContainerRecord, NormalizeError> {
        let state = parse_state(&c.id, c.state.as_deref())?;

        let mut ports = BTreeSet::new();
        for port in c.ports.unwrap_or_default() {
            ports.insert(PortMapping {
                host_ip: port.ip.unwrap_or_default(),
                private_port: port.private_port,
                public_port: port.public_port.unwrap_or(0),
                protocol: parse_protocol(&c.id, port.protocol.as_deref())?,
            });
        }

        Ok(ContainerRecord {
            names: strip_names(c.names),
            image: c.image.unwrap_or_default(),
            image_id: ImageId::new(c.image_id.unwrap_or_default()),
            command: c.command.filter(|cmd| !cmd.is_empty()),
            created_at: c
                .created
                .as_ref()
                .and_then(Timestamp::to_datetime)
                .unwrap_or_default(),
            ports,
            labels: c.labels.unwrap_or_default(),
            state,
            status: c.status.filter(|s| !s.is_empty()),
            started_at: None,
            pod: None,
            engine_id: self.engine.id.clone(),
            engine_name: self.engine.name.clone(),
            engine_type: self.engine.engine_type,
            id: ContainerId::new(c.id),
        })
    }

    fn podman(&self, c: PodmanContainer) -> Result<ContainerRecord, NormalizeError> {
        let state = parse_state(&c.id, c.state.as_deref())?;

        let mut ports = BTreeSet::new();
        for port in c.ports.unwrap_or_default() {
            let protocol = parse_protocol(&c.id, port.protocol.as_deref())?;
            let host_ip = port.host_ip.unwrap_or_default();
            for offset in 0..port.range.unwrap_or(1).max(1) {
                let private_port = port.container_port.checked_add(offset).ok_or_else(|| {
                    NormalizeError::InvalidPort {
                        container: c.id.clone(),
                        reason: format!(
                            "range {} from {} overflows",
                            offset, port.container_port
                        ),
                    }
                })?;
                let public_port = match port.host_port {
                    Some(host) if host != 0 => host.checked_add(offset).ok_or_else(|| {
                        NormalizeError::InvalidPort {
                            container: c.id.clone(),
                            reason: format!("range {} from host port {} overflows", offset, host),
                        }
                    })?,
                    _ => 0,
                };
                ports.insert(PortMapping {
                    host_ip: host_ip.clone(),
                    private_port,
                    public_port,
                    protocol,
                });
            }
        }

        let pod = c
            .pod
            .filter(|id| !id.is_empty())
            .map(|id| self.pod_ref(PodId::new(id), c.pod_name));

        Ok(ContainerRecord {
            names: strip_names(c.names),
            image: c.image.unwrap_or_default(),
            image_id: ImageId::new(c.image_id.unwrap_or_default()),
            command: c
                .command
                .filter(|args| !args.is_empty())
                .map(|args| args.join(" ")),
            created_at: c
                .created
                .as_ref()
                .and_then(Timestamp::to_datetime)
                .unwrap_or_default(),
            ports,
            labels: c.labels.unwrap_or_default(),
            state,
            status: c.status.filter(|s| !s.is_empty()),
            started_at: c
                .started_at
                .filter(|secs| *secs > 0)
                .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0)),
            pod,
            engine_id: self.engine.id.clone(),
            engine_name: self.engine.name.clone(),
            engine_type: self.engine.engine_type,
            id: ContainerId::new(c.id),
        })
    }

    fn pod_ref(&self, id: PodId, name: Option<String>) -> PodRef {
        let known = self.pods.get(&id);
        PodRef {
            name: name
                .filter(|n| !n.is_empty())
                .or_else(|| known.map(|p| p.name.clone()))
                .unwrap_or_default(),
            status: known.map(|p| p.status.clone()).unwrap_or_default(),
            engine_id: self.engine.id.clone(),
            id,
        }
    }
}

fn parse_state(container: &str, state: Option<&str>) -> Result<ContainerState, NormalizeError> {
    let raw = state.unwrap_or_default();
    ContainerState::parse(raw).ok_or_else(|| NormalizeError::UnknownState {
        container: container.to_string(),
        state: raw.to_string(),
    })
}

fn parse_protocol(container: &str, protocol: Option<&str>) -> Result<Protocol, NormalizeError> {
    match protocol {
        None | Some("") => Ok(Protocol::Tcp),
        Some(token) => token
            .parse()
            .map_err(|reason| NormalizeError::InvalidPort {
                container: container.to_string(),
                reason,
            }),
    }
}

fn strip_names(names: Option<Vec<String>>) -> Vec<String> {
    names
        .unwrap_or_default()
        .into_iter()
        .map(|n| n.trim_start_matches('/').to_string())
        .collect()
}
