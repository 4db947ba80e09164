// ABOUTME: Bollard-based engine client for Docker and Podman.
// ABOUTME: Podman listings use libpod JSON endpoints to get pod metadata and native states.

use super::client::{EngineClient, EngineError};
use super::types::{EngineEndpoint, EngineType};
use crate::normalize::{DockerContainer, NativeContainer, NativePod, PodmanContainer};
use crate::translate::{EngineCreatePayload, HostConfigPayload, RestartPolicy};
use crate::types::ContainerId;
use async_trait::async_trait;
use bollard::Docker;
use bollard::models::{self, ContainerCreateBody, RestartPolicyNameEnum};
use bollard::query_parameters::{
    CreateContainerOptions, ListContainersOptions, StartContainerOptions,
};
use http_body_util::BodyExt;
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::UnixStream;

/// Base path of the libpod REST API.
const LIBPOD_API: &str = "/v4.0.0/libpod";

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_container_create_error(e: bollard::errors::Error) -> EngineError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => EngineError::ImageNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => EngineError::AlreadyExists(message.clone()),
        _ => EngineError::Runtime(e.to_string()),
    }
}

fn map_container_start_error(e: bollard::errors::Error) -> EngineError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => EngineError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => EngineError::AlreadyRunning(message.clone()),
        _ => EngineError::Runtime(e.to_string()),
    }
}

fn decode_error(e: serde_json::Error) -> EngineError {
    EngineError::Decode(e.to_string())
}

// =============================================================================
// Payload Conversion
// =============================================================================

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

fn restart_policy_body(policy: &RestartPolicy) -> models::RestartPolicy {
    models::RestartPolicy {
        name: Some(match policy {
            RestartPolicy::No => RestartPolicyNameEnum::NO,
            RestartPolicy::Always => RestartPolicyNameEnum::ALWAYS,
            RestartPolicy::UnlessStopped => RestartPolicyNameEnum::UNLESS_STOPPED,
            RestartPolicy::OnFailure { .. } => RestartPolicyNameEnum::ON_FAILURE,
        }),
        maximum_retry_count: policy.max_retries().map(i64::from),
    }
}

fn host_config_body(host: &HostConfigPayload) -> models::HostConfig {
    let port_bindings: HashMap<String, Option<Vec<models::PortBinding>>> = host
        .port_bindings
        .iter()
        .map(|(key, bindings)| {
            let bindings = bindings
                .iter()
                .map(|b| models::PortBinding {
                    host_ip: b.host_ip.clone(),
                    host_port: b.host_port.clone(),
                })
                .collect();
            (key.clone(), Some(bindings))
        })
        .collect();

    models::HostConfig {
        port_bindings: if port_bindings.is_empty() {
            None
        } else {
            Some(port_bindings)
        },
        binds: non_empty(&host.binds),
        auto_remove: host.auto_remove,
        security_opt: non_empty(&host.security_opt),
        privileged: host.privileged,
        readonly_rootfs: host.readonly_rootfs,
        cap_add: non_empty(&host.cap_add),
        cap_drop: non_empty(&host.cap_drop),
        userns_mode: host.userns_mode.clone(),
        restart_policy: host.restart_policy.as_ref().map(restart_policy_body),
        dns: non_empty(&host.dns),
        extra_hosts: non_empty(&host.extra_hosts),
        network_mode: host.network_mode.clone(),
        ..Default::default()
    }
}

fn create_body(payload: &EngineCreatePayload) -> ContainerCreateBody {
    // An empty test inherits the image's healthcheck, so it is left unset.
    let healthcheck = payload.healthcheck.as_ref().map(|hc| models::HealthConfig {
        test: non_empty(&hc.test),
        interval: Some(hc.interval_ns),
        timeout: Some(hc.timeout_ns),
        retries: Some(hc.retries),
        start_period: Some(hc.start_period_ns),
        start_interval: None,
    });

    ContainerCreateBody {
        image: Some(payload.image.clone()),
        hostname: payload.hostname.clone(),
        user: payload.user.clone(),
        env: non_empty(&payload.env),
        labels: if payload.labels.is_empty() {
            None
        } else {
            Some(payload.labels.clone())
        },
        exposed_ports: if payload.exposed_ports.is_empty() {
            None
        } else {
            Some(payload.exposed_ports.iter().cloned().collect())
        },
        cmd: payload.cmd.clone(),
        entrypoint: payload.entrypoint.clone(),
        tty: payload.tty,
        attach_stdin: payload.attach_stdin,
        attach_stdout: payload.attach_stdout,
        attach_stderr: payload.attach_stderr,
        open_stdin: payload.open_stdin,
        stdin_once: payload.stdin_once,
        host_config: payload.host_config.as_ref().map(host_config_body),
        healthcheck,
        ..Default::default()
    }
}

// =============================================================================
// BollardEngine
// =============================================================================

/// Engine client implementation using bollard.
///
/// Supports both Docker and Podman via the Docker-compatible API. For Podman,
/// container and pod listings go to the libpod API, which reports pod
/// membership and Podman-only states.
pub struct BollardEngine {
    client: Docker,
    engine_type: EngineType,
    socket_path: Option<String>,
    timeout: Duration,
}

impl BollardEngine {
    /// Create a new BollardEngine from a Docker client. Without a socket path
    /// Podman is queried through its Docker-compatible API only.
    pub fn new(client: Docker, engine_type: EngineType) -> Self {
        Self {
            client,
            engine_type,
            socket_path: None,
            timeout: Duration::from_secs(120),
        }
    }

    /// Connect to the engine listening at `endpoint`.
    pub fn connect(endpoint: &EngineEndpoint, timeout: Duration) -> Result<Self, EngineError> {
        let client = Docker::connect_with_unix(
            &endpoint.socket_path,
            timeout.as_secs(),
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(|e| EngineError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            engine_type: endpoint.engine_type,
            socket_path: Some(endpoint.socket_path.clone()),
            timeout,
        })
    }

    /// Get the engine type (Docker or Podman).
    pub fn engine_type(&self) -> EngineType {
        self.engine_type
    }

    fn uses_libpod(&self) -> bool {
        self.engine_type == EngineType::Podman && self.socket_path.is_some()
    }

    /// GET a libpod endpoint and return the response body.
    async fn libpod_get(&self, path: &str) -> Result<bytes::Bytes, EngineError> {
        tokio::time::timeout(self.timeout, self.libpod_request(path))
            .await
            .map_err(|_| {
                EngineError::ConnectionFailed(format!("libpod request timed out: {}", path))
            })?
    }

    async fn libpod_request(&self, path: &str) -> Result<bytes::Bytes, EngineError> {
        let socket_path = self.socket_path.as_ref().ok_or_else(|| {
            EngineError::ConnectionFailed("socket path not available for libpod API".to_string())
        })?;

        let stream = UnixStream::connect(socket_path).await.map_err(|e| {
            EngineError::ConnectionFailed(format!("failed to connect to socket: {}", e))
        })?;

        let io = TokioIo::new(stream);

        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| EngineError::ConnectionFailed(format!("HTTP handshake failed: {}", e)))?;

        // Spawn connection handler
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::warn!("libpod connection error: {}", e);
            }
        });

        let uri = format!("{}{}", LIBPOD_API, path);
        let req = hyper::Request::builder()
            .method("GET")
            .uri(&uri)
            .header("Host", "localhost")
            .body(http_body_util::Empty::<bytes::Bytes>::new())
            .map_err(|e| EngineError::Runtime(format!("failed to build request: {}", e)))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| EngineError::ConnectionFailed(format!("request failed: {}", e)))?;

        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| EngineError::ConnectionFailed(format!("failed to read response: {}", e)))?
            .to_bytes();

        if !status.is_success() {
            return Err(EngineError::Runtime(format!(
                "libpod API error ({}) on {}: {}",
                status,
                path,
                String::from_utf8_lossy(&body)
            )));
        }

        Ok(body)
    }

    /// List containers through the Docker-compatible API.
    async fn list_compat(
        &self,
        filters: HashMap<String, Vec<String>>,
    ) -> Result<Vec<NativeContainer>, EngineError> {
        let opts = ListContainersOptions {
            all: true,
            filters: if filters.is_empty() {
                None
            } else {
                Some(filters)
            },
            ..Default::default()
        };

        let summaries = self
            .client
            .list_containers(Some(opts))
            .await
            .map_err(|e| EngineError::Runtime(e.to_string()))?;

        // Round-trip through the API's JSON shape so Docker records are
        // normalized from exactly what the engine reported.
        summaries
            .into_iter()
            .map(|summary| {
                let value = serde_json::to_value(&summary).map_err(decode_error)?;
                serde_json::from_value::<DockerContainer>(value)
                    .map(NativeContainer::Docker)
                    .map_err(decode_error)
            })
            .collect()
    }

    /// List containers through libpod. `filters` is a JSON filter object.
    async fn list_libpod(
        &self,
        filters: Option<serde_json::Value>,
    ) -> Result<Vec<NativeContainer>, EngineError> {
        let mut path = "/containers/json?all=true".to_string();
        if let Some(filters) = filters {
            path.push_str("&filters=");
            path.push_str(&urlencoding::encode(&filters.to_string()));
        }

        let body = self.libpod_get(&path).await?;
        let containers: Vec<PodmanContainer> = serde_json::from_slice(&body).map_err(decode_error)?;
        Ok(containers.into_iter().map(NativeContainer::Podman).collect())
    }
}

#[async_trait]
impl EngineClient for BollardEngine {
    async fn ping(&self) -> Result<(), EngineError> {
        self.client
            .ping()
            .await
            .map_err(|e| EngineError::ConnectionFailed(e.to_string()))?;
        Ok(())
    }

    async fn list_containers(&self) -> Result<Vec<NativeContainer>, EngineError> {
        if self.uses_libpod() {
            self.list_libpod(None).await
        } else {
            self.list_compat(HashMap::new()).await
        }
    }

    async fn list_pods(&self) -> Result<Vec<NativePod>, EngineError> {
        if !self.uses_libpod() {
            return Ok(Vec::new());
        }

        let body = self.libpod_get("/pods/json").await?;
        serde_json::from_slice(&body).map_err(decode_error)
    }

    async fn inspect_container(&self, id: &ContainerId) -> Result<NativeContainer, EngineError> {
        let found = if self.uses_libpod() {
            self.list_libpod(Some(serde_json::json!({ "id": [id.as_str()] })))
                .await?
        } else {
            let mut filters = HashMap::new();
            filters.insert("id".to_string(), vec![id.to_string()]);
            self.list_compat(filters).await?
        };

        found
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::NotFound(id.to_string()))
    }

    async fn create_container(
        &self,
        payload: &EngineCreatePayload,
    ) -> Result<ContainerId, EngineError> {
        let opts = CreateContainerOptions {
            name: payload.name.clone(),
            ..Default::default()
        };

        let response = self
            .client
            .create_container(Some(opts), create_body(payload))
            .await
            .map_err(map_container_create_error)?;

        tracing::debug!("created container {} from {}", response.id, payload.image);
        Ok(ContainerId::new(response.id))
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), EngineError> {
        self.client
            .start_container(id.as_str(), None::<StartContainerOptions>)
            .await
            .map_err(map_container_start_error)
    }
}
