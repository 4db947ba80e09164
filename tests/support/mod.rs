// ABOUTME: Test support utilities.
// ABOUTME: Provides tracing setup, native record fixtures and an in-memory engine client.

use async_trait::async_trait;
use dockhand::engine::{EngineClient, EngineConnection, EngineError, EngineType};
use dockhand::normalize::{
    DockerContainer, DockerPort, NativeContainer, NativePod, PodmanContainer, Timestamp,
};
use dockhand::translate::EngineCreatePayload;
use dockhand::types::ContainerId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("dockhand=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[allow(dead_code)]
pub fn docker_engine() -> EngineConnection {
    EngineConnection::new("docker.default", "Docker (default)", EngineType::Docker)
}

#[allow(dead_code)]
pub fn podman_engine() -> EngineConnection {
    EngineConnection::new("podman.rootless", "Podman (rootless)", EngineType::Podman)
}

/// A running Docker container named `/{name}` publishing 8080 -> 80/tcp.
#[allow(dead_code)]
pub fn docker_container(id: &str, name: &str) -> DockerContainer {
    DockerContainer {
        id: id.to_string(),
        names: Some(vec![format!("/{}", name)]),
        image: Some("nginx:latest".to_string()),
        image_id: Some("sha256:aaaa".to_string()),
        command: Some("nginx -g 'daemon off;'".to_string()),
        created: Some(Timestamp::Unix(1_700_000_000)),
        ports: Some(vec![DockerPort {
            ip: Some("0.0.0.0".to_string()),
            private_port: 80,
            public_port: Some(8080),
            protocol: Some("tcp".to_string()),
        }]),
        labels: Some(HashMap::from([("app".to_string(), name.to_string())])),
        state: Some("running".to_string()),
        status: Some("Up 5 minutes".to_string()),
    }
}

/// A running Podman container with no ports.
#[allow(dead_code)]
pub fn podman_container(id: &str, name: &str) -> PodmanContainer {
    PodmanContainer {
        id: id.to_string(),
        names: Some(vec![name.to_string()]),
        image: Some("docker.io/library/redis:7".to_string()),
        image_id: Some("bbbb".to_string()),
        command: Some(vec!["redis-server".to_string()]),
        created: Some(Timestamp::Text("2024-03-01T12:00:00Z".to_string())),
        started_at: Some(1_709_294_500),
        ports: None,
        labels: None,
        state: Some("running".to_string()),
        status: None,
        pod: None,
        pod_name: None,
    }
}

#[allow(dead_code)]
pub fn native_pod(id: &str, name: &str, status: &str) -> NativePod {
    NativePod {
        id: id.to_string(),
        name: Some(name.to_string()),
        status: Some(status.to_string()),
    }
}

type ListHook = Box<dyn FnOnce() + Send>;

/// In-memory engine client.
///
/// Serves a fixed container and pod listing, records create/start calls,
/// and can run a hook while listing containers to simulate concurrent
/// inventory changes.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeEngine {
    pub containers: Mutex<Vec<NativeContainer>>,
    pub pods: Mutex<Vec<NativePod>>,
    pub created: Mutex<Vec<EngineCreatePayload>>,
    pub started: Mutex<Vec<ContainerId>>,
    pub unreachable: bool,
    on_list: Mutex<Option<ListHook>>,
}

#[allow(dead_code)]
impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_containers(containers: impl IntoIterator<Item = NativeContainer>) -> Self {
        let engine = Self::new();
        engine.containers.lock().extend(containers);
        engine
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn with_pods(self, pods: impl IntoIterator<Item = NativePod>) -> Self {
        self.pods.lock().extend(pods);
        self
    }

    /// Run `hook` once, the next time containers are listed.
    pub fn on_list(self, hook: impl FnOnce() + Send + 'static) -> Self {
        *self.on_list.lock() = Some(Box::new(hook));
        self
    }

    fn check(&self) -> Result<(), EngineError> {
        if self.unreachable {
            return Err(EngineError::ConnectionFailed(
                "fake engine is down".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl EngineClient for FakeEngine {
    async fn ping(&self) -> Result<(), EngineError> {
        self.check()
    }

    async fn list_containers(&self) -> Result<Vec<NativeContainer>, EngineError> {
        self.check()?;
        let hook = self.on_list.lock().take();
        if let Some(hook) = hook {
            hook();
        }
        Ok(self.containers.lock().clone())
    }

    async fn list_pods(&self) -> Result<Vec<NativePod>, EngineError> {
        self.check()?;
        Ok(self.pods.lock().clone())
    }

    async fn inspect_container(&self, id: &ContainerId) -> Result<NativeContainer, EngineError> {
        self.check()?;
        self.containers
            .lock()
            .iter()
            .find(|c| c.id() == id.as_str())
            .cloned()
            .ok_or_else(|| EngineError::NotFound(id.to_string()))
    }

    async fn create_container(
        &self,
        payload: &EngineCreatePayload,
    ) -> Result<ContainerId, EngineError> {
        self.check()?;
        let mut created = self.created.lock();
        created.push(payload.clone());
        Ok(ContainerId::new(format!("created-{}", created.len())))
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), EngineError> {
        self.check()?;
        self.started.lock().push(id.clone());
        Ok(())
    }
}
