// ABOUTME: Engine client trait: the collaborator that talks to a daemon.
// ABOUTME: List, inspect, create and start containers; list pods.

use crate::normalize::{NativeContainer, NativePod};
use crate::translate::EngineCreatePayload;
use crate::types::ContainerId;
use async_trait::async_trait;

/// Operations the inventory needs from one engine connection.
///
/// Implementations return engine-native records; normalization happens in
/// the caller.
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Check that the daemon answers.
    async fn ping(&self) -> Result<(), EngineError>;

    /// List all containers, including stopped ones.
    async fn list_containers(&self) -> Result<Vec<NativeContainer>, EngineError>;

    /// List pods. Engines without pods return an empty list.
    async fn list_pods(&self) -> Result<Vec<NativePod>, EngineError>;

    /// Fetch a single container in list shape.
    async fn inspect_container(&self, id: &ContainerId) -> Result<NativeContainer, EngineError>;

    /// Create a container from a translated payload.
    async fn create_container(
        &self,
        payload: &EngineCreatePayload,
    ) -> Result<ContainerId, EngineError>;

    /// Start a created container.
    async fn start_container(&self, id: &ContainerId) -> Result<(), EngineError>;

    /// Create a container and start it unless the payload opts out.
    async fn create_and_start(
        &self,
        payload: &EngineCreatePayload,
    ) -> Result<ContainerId, EngineError> {
        let id = self.create_container(payload).await?;
        if payload.start {
            self.start_container(&id).await?;
        }
        Ok(id)
    }
}

/// Errors from engine client operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("container not found: {0}")]
    NotFound(String),

    #[error("container already exists: {0}")]
    AlreadyExists(String),

    #[error("container already running: {0}")]
    AlreadyRunning(String),

    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("unexpected engine response: {0}")]
    Decode(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
