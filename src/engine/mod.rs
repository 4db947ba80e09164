// ABOUTME: Engine connections for Docker and Podman.
// ABOUTME: Connection registry, local socket detection, and the engine client seam.

mod bollard;
mod client;
mod detection;
mod registry;
mod types;

pub use self::bollard::BollardEngine;
pub use client::{EngineClient, EngineError};
pub use detection::{default_socket_path, detect_local_engines};
pub use registry::{EngineRegistry, RegistryError};
pub use types::{EngineConnection, EngineEndpoint, EngineType};
