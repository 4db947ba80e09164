// ABOUTME: Local engine detection for Docker and Podman sockets.
// ABOUTME: Reports every engine socket present, Podman first.

use super::types::{EngineEndpoint, EngineType};
use std::path::Path;

const ROOTFUL_PODMAN: &str = "/run/podman/podman.sock";
const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Detect the container engines available on the local system.
///
/// Unlike single-runtime tools this returns all of them, in this order:
/// 1. Rootless Podman socket (`/run/user/$UID/podman/podman.sock`)
/// 2. Rootful Podman socket (`/run/podman/podman.sock`)
/// 3. Docker socket (`/var/run/docker.sock`)
pub fn detect_local_engines() -> Vec<EngineEndpoint> {
    let mut found = Vec::new();

    if let Some(uid) = get_uid() {
        let rootless_socket = rootless_podman_socket(&uid);
        if Path::new(&rootless_socket).exists() {
            found.push(EngineEndpoint {
                engine_type: EngineType::Podman,
                socket_path: rootless_socket,
                label: "rootless".to_string(),
            });
        }
    }

    if Path::new(ROOTFUL_PODMAN).exists() {
        found.push(EngineEndpoint {
            engine_type: EngineType::Podman,
            socket_path: ROOTFUL_PODMAN.to_string(),
            label: "rootful".to_string(),
        });
    }

    if Path::new(DOCKER_SOCKET).exists() {
        found.push(EngineEndpoint {
            engine_type: EngineType::Docker,
            socket_path: DOCKER_SOCKET.to_string(),
            label: "default".to_string(),
        });
    }

    tracing::debug!("detected {} local engine socket(s)", found.len());
    found
}

/// Default socket path for an engine type when none is configured.
pub fn default_socket_path(engine_type: EngineType) -> String {
    match engine_type {
        EngineType::Docker => DOCKER_SOCKET.to_string(),
        EngineType::Podman => get_uid()
            .map(|uid| rootless_podman_socket(&uid))
            .filter(|path| Path::new(path).exists())
            .unwrap_or_else(|| ROOTFUL_PODMAN.to_string()),
    }
}

fn rootless_podman_socket(uid: &str) -> String {
    format!("/run/user/{}/podman/podman.sock", uid)
}

fn get_uid() -> Option<String> {
    std::env::var("UID").ok().or_else(|| {
        // Fall back to reading /proc/self/status
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|s| {
                s.lines()
                    .find(|l| l.starts_with("Uid:"))
                    .and_then(|l| l.split_whitespace().nth(1))
                    .map(|s| s.to_string())
            })
    })
}
