// ABOUTME: Caller-facing container create options in the engine (PascalCase) shape.
// ABOUTME: Deserializable from YAML or JSON; consumed once by the translator.

use serde::de::{Deserializer, IgnoredAny};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Options for creating a container on any engine.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerCreateOptions {
    #[serde(rename = "name")]
    pub name: Option<String>,
    pub hostname: Option<String>,
    pub user: Option<String>,
    /// `KEY=VALUE` entries, applied in order.
    #[serde(default)]
    pub env: Vec<String>,
    /// Env files appended after `env`.
    #[serde(default)]
    pub env_files: Vec<PathBuf>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// `port/protocol` keys. Accepts the engine map form or a plain list.
    #[serde(default, deserialize_with = "deserialize_port_keys")]
    pub exposed_ports: Vec<String>,
    pub host_config: Option<HostConfig>,
    #[serde(default)]
    pub image: String,
    pub tty: Option<bool>,
    pub cmd: Option<Vec<String>>,
    pub entrypoint: Option<Entrypoint>,
    pub attach_stdin: Option<bool>,
    pub attach_stdout: Option<bool>,
    pub attach_stderr: Option<bool>,
    pub open_stdin: Option<bool>,
    pub stdin_once: Option<bool>,
    pub detach: Option<bool>,
    /// Start after creation. Absent means start.
    #[serde(rename = "start")]
    pub start: Option<bool>,
    pub health_check: Option<HealthConfig>,
}

/// Entrypoint as a single opaque command string or an argument vector.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Entrypoint {
    Command(String),
    Args(Vec<String>),
}

impl Entrypoint {
    /// The engine's array form. A command string is never split on whitespace.
    pub fn into_args(self) -> Vec<String> {
        match self {
            Entrypoint::Command(cmd) => vec![cmd],
            Entrypoint::Args(args) => args,
        }
    }
}

/// Runtime isolation, restart and network policy.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostConfig {
    #[serde(default)]
    pub port_bindings: BTreeMap<String, Option<Vec<PortBinding>>>,
    #[serde(default)]
    pub binds: Vec<String>,
    pub auto_remove: Option<bool>,
    #[serde(default)]
    pub security_opt: Vec<String>,
    pub privileged: Option<bool>,
    pub readonly_rootfs: Option<bool>,
    #[serde(default)]
    pub cap_add: Vec<String>,
    #[serde(default)]
    pub cap_drop: Vec<String>,
    pub userns_mode: Option<String>,
    pub restart_policy: Option<RestartPolicyOptions>,
    #[serde(default)]
    pub dns: Vec<String>,
    #[serde(default)]
    pub extra_hosts: Vec<String>,
    pub network_mode: Option<String>,
}

/// Host side of a port binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortBinding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_port: Option<String>,
}

/// Restart policy as engines spell it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RestartPolicyOptions {
    #[serde(default)]
    pub name: String,
    pub maximum_retry_count: Option<i64>,
}

/// Container health check.
///
/// `test`: empty inherits from the image, `["NONE"]` disables,
/// `["CMD", args...]` execs directly, `["CMD-SHELL", command]` uses the shell.
/// Durations are nanoseconds; each must be 0 (inherit) or at least 1ms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthConfig {
    #[serde(default)]
    pub test: Vec<String>,
    #[serde(rename = "Interval", default)]
    pub interval_ns: i64,
    #[serde(rename = "Timeout", default)]
    pub timeout_ns: i64,
    #[serde(rename = "StartPeriod", default)]
    pub start_period_ns: i64,
    #[serde(default)]
    pub retries: i64,
}

fn deserialize_port_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortKeys {
        Map(BTreeMap<String, IgnoredAny>),
        List(Vec<String>),
    }

    Ok(match Option::<PortKeys>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(PortKeys::Map(map)) => map.into_keys().collect(),
        Some(PortKeys::List(list)) => list,
    })
}
