// ABOUTME: Translates canonical create options into an engine creation payload.
// ABOUTME: Validates health bounds and port protocols, resolves env files, applies defaults.

mod env_file;
mod options;
mod payload;
mod ports;
mod restart_policy;

pub use env_file::{EnvFileReader, FsEnvFileReader, parse_env_file};
pub use options::{
    ContainerCreateOptions, Entrypoint, HealthConfig, HostConfig, PortBinding,
    RestartPolicyOptions,
};
pub use payload::{EngineCreatePayload, HostConfigPayload};
pub use ports::PortSpec;
pub use restart_policy::RestartPolicy;

use crate::types::EngineId;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Smallest non-zero health check duration engines accept (1ms).
pub const MIN_HEALTH_DURATION_NS: i64 = 1_000_000;

/// Contract violations in create options. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("image must not be empty")]
    EmptyImage,

    #[error("invalid env entry '{0}': missing variable name")]
    EnvEntry(String),

    #[error(
        "HealthCheck.{field} must be 0 or at least {min}ns (1ms), got {value}",
        min = MIN_HEALTH_DURATION_NS
    )]
    HealthDuration { field: &'static str, value: i64 },

    #[error("HealthCheck.Retries must not be negative, got {0}")]
    HealthRetries(i64),

    #[error("invalid HealthCheck.Test: {0}")]
    HealthTest(String),

    #[error("invalid protocol '{protocol}' in port '{spec}' (expected tcp or udp)")]
    InvalidProtocol { spec: String, protocol: String },

    #[error("invalid port '{spec}': {reason}")]
    InvalidPort { spec: String, reason: String },

    #[error("invalid restart policy: {0}")]
    RestartPolicy(String),

    #[error("RestartPolicy.MaximumRetryCount must not be negative, got {0}")]
    RestartRetries(i64),
}

/// Errors from translation.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to read env file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("engine not registered: {0}")]
    StaleEngine(EngineId),
}

/// Translate create options into an engine payload.
///
/// Env file entries are appended after the explicit `env` entries, so on
/// duplicate keys the env file value wins. `start` defaults to `true`.
pub fn translate<R>(
    options: ContainerCreateOptions,
    env_reader: &R,
) -> Result<EngineCreatePayload, TranslateError>
where
    R: EnvFileReader + ?Sized,
{
    let image = options.image.trim().to_string();
    if image.is_empty() {
        return Err(ValidationError::EmptyImage.into());
    }

    let mut env = options.env;
    for entry in &env {
        if entry.is_empty() || entry.starts_with('=') {
            return Err(ValidationError::EnvEntry(entry.clone()).into());
        }
    }
    for path in &options.env_files {
        let entries = env_reader
            .read_env_file(path)
            .map_err(|source| TranslateError::EnvFile {
                path: path.clone(),
                source,
            })?;
        env.extend(entries);
    }

    let healthcheck = options
        .health_check
        .map(validate_health)
        .transpose()?;

    let mut exposed_ports = BTreeSet::new();
    for key in &options.exposed_ports {
        exposed_ports.extend(PortSpec::parse(key)?.keys());
    }

    let host_config = options.host_config.map(translate_host_config).transpose()?;

    Ok(EngineCreatePayload {
        name: options.name.filter(|n| !n.is_empty()),
        start: options.start.unwrap_or(true),
        detach: options.detach.unwrap_or(false),
        image,
        hostname: options.hostname,
        user: options.user,
        env,
        labels: options.labels,
        exposed_ports,
        cmd: options.cmd,
        entrypoint: options.entrypoint.map(Entrypoint::into_args),
        tty: options.tty,
        attach_stdin: options.attach_stdin,
        attach_stdout: options.attach_stdout,
        attach_stderr: options.attach_stderr,
        open_stdin: options.open_stdin,
        stdin_once: options.stdin_once,
        host_config,
        healthcheck,
    })
}

/// Check a health config against engine bounds.
pub fn validate_health(health: HealthConfig) -> Result<HealthConfig, ValidationError> {
    for (field, value) in [
        ("Interval", health.interval_ns),
        ("Timeout", health.timeout_ns),
        ("StartPeriod", health.start_period_ns),
    ] {
        if value != 0 && value < MIN_HEALTH_DURATION_NS {
            return Err(ValidationError::HealthDuration { field, value });
        }
    }

    if health.retries < 0 {
        return Err(ValidationError::HealthRetries(health.retries));
    }

    match health.test.first().map(String::as_str) {
        None | Some("NONE") | Some("CMD") => {}
        Some("CMD-SHELL") if health.test.len() == 2 => {}
        Some("CMD-SHELL") => {
            return Err(ValidationError::HealthTest(
                "CMD-SHELL takes exactly one command string".to_string(),
            ));
        }
        Some(other) => {
            return Err(ValidationError::HealthTest(format!(
                "unknown test kind '{}' (expected NONE, CMD or CMD-SHELL)",
                other
            )));
        }
    }

    Ok(health)
}

fn translate_host_config(host: HostConfig) -> Result<HostConfigPayload, ValidationError> {
    let mut port_bindings = BTreeMap::new();
    for (key, bindings) in host.port_bindings {
        let spec = PortSpec::parse(&key)?;
        if spec.is_range() {
            return Err(ValidationError::InvalidPort {
                spec: key,
                reason: "port bindings take a single port".to_string(),
            });
        }
        port_bindings.insert(spec.to_string(), bindings.unwrap_or_default());
    }

    let restart_policy = host
        .restart_policy
        .as_ref()
        .map(RestartPolicy::from_options)
        .transpose()?;

    Ok(HostConfigPayload {
        port_bindings,
        binds: host.binds,
        auto_remove: host.auto_remove,
        security_opt: host.security_opt,
        privileged: host.privileged,
        readonly_rootfs: host.readonly_rootfs,
        cap_add: host.cap_add,
        cap_drop: host.cap_drop,
        userns_mode: host.userns_mode,
        restart_policy,
        dns: host.dns,
        extra_hosts: host.extra_hosts,
        network_mode: host.network_mode,
    })
}
