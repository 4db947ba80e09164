// ABOUTME: Configuration types and parsing for dockhand.yml.
// ABOUTME: Lists engine connections and merges them with locally detected sockets.

mod engine;
mod error;

pub use engine::{EngineConfig, ResolvedEngine};
pub use error::ConfigError;

use crate::engine::detect_local_engines;
use engine::EngineEntry;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "dockhand.yml";
pub const CONFIG_FILENAME_ALT: &str = "dockhand.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".dockhand/config.yml";

type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default, deserialize_with = "deserialize_engines")]
    pub engines: Vec<EngineConfig>,

    /// Also register engines found on the local system.
    #[serde(default = "default_auto_detect")]
    pub auto_detect: bool,

    /// Timeout for a single engine request.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

fn default_auto_detect() -> bool {
    true
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(120)
}

impl Default for Config {
    fn default() -> Self {
        Config {
            engines: Vec::new(),
            auto_detect: default_auto_detect(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document is an empty mapping.
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("loading config from {}", path.display());
                return Self::load(path);
            }
        }

        Err(ConfigError::ConfigNotFound(dir.to_path_buf()))
    }

    /// Like `discover`, but a missing file yields the default configuration.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(ConfigError::ConfigNotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Engines to connect to: configured entries first, then detected sockets
    /// (when `auto_detect` is on) that neither reuse a configured socket nor
    /// a configured id.
    pub fn endpoints(&self) -> Vec<ResolvedEngine> {
        let mut resolved: Vec<ResolvedEngine> =
            self.engines.iter().map(EngineConfig::resolve).collect();

        if self.auto_detect {
            let sockets: HashSet<String> = resolved
                .iter()
                .map(|e| e.endpoint.socket_path.clone())
                .collect();
            let ids: HashSet<String> = resolved
                .iter()
                .map(|e| e.connection.id.to_string())
                .collect();

            for endpoint in detect_local_engines() {
                let detected = ResolvedEngine::from(endpoint);
                if sockets.contains(&detected.endpoint.socket_path)
                    || ids.contains(detected.connection.id.as_str())
                {
                    continue;
                }
                resolved.push(detected);
            }
        }

        resolved
    }

    fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "request_timeout must be greater than zero".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for engine in &self.engines {
            let id = engine.connection().id;
            if id.as_str().is_empty() {
                return Err(ConfigError::InvalidConfig(
                    "engine id cannot be empty".to_string(),
                ));
            }
            if !seen.insert(id.clone()) {
                return Err(ConfigError::InvalidConfig(format!(
                    "duplicate engine id: {}",
                    id
                )));
            }
        }
        Ok(())
    }
}

fn deserialize_engines<'de, D>(deserializer: D) -> std::result::Result<Vec<EngineConfig>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Option<Vec<EngineEntry>> = Option::deserialize(deserializer)?;
    values
        .unwrap_or_default()
        .into_iter()
        .map(|entry| entry.into_engine_config())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(serde::de::Error::custom)
}
