// ABOUTME: Container restart policy in its validated, engine-ready form.
// ABOUTME: Supports no, always, unless-stopped, and on-failure[:max-retries].

use super::ValidationError;
use super::options::RestartPolicyOptions;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;
use std::str::FromStr;

/// Only `OnFailure` carries a retry count, so a count can never be sent
/// alongside another policy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RestartPolicy {
    #[default]
    No,
    Always,
    UnlessStopped,
    OnFailure {
        max_retries: Option<u32>,
    },
}

impl RestartPolicy {
    /// Validate an engine-spelled policy.
    ///
    /// `MaximumRetryCount` is kept for `on-failure` and dropped for every
    /// other name.
    pub fn from_options(options: &RestartPolicyOptions) -> Result<Self, ValidationError> {
        let policy: RestartPolicy = options
            .name
            .parse()
            .map_err(ValidationError::RestartPolicy)?;

        match (policy, options.maximum_retry_count) {
            // An explicit count wins over an `on-failure:N` suffix.
            (RestartPolicy::OnFailure { .. }, Some(count)) => {
                let count =
                    u32::try_from(count).map_err(|_| ValidationError::RestartRetries(count))?;
                Ok(RestartPolicy::OnFailure {
                    max_retries: Some(count),
                })
            }
            (policy, Some(count)) => {
                tracing::debug!(
                    "dropping MaximumRetryCount {} for restart policy '{}'",
                    count,
                    policy.name()
                );
                Ok(policy)
            }
            (policy, None) => Ok(policy),
        }
    }

    /// Engine name of the policy, without retry suffix.
    pub fn name(&self) -> &'static str {
        match self {
            RestartPolicy::No => "no",
            RestartPolicy::Always => "always",
            RestartPolicy::UnlessStopped => "unless-stopped",
            RestartPolicy::OnFailure { .. } => "on-failure",
        }
    }

    pub fn max_retries(&self) -> Option<u32> {
        match self {
            RestartPolicy::OnFailure { max_retries } => *max_retries,
            _ => None,
        }
    }
}

impl FromStr for RestartPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            // Engines treat an empty name as "no".
            "" | "no" => Ok(RestartPolicy::No),
            "always" => Ok(RestartPolicy::Always),
            "unless-stopped" => Ok(RestartPolicy::UnlessStopped),
            "on-failure" => Ok(RestartPolicy::OnFailure { max_retries: None }),
            s if s.starts_with("on-failure:") => {
                let retries_str = &s["on-failure:".len()..];
                let retries = retries_str
                    .parse::<u32>()
                    .map_err(|_| format!("invalid max retries: {}", retries_str))?;
                Ok(RestartPolicy::OnFailure {
                    max_retries: Some(retries),
                })
            }
            _ => Err(format!("unknown restart policy: {}", s)),
        }
    }
}

impl fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestartPolicy::OnFailure {
                max_retries: Some(n),
            } => write!(f, "on-failure:{}", n),
            policy => f.write_str(policy.name()),
        }
    }
}

impl Serialize for RestartPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let max_retries = self.max_retries();
        let len = if max_retries.is_some() { 2 } else { 1 };
        let mut state = serializer.serialize_struct("RestartPolicy", len)?;
        state.serialize_field("Name", self.name())?;
        if let Some(count) = max_retries {
            state.serialize_field("MaximumRetryCount", &count)?;
        }
        state.end()
    }
}
