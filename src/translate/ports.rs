// ABOUTME: Parsing of "port/protocol" keys used by exposed ports and bindings.
// ABOUTME: Accepts "80", "80/udp" and ranges like "8000-8010/tcp".

use super::ValidationError;
use crate::types::Protocol;
use std::fmt;

/// A validated container port (or port range) with its protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortSpec {
    pub start: u16,
    pub end: u16,
    pub protocol: Protocol,
}

impl PortSpec {
    pub fn parse(spec: &str) -> Result<Self, ValidationError> {
        let trimmed = spec.trim();
        let (ports, protocol) = match trimmed.split_once('/') {
            Some((ports, protocol)) => {
                let protocol = match protocol {
                    "tcp" => Protocol::Tcp,
                    "udp" => Protocol::Udp,
                    other => {
                        return Err(ValidationError::InvalidProtocol {
                            spec: spec.to_string(),
                            protocol: other.to_string(),
                        });
                    }
                };
                (ports, protocol)
            }
            None => (trimmed, Protocol::Tcp),
        };

        let (start, end) = match ports.split_once('-') {
            Some((start, end)) => (parse_port(spec, start)?, parse_port(spec, end)?),
            None => {
                let port = parse_port(spec, ports)?;
                (port, port)
            }
        };

        if end < start {
            return Err(ValidationError::InvalidPort {
                spec: spec.to_string(),
                reason: format!("range end {} is below start {}", end, start),
            });
        }

        Ok(Self {
            start,
            end,
            protocol,
        })
    }

    pub fn is_range(&self) -> bool {
        self.start != self.end
    }

    /// One canonical `port/protocol` key per port in the range.
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        (self.start..=self.end).map(move |port| format!("{}/{}", port, self.protocol))
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}/{}", self.start, self.protocol)
        } else {
            write!(f, "{}-{}/{}", self.start, self.end, self.protocol)
        }
    }
}

fn parse_port(spec: &str, value: &str) -> Result<u16, ValidationError> {
    match value.parse::<u16>() {
        Ok(0) => Err(ValidationError::InvalidPort {
            spec: spec.to_string(),
            reason: "port 0 is not a valid container port".to_string(),
        }),
        Ok(port) => Ok(port),
        Err(_) => Err(ValidationError::InvalidPort {
            spec: spec.to_string(),
            reason: format!("'{}' is not a port number", value),
        }),
    }
}
