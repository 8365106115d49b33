//! Core data types for harvested proxies

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque proxy address: scheme, host, and port as advertised by a pool.
///
/// Addresses compare as exact strings. No normalization is applied, so two
/// spellings of the same endpoint are distinct values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProxyAddress(String);

impl ProxyAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProxyAddress {
    fn from(address: &str) -> Self {
        Self(address.to_string())
    }
}

impl From<String> for ProxyAddress {
    fn from(address: String) -> Self {
        Self(address)
    }
}

/// URL of a pool service believed to expose a proxy listing under `/all`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointUrl(String);

impl EndpointUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EndpointUrl {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}

impl From<String> for EndpointUrl {
    fn from(url: String) -> Self {
        Self(url)
    }
}

/// Outcome of a single liveness probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProbeStatus {
    Alive,
    Dead(String),
    Timeout,
}

/// Detailed result of probing one proxy against the reachability target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeReport {
    pub address: ProxyAddress,
    pub status: ProbeStatus,
    pub elapsed_ms: Option<u64>,
}

impl ProbeReport {
    pub fn alive(address: ProxyAddress, elapsed_ms: u64) -> Self {
        Self {
            address,
            status: ProbeStatus::Alive,
            elapsed_ms: Some(elapsed_ms),
        }
    }

    pub fn dead(address: ProxyAddress, reason: String) -> Self {
        Self {
            address,
            status: ProbeStatus::Dead(reason),
            elapsed_ms: None,
        }
    }

    pub fn timeout(address: ProxyAddress) -> Self {
        Self {
            address,
            status: ProbeStatus::Timeout,
            elapsed_ms: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.status, ProbeStatus::Alive)
    }
}
