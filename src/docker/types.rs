use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

use serde::Deserialize;

/// Running state and address of a container, refreshed on every poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerState {
    pub running: bool,
    pub ip_address: Option<IpAddr>,
}

/// Why an inspection call did not produce a [`ContainerState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectError {
    /// The runtime binary could not be run or its daemon is down.
    RuntimeUnreachable(String),
    /// The runtime answered but knows no container by that name.
    NotFound(String),
    /// Anything else; retried on the next tick.
    Transient(String),
}

impl InspectError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::RuntimeUnreachable(_))
    }
}

impl fmt::Display for InspectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RuntimeUnreachable(msg) => write!(f, "container runtime unreachable: {msg}"),
            Self::NotFound(msg) => write!(f, "container not found: {msg}"),
            Self::Transient(msg) => write!(f, "inspection failed: {msg}"),
        }
    }
}

impl std::error::Error for InspectError {}

/// The part of `docker inspect` output we read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct InspectRecord {
    pub state: StateRecord,
    #[serde(default)]
    pub network_settings: Option<NetworkSettings>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct StateRecord {
    #[serde(default)]
    pub running: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct NetworkSettings {
    #[serde(default, rename = "IPAddress")]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub networks: Option<BTreeMap<String, NetworkEndpoint>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NetworkEndpoint {
    #[serde(default, rename = "IPAddress")]
    pub ip_address: Option<String>,
}

impl From<InspectRecord> for ContainerState {
    fn from(record: InspectRecord) -> Self {
        let settings = record.network_settings.unwrap_or_default();

        // Containers attached only to user-defined networks leave the
        // top-level address empty.
        let ip_address = parse_ip(settings.ip_address.as_deref()).or_else(|| {
            settings
                .networks
                .unwrap_or_default()
                .values()
                .find_map(|endpoint| parse_ip(endpoint.ip_address.as_deref()))
        });

        Self {
            running: record.state.running,
            ip_address,
        }
    }
}

fn parse_ip(raw: Option<&str>) -> Option<IpAddr> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}
