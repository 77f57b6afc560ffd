use std::net::IpAddr;
use std::time::Duration;

use super::types::{Credentials, ProbeOutcome};
use super::{pg, tcp};

/// Ports that get a protocol-aware check instead of a bare connect.
pub const POSTGRES_PORT: u16 = 5432;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Decides whether a service on `ip:port` accepts traffic.
pub trait Probe {
    fn probe(&self, ip: IpAddr, port: u16) -> ProbeOutcome;
}

/// The fixed set of probe kinds, chosen once from the target port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prober {
    Tcp {
        connect_timeout: Duration,
    },
    Postgres {
        credentials: Credentials,
        connect_timeout: Duration,
    },
}

impl Prober {
    pub fn for_port(port: u16, credentials: Credentials, connect_timeout: Duration) -> Self {
        match port {
            POSTGRES_PORT => Self::Postgres {
                credentials,
                connect_timeout,
            },
            _ => Self::Tcp { connect_timeout },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tcp { .. } => "tcp",
            Self::Postgres { .. } => "postgres",
        }
    }
}

impl Probe for Prober {
    fn probe(&self, ip: IpAddr, port: u16) -> ProbeOutcome {
        match self {
            Self::Tcp { connect_timeout } => tcp::probe(ip, port, *connect_timeout),
            Self::Postgres {
                credentials,
                connect_timeout,
            } => pg::probe(ip, port, credentials, *connect_timeout),
        }
    }
}
