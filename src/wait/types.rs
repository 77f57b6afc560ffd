use std::fmt;
use std::time::Duration;

use anyhow::{Result, bail};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(200);

/// How long a container may report "not running" before the wait gives up.
/// Covers containers that are still being created when polling starts.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// What to wait for and how patiently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    container: String,
    port: u16,
    timeout: Duration,
    interval: Duration,
    grace_period: Duration,
}

impl ProbeTarget {
    pub fn new(
        container: impl Into<String>,
        port: u16,
        timeout: Duration,
        interval: Duration,
        grace_period: Duration,
    ) -> Result<Self> {
        let container = container.into();
        if container.trim().is_empty() {
            bail!("container name must not be empty");
        }
        if interval.is_zero() {
            bail!("poll interval must be greater than zero");
        }
        Ok(Self {
            container,
            port,
            timeout,
            interval,
            grace_period,
        })
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }
}

/// Terminal state of a wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready,
    ContainerDown { container: String },
    TimedOut { port: u16 },
    RuntimeUnreachable(String),
    Interrupted,
}

impl WaitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for WaitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("ready"),
            Self::ContainerDown { container } => write!(f, "Container not running: {container}"),
            Self::TimedOut { port } => write!(f, "Timed out waiting for port {port} to open."),
            Self::RuntimeUnreachable(reason) => f.write_str(reason),
            Self::Interrupted => f.write_str("Interrupted."),
        }
    }
}
