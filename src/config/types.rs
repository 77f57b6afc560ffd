use serde::Deserialize;

use crate::logging::LogLevel;

/// Defaults read from `.wait-for-port.yaml`. Every field is optional;
/// command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Runtime CLI to call, e.g. `docker` or `podman`.
    pub runtime: Option<String>,
    /// Seconds between polls.
    pub interval: Option<f64>,
    /// Seconds before a stopped container counts as a failure.
    pub grace_period: Option<f64>,
    /// Seconds allowed for each connect attempt.
    pub connect_timeout: Option<f64>,
    pub loglevel: Option<LogLevel>,
    pub postgres: PostgresConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostgresConfig {
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}
