use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;

use crate::config::Config;
use crate::docker::DEFAULT_RUNTIME;
use crate::logging::LogLevel;
use crate::probe::{Credentials, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PG_DATABASE, DEFAULT_PG_USER};
use crate::wait::{DEFAULT_GRACE_PERIOD, DEFAULT_INTERVAL, ProbeTarget};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "wait-for-port",
    version,
    about = "Tries to connect to a docker container's port until it succeeds or times out.",
    long_about = "Tries to connect to a docker container's port until it succeeds or times out. \
                  In addition, extra checks are made depending on the port: \
                  5432: a postgres connection attempt is made."
)]
pub struct Cli {
    /// Container name
    #[arg(long)]
    pub container: String,

    /// TCP port to check
    #[arg(long)]
    pub port: u16,

    /// Timeout in seconds
    #[arg(long)]
    pub timeout: u64,

    /// Interval between checks, in seconds [default: 0.2]
    #[arg(long)]
    pub interval: Option<f64>,

    /// Set the log level [default: WARN]
    #[arg(long, value_enum, ignore_case = true)]
    pub loglevel: Option<LogLevel>,

    /// Seconds before a stopped container counts as failed [default: 5]
    #[arg(long = "grace-period")]
    pub grace_period: Option<f64>,

    /// Seconds allowed for each connection attempt [default: 1]
    #[arg(long = "connect-timeout")]
    pub connect_timeout: Option<f64>,

    /// Postgres username
    #[arg(long = "pg_user")]
    pub pg_user: Option<String>,

    /// Postgres password
    #[arg(long = "pg_password")]
    pub pg_password: Option<String>,

    /// Postgres database
    #[arg(long = "pg_database")]
    pub pg_database: Option<String>,
}

/// Everything `main` needs, with flags, config file and defaults merged.
#[derive(Debug, Clone)]
pub struct Settings {
    pub target: ProbeTarget,
    pub credentials: Credentials,
    pub log_level: LogLevel,
    pub runtime: String,
    pub connect_timeout: Duration,
}

impl Cli {
    /// Merge flags over `cfg`; flags win, then config, then built-in defaults.
    pub fn resolve(&self, cfg: &Config) -> Result<Settings> {
        let interval = seconds("--interval", self.interval.or(cfg.interval), DEFAULT_INTERVAL)?;
        let grace_period = seconds(
            "--grace-period",
            self.grace_period.or(cfg.grace_period),
            DEFAULT_GRACE_PERIOD,
        )?;
        let connect_timeout = seconds(
            "--connect-timeout",
            self.connect_timeout.or(cfg.connect_timeout),
            DEFAULT_CONNECT_TIMEOUT,
        )?;
        if connect_timeout.is_zero() {
            bail!("--connect-timeout must be greater than zero");
        }

        let target = ProbeTarget::new(
            self.container.clone(),
            self.port,
            Duration::from_secs(self.timeout),
            interval,
            grace_period,
        )?;

        Ok(Settings {
            target,
            credentials: self.credentials(cfg),
            log_level: self.loglevel.or(cfg.loglevel).unwrap_or_default(),
            runtime: cfg
                .runtime
                .clone()
                .unwrap_or_else(|| DEFAULT_RUNTIME.to_string()),
            connect_timeout,
        })
    }

    // Empty flags fall through, as if they were not given.
    fn credentials(&self, cfg: &Config) -> Credentials {
        let pick = |flag: &Option<String>, file: &Option<String>, default: &str| {
            flag.iter()
                .chain(file.iter())
                .find(|v| !v.is_empty())
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        Credentials {
            database: pick(&self.pg_database, &cfg.postgres.database, DEFAULT_PG_DATABASE),
            user: pick(&self.pg_user, &cfg.postgres.user, DEFAULT_PG_USER),
            password: pick(&self.pg_password, &cfg.postgres.password, ""),
        }
    }
}

fn seconds(flag: &str, value: Option<f64>, default: Duration) -> Result<Duration> {
    match value {
        None => Ok(default),
        Some(secs) => match Duration::try_from_secs_f64(secs) {
            Ok(d) => Ok(d),
            Err(_) => bail!("{flag} must be a non-negative number of seconds, got {secs}"),
        },
    }
}
