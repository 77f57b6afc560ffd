use std::io::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;
use env_logger::{Builder, Target};
use log::LevelFilter;
use serde::Deserialize;

/// Log verbosity accepted on the command line and in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    #[value(name = "FATAL")]
    Fatal,
    #[value(name = "ERROR")]
    Error,
    #[default]
    #[value(name = "WARN")]
    Warn,
    #[value(name = "INFO")]
    Info,
    #[value(name = "DEBUG")]
    Debug,
}

impl LogLevel {
    /// Nothing logs above `error`, so `FATAL` silences logging entirely.
    pub fn filter(self) -> LevelFilter {
        match self {
            Self::Fatal => LevelFilter::Off,
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
        }
    }
}

/// Install the global logger: `<timestamp> <LEVEL> <message>` on stdout.
/// `RUST_LOG`, when set, refines the filter.
pub fn init(level: LogLevel) -> Result<()> {
    Builder::new()
        .filter_level(level.filter())
        .parse_default_env()
        .target(Target::Stdout)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {} {}",
                buf.timestamp_millis(),
                record.level(),
                record.args()
            )
        })
        .try_init()
        .context("failed to initialise logger")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_map_to_filters() {
        assert_eq!(LogLevel::Fatal.filter(), LevelFilter::Off);
        assert_eq!(LogLevel::Warn.filter(), LevelFilter::Warn);
        assert_eq!(LogLevel::Debug.filter(), LevelFilter::Debug);
        assert_eq!(LogLevel::default(), LogLevel::Warn);
    }

    #[test]
    fn parses_uppercase_names_from_yaml() {
        let level: LogLevel = serde_yaml::from_str("DEBUG").unwrap();
        assert_eq!(level, LogLevel::Debug);
        assert!(serde_yaml::from_str::<LogLevel>("verbose").is_err());
    }
}
