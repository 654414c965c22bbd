use anyhow::Context;
use freizeit_libs::SchedulerConfig;
use log::LevelFilter;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub scheduler: SchedulerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of off, error, warn, info, debug, trace
    pub level: Option<String>,
}

impl Config {
    /// `-v` flags win over the configured level, which wins over `warn`.
    pub fn level(&self, verbosity: u8) -> anyhow::Result<LevelFilter> {
        let configured = match &self.logging.level {
            Some(level) => LevelFilter::from_str(level)
                .with_context(|| format!("unknown log level {:?}", level))?,
            None => LevelFilter::Warn,
        };

        Ok(match verbosity {
            0 => configured,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}
