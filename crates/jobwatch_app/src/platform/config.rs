use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use jobwatch_core::DEFAULT_EXPORT_PREFIX;
use jobwatch_engine::{EndpointError, EngineConfig};
use jobwatch_logging::{parse_level, LogDestination, LogSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "jobwatch.ron";
pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:3000";

/// Console for a job-hunting backend's live event stream.
#[derive(Parser, Debug)]
#[command(name = "jobwatch")]
#[command(version)]
pub struct Args {
    /// RON configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Backend origin, e.g. https://jobs.example.com (overrides the config file)
    #[arg(short, long, env = "JOBWATCH_ORIGIN")]
    pub origin: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LogOutput {
    Terminal,
    #[default]
    File,
    Both,
}

impl From<LogOutput> for LogDestination {
    fn from(output: LogOutput) -> Self {
        match output {
            LogOutput::Terminal => LogDestination::Terminal,
            LogOutput::File => LogDestination::File,
            LogOutput::Both => LogDestination::Both,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub origin: String,
    pub reconnect_delay_ms: u64,
    pub connect_timeout_ms: u64,
    pub probe_timeout_ms: u64,
    pub export_dir: PathBuf,
    pub export_prefix: String,
    pub log_destination: LogOutput,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            reconnect_delay_ms: 1200,
            connect_timeout_ms: 10_000,
            probe_timeout_ms: 5_000,
            export_dir: PathBuf::from("exports"),
            export_prefix: DEFAULT_EXPORT_PREFIX.to_string(),
            log_destination: LogOutput::File,
            log_file: PathBuf::from("jobwatch.log"),
            log_level: "info".to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(origin) = &args.origin {
            self.origin = origin.clone();
        }
    }

    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            destination: self.log_destination.into(),
            level: parse_level(&self.log_level),
            file: self.log_file.clone(),
        }
    }

    pub fn engine_config(&self) -> Result<EngineConfig, EndpointError> {
        let mut config = EngineConfig::from_origin(&self.origin, self.export_dir.clone())?;
        config.connection.reconnect_delay = Duration::from_millis(self.reconnect_delay_ms);
        config.connection.connect_timeout = Duration::from_millis(self.connect_timeout_ms);
        config.probe_timeout = Duration::from_millis(self.probe_timeout_ms);
        Ok(config)
    }
}
