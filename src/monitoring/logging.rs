//! Logging setup for amlgraph.
//!
//! Installs a `tracing` subscriber writing to stdout and, optionally, a log file.

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level (most verbose)
    Trace = 0,
    /// Debug level
    Debug = 1,
    /// Info level
    Info = 2,
    /// Warning level
    Warn = 3,
    /// Error level
    Error = 4,
}

impl LogLevel {
    /// Level for a `-v` count: 0 is info, 1 debug, 2+ trace.
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    fn directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.directive().to_uppercase())
    }
}

/// Logger configuration.
#[derive(Clone, Debug)]
pub struct LoggerConfig {
    /// Minimum log level (`RUST_LOG` takes precedence when set)
    pub level: LogLevel,
    /// Also append plain-text logs to this file
    pub log_file: Option<PathBuf>,
    /// Colored stdout output
    pub ansi: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            log_file: None,
            ansi: true,
        }
    }
}

impl LoggerConfig {
    /// Filter directive for the configured level.
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.directive()))
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &LoggerConfig) -> Result<()> {
    let stdout_layer = fmt::layer().with_target(false).with_ansi(config.ansi);

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = File::create(path)?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(config.filter())
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("logger setup failed: {}", e)))
}
