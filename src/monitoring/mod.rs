//! Monitoring Module
//!
//! Logging setup for the data pipeline and CLI.

pub mod logging;

pub use logging::{init, LogLevel, LoggerConfig};
