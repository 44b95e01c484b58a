//! Logging infrastructure for diagram construction
//!
//! This module provides structured logging using the `tracing` crate.
//! It supports configurable log levels and formats. Output always goes to
//! stderr so that DOT text written to stdout stays machine-readable.
//!
//! # Usage
//!
//! ```rust,no_run
//! use erdwright::core::logging::init_logging;
//!
//! // Initialize with default settings
//! init_logging(None, None).unwrap();
//! ```
//!
//! # Log Formats
//!
//! - `compact`: Single-line format, good for production
//! - `pretty`: Multi-line format with colors, good for development
//! - `json`: JSON format, good for log aggregation systems
//!
//! # Environment Variables
//!
//! Checked before the values passed to [`init_logging`], first match wins:
//!
//! - `ERDWRIGHT_LOG_LEVEL`: level or filter directive (trace|debug|info|warn|error|off)
//! - `RUST_LOG`: standard `tracing-subscriber` filter directive
//! - `ERDWRIGHT_LOG_FORMAT`: log format (compact|pretty|json)
//!
//! # Filtering Logs
//!
//! ```bash
//! # Traversal details only
//! RUST_LOG="erdwright::core::builder=trace" erdwright dot shop.Order
//! ```

use std::str::FromStr;

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

const LEVEL_VARS: &[&str] = &["ERDWRIGHT_LOG_LEVEL", "RUST_LOG"];
const FORMAT_VAR: &str = "ERDWRIGHT_LOG_FORMAT";
const DEFAULT_LEVEL: &str = "info";

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact single-line format
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Filter directive and format a subscriber is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub filter: String,
    pub format: LogFormat,
}

impl LogSettings {
    /// Resolve settings from the process environment
    ///
    /// `level` and `format` are used only when no environment variable is set.
    pub fn from_env_or(level: Option<&str>, format: Option<&str>) -> Result<Self, String> {
        Self::resolve(|key| std::env::var(key).ok(), level, format)
    }

    /// Resolve settings with `lookup` standing in for the environment
    pub fn resolve<F>(lookup: F, level: Option<&str>, format: Option<&str>) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let filter = LEVEL_VARS
            .iter()
            .filter_map(|key| lookup(key))
            .find(|value| !value.trim().is_empty())
            .or_else(|| level.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string());

        let format = match lookup(FORMAT_VAR).filter(|value| !value.trim().is_empty()) {
            Some(value) => value.parse()?,
            None => format.map(LogFormat::from_str).transpose()?.unwrap_or(LogFormat::Compact),
        };

        Ok(Self { filter, format })
    }
}

/// Initialize the global tracing subscriber
///
/// Settings come from [`LogSettings::from_env_or`]. Logs are written to
/// stderr. Fails if the format or filter is invalid, or a global subscriber
/// is already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings =
        LogSettings::from_env_or(level, format).map_err(|e| format!("Invalid log format: {}", e))?;
    install(&settings)
}

/// Initialize logging with default settings (info level, compact format)
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}

fn install(settings: &LogSettings) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_new(&settings.filter)
        .map_err(|e| format!("Invalid log filter '{}': {}", settings.filter, e))?;

    let layer = match settings.format {
        LogFormat::Compact => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_writer(std::io::stderr)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::ACTIVE)
            .pretty()
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;
    Ok(())
}
