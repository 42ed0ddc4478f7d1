//! Logging configuration and initialization
//!
//! Centralized logging setup for all DataMirror binaries. Supports
//! console and daily-rotated file output, text or JSON formatting, and
//! environment-based configuration.
//!
//! Use the structured logging macros (`trace!`, `debug!`, `info!`,
//! `warn!`, `error!`) instead of `println!` in library code.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Log level for filtering messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert to tracing Level
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(anyhow::anyhow!("Invalid log level: {}", s)),
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: LogLevel,

    /// Log format (text or JSON)
    pub format: LogFormat,

    /// Directory for log files; `None` disables file output
    pub log_dir: Option<PathBuf>,

    /// Log file name prefix (e.g., "mirror-server" -> "mirror-server.2026-01-18.log")
    pub log_file_prefix: String,

    /// Additional filter directives (e.g., "tower_http=debug,axum=trace")
    pub filter_directives: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Text,
            log_dir: None,
            log_file_prefix: "mirror".to_string(),
            filter_directives: None,
        }
    }
}

impl LogConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `MIRROR_LOG_LEVEL`: log level (trace, debug, info, warn, error)
    /// - `MIRROR_LOG_FORMAT`: log format (text, json)
    /// - `MIRROR_LOG_DIR`: directory for log files (enables file output)
    /// - `MIRROR_LOG_FILE_PREFIX`: prefix for log files
    /// - `MIRROR_LOG_FILTER`: additional filter directives
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("MIRROR_LOG_LEVEL") {
            config.level = level.parse()?;
        }

        if let Ok(format) = std::env::var("MIRROR_LOG_FORMAT") {
            config.format = format.parse()?;
        }

        if let Ok(dir) = std::env::var("MIRROR_LOG_DIR") {
            config.log_dir = Some(PathBuf::from(dir));
        }

        if let Ok(prefix) = std::env::var("MIRROR_LOG_FILE_PREFIX") {
            config.log_file_prefix = prefix;
        }

        if let Ok(filter) = std::env::var("MIRROR_LOG_FILTER") {
            config.filter_directives = Some(filter);
        }

        Ok(config)
    }

    /// Set the minimum log level
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the log file prefix
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_file_prefix = prefix.into();
        self
    }

    /// Set additional filter directives
    pub fn with_filter_directives(mut self, filter: impl Into<String>) -> Self {
        self.filter_directives = Some(filter.into());
        self
    }
}

/// Initialize logging with the given configuration
///
/// Sets up the global tracing subscriber; call once at application startup.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let mut filter =
        EnvFilter::from_default_env().add_directive(config.level.to_tracing_level().into());

    if let Some(ref directives) = config.filter_directives {
        for directive in directives.split(',') {
            filter = filter.add_directive(
                directive
                    .parse()
                    .context("Failed to parse filter directive")?,
            );
        }
    }

    match &config.log_dir {
        None => match config.format {
            LogFormat::Text => {
                let console_layer = fmt::layer()
                    .with_writer(std::io::stdout)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE);
                tracing_subscriber::registry()
                    .with(filter)
                    .with(console_layer)
                    .try_init()?;
            },
            LogFormat::Json => {
                let console_layer = fmt::layer()
                    .with_writer(std::io::stdout)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE);
                tracing_subscriber::registry()
                    .with(filter)
                    .with(console_layer.json())
                    .try_init()?;
            },
        },
        Some(dir) => {
            std::fs::create_dir_all(dir).context("Failed to create log directory")?;

            let file_appender = tracing_appender::rolling::daily(dir, &config.log_file_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // The guard must outlive the program for buffered writes to flush.
            std::mem::forget(guard);

            match config.format {
                LogFormat::Text => {
                    let console_layer = fmt::layer()
                        .with_writer(std::io::stdout)
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE);
                    let file_layer = fmt::layer()
                        .with_writer(non_blocking)
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_ansi(false);
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(console_layer)
                        .with(file_layer)
                        .try_init()?;
                },
                LogFormat::Json => {
                    let console_layer = fmt::layer()
                        .with_writer(std::io::stdout)
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE);
                    let file_layer = fmt::layer()
                        .with_writer(non_blocking)
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_ansi(false);
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(console_layer.json())
                        .with(file_layer.json())
                        .try_init()?;
                },
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("invalid".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("invalid".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Text);
        assert!(config.log_dir.is_none());
        assert_eq!(config.log_file_prefix, "mirror");
    }

    #[test]
    fn test_config_builders() {
        let config = LogConfig::default()
            .with_level(LogLevel::Debug)
            .with_file_prefix("mirror-cli")
            .with_filter_directives("tower_http=debug");

        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.log_file_prefix, "mirror-cli");
        assert_eq!(config.filter_directives.as_deref(), Some("tower_http=debug"));
    }
}
