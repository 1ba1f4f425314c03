//! Logging configuration and initialization
//!
//! Centralized tracing setup for all catalog components. Supports console
//! and/or daily-rotated file output, text or JSON formats, and fine-grained
//! filter directives, all configurable from the environment.
//!
//! Use the structured macros (`trace!` .. `error!`) with fields rather than
//! `println!`:
//!
//! ```rust,ignore
//! tracing::info!(task_id = %task_id, rows = processed, "batch flushed");
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::error::{CatalogError, Result};

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
    /// Convert to a tracing [`Level`]
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(CatalogError::Parse(format!("invalid log level: {other}"))),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output target for logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Console,
    File,
    Both,
}

impl LogOutput {
    fn to_console(self) -> bool {
        matches!(self, LogOutput::Console | LogOutput::Both)
    }

    fn to_file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

impl std::str::FromStr for LogOutput {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "console" | "stdout" => Ok(LogOutput::Console),
            "file" => Ok(LogOutput::File),
            "both" | "all" => Ok(LogOutput::Both),
            other => Err(CatalogError::Parse(format!("invalid log output: {other}"))),
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(CatalogError::Parse(format!("invalid log format: {other}"))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: LogLevel,

    /// Output target (console, file, or both)
    pub output: LogOutput,

    /// Log format (text or JSON)
    pub format: LogFormat,

    /// Directory for log files (only used when output includes file)
    pub log_dir: PathBuf,

    /// Log file name prefix (e.g., "catalog-server" -> "catalog-server.2025-03-01.log")
    pub log_file_prefix: String,

    /// Additional filter directives (e.g., "sqlx=warn,tower_http=debug")
    pub filter_directives: Option<String>,

    /// Whether to include module targets in logs
    pub include_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            output: LogOutput::Console,
            format: LogFormat::Text,
            log_dir: PathBuf::from("./logs"),
            log_file_prefix: "catalog".to_string(),
            filter_directives: None,
            include_targets: true,
        }
    }
}

impl LogConfig {
    /// Load configuration from environment variables
    ///
    /// Recognized variables: `LOG_LEVEL`, `LOG_OUTPUT`, `LOG_FORMAT`,
    /// `LOG_DIR`, `LOG_FILE_PREFIX`, `LOG_FILTER`, `LOG_INCLUDE_TARGETS`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.level = level.parse()?;
        }
        if let Ok(output) = std::env::var("LOG_OUTPUT") {
            config.output = output.parse()?;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            config.format = format.parse()?;
        }
        if let Ok(dir) = std::env::var("LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }
        if let Ok(prefix) = std::env::var("LOG_FILE_PREFIX") {
            config.log_file_prefix = prefix;
        }
        if let Ok(filter) = std::env::var("LOG_FILTER") {
            config.filter_directives = Some(filter);
        }
        if let Ok(val) = std::env::var("LOG_INCLUDE_TARGETS") {
            config.include_targets = val.parse().unwrap_or(true);
        }

        Ok(config)
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder::default()
    }
}

/// Builder for [`LogConfig`]
#[derive(Default)]
pub struct LogConfigBuilder {
    config: LogConfig,
}

impl LogConfigBuilder {
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.config.output = output;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.log_dir = dir.into();
        self
    }

    pub fn log_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.log_file_prefix = prefix.into();
        self
    }

    pub fn filter_directives(mut self, filter: impl Into<String>) -> Self {
        self.config.filter_directives = Some(filter.into());
        self
    }

    pub fn build(self) -> LogConfig {
        self.config
    }
}

/// Initialize the global tracing subscriber
///
/// Call once at application startup, before any log output.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let mut filter =
        EnvFilter::from_default_env().add_directive(config.level.to_tracing_level().into());

    if let Some(ref directives) = config.filter_directives {
        for directive in directives.split(',') {
            let parsed = directive.trim().parse().map_err(|_| {
                CatalogError::Config(format!("invalid log filter directive: {directive}"))
            })?;
            filter = filter.add_directive(parsed);
        }
    }

    let console = if config.output.to_console() {
        Some(console_layer(config))
    } else {
        None
    };

    let file = if config.output.to_file() {
        Some(file_layer(config)?)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| CatalogError::Config(format!("failed to install subscriber: {e}")))?;

    Ok(())
}

fn console_layer<S>(config: &LogConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(config.include_targets)
        .with_span_events(FmtSpan::CLOSE);

    match config.format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

fn file_layer<S>(config: &LogConfig) -> Result<Box<dyn Layer<S> + Send + Sync>>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    std::fs::create_dir_all(&config.log_dir)?;

    let appender = tracing_appender::rolling::daily(&config.log_dir, &config.log_file_prefix);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // The guard flushes the writer on drop; it must live as long as the
    // process, so it is intentionally leaked here.
    std::mem::forget(guard);

    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(config.include_targets)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(false);

    Ok(match config.format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_output_from_str() {
        assert_eq!("stdout".parse::<LogOutput>().unwrap(), LogOutput::Console);
        assert_eq!("file".parse::<LogOutput>().unwrap(), LogOutput::File);
        assert_eq!("all".parse::<LogOutput>().unwrap(), LogOutput::Both);
        assert!("syslog".parse::<LogOutput>().is_err());
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_output_targets() {
        assert!(LogOutput::Console.to_console());
        assert!(!LogOutput::Console.to_file());
        assert!(LogOutput::Both.to_console());
        assert!(LogOutput::Both.to_file());
    }

    #[test]
    fn test_config_builder() {
        let config = LogConfig::builder()
            .level(LogLevel::Debug)
            .output(LogOutput::File)
            .format(LogFormat::Json)
            .log_dir("/var/log/catalog")
            .log_file_prefix("test")
            .filter_directives("sqlx=warn")
            .build();

        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.output, LogOutput::File);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/catalog"));
        assert_eq!(config.log_file_prefix, "test");
        assert_eq!(config.filter_directives.as_deref(), Some("sqlx=warn"));
    }
}
