//! Serializable logging configuration
//!
//! Every field has a default, so a config file only names what it changes:
//!
//! ```json
//! {
//!   "text_level": "DEBUG",
//!   "store_level": "WARN",
//!   "suppressed_fatal_markers": ["5039"],
//!   "text_sink": { "kind": "file", "path": "/var/log/app.log", "max_backups": 3 }
//! }
//! ```

use super::{
    error::{LoggerError, Result},
    log_level::LogLevel,
    output_format::OutputFormat,
    redaction::REDACTED_PLACEHOLDER,
    sink::Appender,
    state::{LoggingStateBuilder, DEFAULT_SUPPRESSED_FATAL_MARKER},
    time_format::TimestampFormat,
};
use crate::appenders::{ConsoleAppender, RollingFileAppender, RotationPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_MAX_BACKUPS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Threshold of the textual sink (and of the fallback writer before
    /// initialization)
    pub text_level: LogLevel,
    /// Threshold of the persistent event store
    pub store_level: LogLevel,
    /// Fatal events whose message contains one of these are not escalated
    /// to audit
    pub suppressed_fatal_markers: Vec<String>,
    pub dev_debug: bool,
    /// Applied when a state is built; a running state keeps its placeholder
    pub redaction_placeholder: String,
    pub report_sink_failures: bool,
    pub text_sink: TextSinkConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            text_level: LogLevel::Info,
            store_level: LogLevel::Info,
            suppressed_fatal_markers: vec![DEFAULT_SUPPRESSED_FATAL_MARKER.to_string()],
            dev_debug: false,
            redaction_placeholder: REDACTED_PLACEHOLDER.to_string(),
            report_sink_failures: true,
            text_sink: TextSinkConfig::default(),
        }
    }
}

/// Which textual sink to wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextSinkConfig {
    Console(ConsoleConfig),
    File(RollingFileConfig),
    None,
}

impl Default for TextSinkConfig {
    fn default() -> Self {
        TextSinkConfig::Console(ConsoleConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub colors: bool,
    pub timestamp_format: TimestampFormat,
    pub output_format: OutputFormat,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            colors: true,
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingFileConfig {
    pub path: PathBuf,
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,
    #[serde(default)]
    pub compress: bool,
    #[serde(default)]
    pub timestamp_format: TimestampFormat,
    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_max_bytes() -> u64 {
    DEFAULT_MAX_BYTES
}

fn default_max_backups() -> usize {
    DEFAULT_MAX_BACKUPS
}

impl RollingFileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_bytes: DEFAULT_MAX_BYTES,
            max_backups: DEFAULT_MAX_BACKUPS,
            compress: false,
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::default(),
        }
    }

    pub fn policy(&self) -> RotationPolicy {
        RotationPolicy::new()
            .with_max_size(self.max_bytes)
            .with_max_backups(self.max_backups)
            .with_compression(self.compress)
    }
}

impl TextSinkConfig {
    /// Open the configured sink. `None` yields no sink.
    pub fn build(&self) -> Result<Option<Arc<dyn Appender>>> {
        let sink: Arc<dyn Appender> = match self {
            TextSinkConfig::Console(console) => Arc::new(
                ConsoleAppender::with_colors(console.colors)
                    .with_timestamp_format(console.timestamp_format.clone())
                    .with_output_format(console.output_format),
            ),
            TextSinkConfig::File(file) => Arc::new(
                RollingFileAppender::with_policy(&file.path, file.policy())?
                    .with_timestamp_format(file.timestamp_format.clone())
                    .with_output_format(file.output_format),
            ),
            TextSinkConfig::None => return Ok(None),
        };
        Ok(Some(sink))
    }
}

impl LoggingConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LoggingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading logging configuration",
                format!("Failed to read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.redaction_placeholder.is_empty() {
            return Err(LoggerError::config(
                "redaction_placeholder",
                "placeholder must not be empty",
            ));
        }

        if self.suppressed_fatal_markers.iter().any(|m| m.is_empty()) {
            return Err(LoggerError::config(
                "suppressed_fatal_markers",
                "an empty marker would match every message",
            ));
        }

        if let TextSinkConfig::File(file) = &self.text_sink {
            if file.path.as_os_str().is_empty() {
                return Err(LoggerError::config("text_sink.path", "path must not be empty"));
            }
            if file.max_bytes == 0 {
                return Err(LoggerError::config(
                    "text_sink.max_bytes",
                    "max_bytes must be greater than zero",
                ));
            }
        }

        Ok(())
    }
}

impl LoggingStateBuilder {
    /// Builder preloaded from `config`. Opens the configured textual sink.
    pub fn from_config(config: &LoggingConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = LoggingStateBuilder::new()
            .text_threshold(config.text_level)
            .store_threshold(config.store_level)
            .suppressed_markers(config.suppressed_fatal_markers.iter().cloned())
            .dev_debug(config.dev_debug)
            .report_sink_failures(config.report_sink_failures)
            .redaction_placeholder(config.redaction_placeholder.clone());

        if let Some(sink) = config.text_sink.build()? {
            builder = builder.shared_text_sink(sink);
        }
        Ok(builder)
    }
}
