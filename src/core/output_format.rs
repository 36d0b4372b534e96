//! Output format configuration for textual sinks
//!
//! Provides different renderings of a log event:
//! - Text: Human-readable format (default)
//! - Json: Machine-readable JSON format, one object per line
//! - Logfmt: Key-value format compatible with log aggregation tools

use super::log_event::LogEvent;
use super::time_format::TimestampFormat;
use serde::{Deserialize, Serialize};

/// Output format for log events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text format (default)
    ///
    /// Example: `2025-01-08T10:30:45.123Z INFO  auth {s-1,jdoe} login ok`
    #[default]
    Text,

    /// JSON format for machine processing
    ///
    /// Example: `{"timestamp":"2025-01-08T10:30:45.123Z","level":"INFO","topic":"auth","message":"login ok"}`
    Json,

    /// Logfmt format (key=value pairs)
    ///
    /// Example: `timestamp=2025-01-08T10:30:45.123Z level=INFO topic=auth message="login ok"`
    Logfmt,
}

impl OutputFormat {
    /// Format a log event according to this output format
    pub fn format(&self, event: &LogEvent, timestamp_format: &TimestampFormat) -> String {
        match self {
            OutputFormat::Text => self.format_text(event, timestamp_format),
            OutputFormat::Json => self.format_json(event, timestamp_format),
            OutputFormat::Logfmt => self.format_logfmt(event, timestamp_format),
        }
    }

    fn format_text(&self, event: &LogEvent, timestamp_format: &TimestampFormat) -> String {
        format!(
            "{} {:5} {} {}",
            timestamp_format.format(&event.timestamp()),
            event.level().to_str(),
            event.topic(),
            event.enhanced_message()
        )
    }

    fn format_json(&self, event: &LogEvent, timestamp_format: &TimestampFormat) -> String {
        let mut json_obj = serde_json::Map::new();

        json_obj.insert(
            "timestamp".to_string(),
            self.format_timestamp_json(event, timestamp_format),
        );
        json_obj.insert(
            "level".to_string(),
            serde_json::Value::String(event.level().to_str().to_string()),
        );
        json_obj.insert(
            "topic".to_string(),
            serde_json::Value::String(event.topic().to_string()),
        );
        json_obj.insert(
            "message".to_string(),
            serde_json::Value::String(event.message().to_string()),
        );

        if let Some(actor) = event.actor() {
            if let Ok(value) = serde_json::to_value(actor) {
                json_obj.insert("actor".to_string(), value);
            }
        }
        if let Some(cause) = event.cause() {
            if let Ok(value) = serde_json::to_value(cause) {
                json_obj.insert("cause".to_string(), value);
            }
        }

        serde_json::to_string(&serde_json::Value::Object(json_obj)).unwrap_or_default()
    }

    /// Numeric timestamp formats stay numbers in JSON output
    fn format_timestamp_json(
        &self,
        event: &LogEvent,
        timestamp_format: &TimestampFormat,
    ) -> serde_json::Value {
        match timestamp_format {
            TimestampFormat::Unix => serde_json::Value::Number(event.timestamp().timestamp().into()),
            TimestampFormat::UnixMillis => {
                serde_json::Value::Number(event.timestamp().timestamp_millis().into())
            }
            _ => serde_json::Value::String(timestamp_format.format(&event.timestamp())),
        }
    }

    fn format_logfmt(&self, event: &LogEvent, timestamp_format: &TimestampFormat) -> String {
        let mut parts = Vec::with_capacity(8);

        parts.push(format!(
            "timestamp={}",
            self.escape_logfmt_value(&timestamp_format.format(&event.timestamp()))
        ));
        parts.push(format!("level={}", event.level().to_str()));
        parts.push(format!("topic={}", self.escape_logfmt_value(event.topic())));

        // Message is always quoted
        parts.push(format!("message={}", self.quote_logfmt_value(event.message())));

        if let Some(actor) = event.actor() {
            if let Some(ref session_id) = actor.session_id {
                parts.push(format!("session={}", self.escape_logfmt_value(session_id)));
            }
            if let Some(ref username) = actor.username {
                parts.push(format!("actor={}", self.escape_logfmt_value(username)));
            }
            if let Some(ref source) = actor.source_address {
                parts.push(format!("source={}", self.escape_logfmt_value(source)));
            }
        }

        if let Some(cause) = event.cause() {
            parts.push(format!("cause={}", self.quote_logfmt_value(&cause.to_string())));
        }

        parts.join(" ")
    }

    /// Quote a logfmt value if it contains spaces or separators
    fn escape_logfmt_value(&self, value: &str) -> String {
        if value.is_empty() || value.contains(' ') || value.contains('"') || value.contains('=') {
            self.quote_logfmt_value(value)
        } else {
            value.to_string()
        }
    }

    fn quote_logfmt_value(&self, value: &str) -> String {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}
