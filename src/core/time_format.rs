//! Timestamp and duration formatting
//!
//! Timestamps are rendered by the textual sinks; durations are rendered
//! once, when a duration annotation is appended to a message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timestamp format used by the textual sinks.
///
/// # Examples
///
/// ```
/// use rust_secure_logger::core::TimestampFormat;
/// use chrono::Utc;
///
/// let format = TimestampFormat::Iso8601;
/// assert!(format.format(&Utc::now()).ends_with('Z'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// `2025-01-08T10:30:45+00:00`
    Rfc3339,

    /// Seconds since the epoch
    Unix,

    /// Milliseconds since the epoch
    UnixMillis,

    /// Any strftime-compatible format string
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, TimestampFormat::Unix | TimestampFormat::UnixMillis)
    }
}

/// Render a duration compactly for message annotations.
///
/// | input          | output     |
/// |----------------|------------|
/// | 850 µs         | `850µs`    |
/// | 230 ms         | `230ms`    |
/// | 1 500 ms       | `1.5s`     |
/// | 123 s          | `2m 3s`    |
/// | 3 723 s        | `1h 2m 3s` |
/// | 2 days 5 min   | `2d 0h 5m` |
pub fn format_compact_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis == 0 {
        return format!("{}µs", duration.as_micros());
    }
    if millis < 1_000 {
        return format!("{}ms", millis);
    }

    let total_secs = duration.as_secs();
    if total_secs < 60 {
        let tenths = (millis % 1_000) / 100;
        return if tenths == 0 {
            format!("{}s", total_secs)
        } else {
            format!("{}.{}s", total_secs, tenths)
        };
    }

    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else {
        format!("{}m {}s", minutes, seconds)
    }
}
