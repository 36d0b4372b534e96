//! Console appender implementation

use crate::core::{Appender, LogEvent, LogLevel, OutputFormat, Result, TimestampFormat};
#[cfg(feature = "console")]
use colored::Colorize;
use std::io::Write;

pub struct ConsoleAppender {
    use_colors: bool,
    timestamp_format: TimestampFormat,
    output_format: OutputFormat,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self::with_colors(cfg!(feature = "console"))
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::default(),
        }
    }

    /// Set the output format for this appender
    ///
    /// # Example
    ///
    /// ```
    /// use rust_secure_logger::appenders::ConsoleAppender;
    /// use rust_secure_logger::OutputFormat;
    ///
    /// let appender = ConsoleAppender::new()
    ///     .with_output_format(OutputFormat::Json);
    /// ```
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set the timestamp format for this appender
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_secure_logger::appenders::ConsoleAppender;
    /// use rust_secure_logger::TimestampFormat;
    ///
    /// let appender = ConsoleAppender::new()
    ///     .with_timestamp_format(TimestampFormat::Iso8601Micros);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Set a custom timestamp format using a strftime-compatible format string
    #[must_use]
    pub fn with_custom_timestamp(mut self, format_str: &str) -> Self {
        self.timestamp_format = TimestampFormat::Custom(format_str.to_string());
        self
    }

    /// Format as text with optional colors
    fn format_text(&self, event: &LogEvent) -> String {
        format!(
            "{} {} {} {}",
            self.timestamp_format.format(&event.timestamp()),
            self.level_label(event.level()),
            event.topic(),
            event.enhanced_message()
        )
    }

    #[cfg(feature = "console")]
    fn level_label(&self, level: LogLevel) -> String {
        let label = format!("{:5}", level.to_str());
        if self.use_colors {
            label.color(level.color_code()).to_string()
        } else {
            label
        }
    }

    #[cfg(not(feature = "console"))]
    fn level_label(&self, level: LogLevel) -> String {
        format!("{:5}", level.to_str())
    }

    pub fn uses_colors(&self) -> bool {
        self.use_colors
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&self, event: &LogEvent) -> Result<()> {
        let output = match self.output_format {
            OutputFormat::Text => self.format_text(event),
            OutputFormat::Json | OutputFormat::Logfmt => {
                self.output_format.format(event, &self.timestamp_format)
            }
        };

        // Route Error and Fatal levels to stderr, others to stdout
        match event.level() {
            LogLevel::Error | LogLevel::Fatal => writeln!(std::io::stderr().lock(), "{}", output)?,
            LogLevel::Trace | LogLevel::Debug | LogLevel::Info | LogLevel::Warn => {
                writeln!(std::io::stdout().lock(), "{}", output)?
            }
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_layout() {
        let appender = ConsoleAppender::with_colors(false);
        let event = LogEvent::new(LogLevel::Warn, "net", "retrying");
        let line = appender.format_text(&event);
        assert!(line.ends_with("WARN  net retrying"), "got {}", line);
    }

    #[test]
    fn test_append_succeeds() {
        let appender = ConsoleAppender::with_colors(false).with_output_format(OutputFormat::Json);
        assert!(appender.append(&LogEvent::new(LogLevel::Info, "t", "hello")).is_ok());
        assert!(appender.flush().is_ok());
    }
}
