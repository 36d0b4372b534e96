//! File appender implementation

use crate::core::{Appender, LogEvent, LoggerError, OutputFormat, Result, TimestampFormat};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct FileAppender {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
    timestamp_format: TimestampFormat,
    output_format: OutputFormat,
}

impl FileAppender {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "opening log file",
                    format!("Failed to open '{}'", path.display()),
                    e,
                )
            })?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::default(),
        })
    }

    /// Set the timestamp format for this appender
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rust_secure_logger::appenders::FileAppender;
    /// use rust_secure_logger::TimestampFormat;
    ///
    /// let appender = FileAppender::new("/var/log/app.log")
    ///     .unwrap()
    ///     .with_timestamp_format(TimestampFormat::Rfc3339);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Appender for FileAppender {
    fn append(&self, event: &LogEvent) -> Result<()> {
        let mut output = self.output_format.format(event, &self.timestamp_format);
        output.push('\n');

        self.writer.lock().write_all(output.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.writer.get_mut().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use tempfile::tempdir;

    #[test]
    fn test_writes_one_line_per_event() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let appender = FileAppender::new(&path).unwrap();

        appender.append(&LogEvent::new(LogLevel::Info, "db", "connected")).unwrap();
        appender.append(&LogEvent::new(LogLevel::Error, "db", "lost")).unwrap();
        appender.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("INFO  db connected"));
        assert!(lines[1].ends_with("ERROR db lost"));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let result = FileAppender::new(dir.path().join("missing").join("app.log"));
        assert!(matches!(result, Err(LoggerError::IoOperation { .. })));
    }
}
