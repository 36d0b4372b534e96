//! Rolling file appender
//!
//! Writes the textual rendering of each event to a file and rolls it over
//! to numbered backups (`app.log.1`, `app.log.2`, ...), optionally gzipped
//! (`app.log.1.gz`).

use crate::core::{Appender, LogEvent, LoggerError, OutputFormat, Result, TimestampFormat};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const COMPRESSION_CHUNK: usize = 64 * 1024;
const MAX_DELETION_FAILURES: usize = 5;

/// When to roll the active file over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationStrategy {
    /// Roll once the file reaches `max_bytes`
    Size { max_bytes: u64 },
    /// Roll when `interval` has passed since the last rollover
    Time { interval: Duration },
    /// Never roll; for externally managed files
    Never,
}

impl Default for RotationStrategy {
    fn default() -> Self {
        RotationStrategy::Size {
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Configuration for [`RollingFileAppender`]
///
/// # Examples
///
/// ```
/// use rust_secure_logger::appenders::{RotationPolicy, RotationStrategy};
///
/// let policy = RotationPolicy::new()
///     .with_max_size(50 * 1024 * 1024)
///     .with_max_backups(7)
///     .with_compression(true);
///
/// assert_eq!(policy.strategy, RotationStrategy::Size { max_bytes: 50 * 1024 * 1024 });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    pub strategy: RotationStrategy,
    /// Maximum number of rolled files to keep
    pub max_backup_files: usize,
    /// Whether to gzip rolled files
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            strategy: RotationStrategy::default(),
            max_backup_files: 5,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_strategy(mut self, strategy: RotationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Shorthand for `with_strategy(RotationStrategy::Size { max_bytes: size })`
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, size: u64) -> Self {
        self.strategy = RotationStrategy::Size { max_bytes: size };
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backup_files = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }
}

struct ActiveFile {
    writer: Option<BufWriter<File>>,
    current_size: u64,
    last_rotation: SystemTime,
    deletion_failure_count: usize,
}

/// Textual sink writing to a file that rolls over by size or age.
///
/// # Examples
///
/// ```no_run
/// use rust_secure_logger::appenders::{RollingFileAppender, RotationPolicy};
///
/// let policy = RotationPolicy::new().with_max_size(1024 * 1024).with_max_backups(3);
/// let appender = RollingFileAppender::with_policy("/var/log/app.log", policy).unwrap();
/// ```
pub struct RollingFileAppender {
    base_path: PathBuf,
    policy: RotationPolicy,
    active: Mutex<ActiveFile>,
    timestamp_format: TimestampFormat,
    output_format: OutputFormat,
}

impl RollingFileAppender {
    /// Open `path` with the default policy (10 MB, 5 backups).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default())
    }

    /// Open `path`, creating its parent directory if needed.
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if let Some(parent) = base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "creating log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size, last_rotation) = open_active(&base_path)?;

        Ok(Self {
            base_path,
            policy,
            active: Mutex::new(ActiveFile {
                writer: Some(BufWriter::new(file)),
                current_size,
                last_rotation,
                deletion_failure_count: 0,
            }),
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::default(),
        })
    }

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
        &self.base_path
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Bytes written to the active file, including what it held on open.
    pub fn current_size(&self) -> u64 {
        self.active.lock().current_size
    }

    /// Path of the `index`-th backup, uncompressed.
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let filename = self
            .base_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app.log");
        self.base_path.with_file_name(format!("{}.{}", filename, index))
    }

    fn compressed_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(".gz");
        PathBuf::from(name)
    }

    fn should_rotate(&self, active: &ActiveFile) -> bool {
        match self.policy.strategy {
            RotationStrategy::Never => false,
            RotationStrategy::Size { max_bytes } => active.current_size >= max_bytes,
            RotationStrategy::Time { interval } => {
                SystemTime::now()
                    .duration_since(active.last_rotation)
                    .unwrap_or(Duration::ZERO)
                    >= interval
            }
        }
    }

    fn rotate(&self, active: &mut ActiveFile) -> Result<()> {
        // Release the handle before renaming the file underneath it
        if let Some(mut writer) = active.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        self.remove_oldest_backup(active)?;

        for i in (1..self.policy.max_backup_files).rev() {
            let old_path = self.backup_path(i);
            let new_path = self.backup_path(i + 1);
            let old_compressed = Self::compressed_path(&old_path);

            if old_compressed.exists() {
                rename_replacing(&old_compressed, &Self::compressed_path(&new_path))?;
            } else if old_path.exists() {
                rename_replacing(&old_path, &new_path)?;
            }
        }

        if self.policy.max_backup_files > 0 && self.base_path.exists() {
            let backup = self.backup_path(1);
            fs::rename(&self.base_path, &backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to roll current log file: {}", e),
                )
            })?;

            if self.policy.compress {
                compress_file(&backup, &Self::compressed_path(&backup))?;
            }
        } else if self.base_path.exists() {
            fs::remove_file(&self.base_path).map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to truncate current log file: {}", e),
                )
            })?;
        }

        let (file, size, _) = open_active(&self.base_path)?;
        active.writer = Some(BufWriter::new(file));
        active.current_size = size;
        active.last_rotation = SystemTime::now();
        Ok(())
    }

    /// Delete the backup that would fall off the end of the window.
    fn remove_oldest_backup(&self, active: &mut ActiveFile) -> Result<()> {
        if self.policy.max_backup_files == 0 {
            return Ok(());
        }

        let oldest = self.backup_path(self.policy.max_backup_files);
        let mut failure = None;
        for path in [Self::compressed_path(&oldest), oldest] {
            if path.exists() {
                if let Err(e) = fs::remove_file(&path) {
                    failure = Some(format!("{}: {}", path.display(), e));
                }
            }
        }

        match failure {
            None => {
                active.deletion_failure_count = 0;
                Ok(())
            }
            Some(detail) => {
                active.deletion_failure_count += 1;
                if active.deletion_failure_count >= MAX_DELETION_FAILURES {
                    Err(LoggerError::file_rotation(
                        self.base_path.display().to_string(),
                        format!(
                            "Rotation aborted after {} consecutive failures to delete old backups ({})",
                            active.deletion_failure_count, detail
                        ),
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }

    fn write_line(&self, active: &mut ActiveFile, line: &[u8]) -> Result<()> {
        let writer = active.writer.as_mut().ok_or_else(|| {
            LoggerError::sink(self.name(), format!("'{}' is not open", self.base_path.display()))
        })?;
        writer.write_all(line).map_err(|e| {
            LoggerError::io_operation(
                "writing log file",
                format!("Failed to write to '{}'", self.base_path.display()),
                e,
            )
        })?;
        active.current_size += line.len() as u64;
        Ok(())
    }
}

impl Appender for RollingFileAppender {
    fn append(&self, event: &LogEvent) -> Result<()> {
        let mut line = self.output_format.format(event, &self.timestamp_format);
        line.push('\n');

        let mut active = self.active.lock();
        let mut rotation_error = None;

        if self.should_rotate(&active) {
            if let Err(e) = self.rotate(&mut active) {
                // Keep logging to the current file rather than lose events
                if active.writer.is_none() {
                    let (file, size, last_rotation) = open_active(&self.base_path)?;
                    active.writer = Some(BufWriter::new(file));
                    active.current_size = size;
                    active.last_rotation = last_rotation;
                }
                // Let the file grow past the limit instead of retrying every write
                active.current_size = 0;
                active.last_rotation = SystemTime::now();
                rotation_error = Some(e);
            }
        }

        self.write_line(&mut active, line.as_bytes())?;

        match rotation_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn flush(&self) -> Result<()> {
        if let Some(writer) = self.active.lock().writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "rolling-file"
    }
}

impl Drop for RollingFileAppender {
    fn drop(&mut self) {
        if let Some(mut writer) = self.active.get_mut().writer.take() {
            let _ = writer.flush();
        }
    }
}

fn open_active(path: &Path) -> Result<(File, u64, SystemTime)> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            LoggerError::io_operation(
                "opening log file",
                format!("Failed to open '{}'", path.display()),
                e,
            )
        })?;

    let metadata = file.metadata().map_err(|e| {
        LoggerError::io_operation(
            "reading log file metadata",
            format!("Cannot stat '{}'", path.display()),
            e,
        )
    })?;
    let last_rotation = metadata.modified().unwrap_or_else(|_| SystemTime::now());
    Ok((file, metadata.len(), last_rotation))
}

fn rename_replacing(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // Some platforms refuse to rename over an existing file
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to).map_err(|e| {
        LoggerError::file_rotation(
            from.display().to_string(),
            format!("Failed to shift backup to '{}': {}", to.display(), e),
        )
    })
}

/// Gzip `path` into `gz_path`, streaming through a temporary file.
///
/// The original is removed only after the compressed copy is complete.
fn compress_file(path: &Path, gz_path: &Path) -> Result<()> {
    let mut temp_name = gz_path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let result = (|| -> Result<()> {
        let input = File::open(path).map_err(|e| {
            LoggerError::io_operation(
                "compressing log file",
                format!("Failed to open '{}'", path.display()),
                e,
            )
        })?;
        let mut reader = BufReader::with_capacity(COMPRESSION_CHUNK, input);

        let output = File::create(&temp_path).map_err(|e| {
            LoggerError::io_operation(
                "compressing log file",
                format!("Failed to create '{}'", temp_path.display()),
                e,
            )
        })?;
        let mut encoder = flate2::write::GzEncoder::new(
            BufWriter::with_capacity(COMPRESSION_CHUNK, output),
            flate2::Compression::default(),
        );

        let mut buffer = vec![0u8; COMPRESSION_CHUNK];
        loop {
            let read = reader.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            encoder.write_all(&buffer[..read])?;
        }
        encoder.finish()?.flush()?;

        fs::rename(&temp_path, gz_path).map_err(|e| {
            LoggerError::io_operation(
                "compressing log file",
                format!("Failed to move compressed file to '{}'", gz_path.display()),
                e,
            )
        })
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
        return result;
    }

    // A leftover uncompressed copy is harmless; it is shifted out with the
    // other backups on the next rollover
    let _ = fs::remove_file(path);
    Ok(())
}
