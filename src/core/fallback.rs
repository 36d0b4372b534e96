//! Raw fallback writer
//!
//! The channel used before the host finishes initialization, and the place
//! where the logging core reports its own trouble (a failing sink, a
//! producer that panicked). Each line is written under a lock so concurrent
//! reports never interleave mid-line.

use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Severity tag of an internal diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Warning,
    Error,
    Critical,
}

impl DiagnosticKind {
    fn tag(&self) -> &'static str {
        match self {
            DiagnosticKind::Warning => "[LOGGER WARNING]",
            DiagnosticKind::Error => "[LOGGER ERROR]",
            DiagnosticKind::Critical => "[LOGGER CRITICAL]",
        }
    }
}

pub struct FallbackWriter {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl FallbackWriter {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Fallback writer backed by the process's standard error stream.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Fallback writer that discards everything.
    pub fn sink() -> Self {
        Self::new(io::sink())
    }

    /// Write one line. Failures are ignored: there is nowhere left to
    /// report them.
    pub fn write_line(&self, line: &str) {
        let mut writer = self.writer.lock();
        let _ = write_terminated(&mut **writer, line);
    }

    /// Write an internal diagnostic line, e.g.
    /// `[LOGGER ERROR] sink 'file' failed: disk full`.
    pub fn report(&self, kind: DiagnosticKind, message: &str) {
        self.write_line(&format!("{} {}", kind.tag(), message));
    }
}

fn write_terminated(writer: &mut dyn Write, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

impl Default for FallbackWriter {
    fn default() -> Self {
        Self::stderr()
    }
}

impl std::fmt::Debug for FallbackWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackWriter").finish_non_exhaustive()
    }
}

/// In-memory writer whose clones share one buffer.
///
/// Handy as a fallback writer when the output has to be inspected, e.g. in
/// embedded hosts or tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
