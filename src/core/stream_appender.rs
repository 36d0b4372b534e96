//! Line-buffered writable surface backed by a logger
//!
//! Lets code that only knows how to write text (a child process's output,
//! a library printing progress) be captured line by line. Each completed
//! line becomes one event at the appender's fixed level; a trailing partial
//! line waits for the next write.

use super::{
    actor::ActorContext,
    error::{LoggerError, Result},
    log_level::LogLevel,
    logger::Logger,
};
use parking_lot::Mutex;
use std::fmt;
use std::io;
use std::ops::Range;
use std::sync::Arc;

/// Append-by-chunk interface of a character sink.
pub trait Appendable {
    fn append_str(&self, text: &str);

    fn append_char(&self, c: char) {
        let mut buf = [0u8; 4];
        self.append_str(c.encode_utf8(&mut buf));
    }

    /// Append the byte range `range` of `text`.
    ///
    /// Fails if the range is out of bounds or does not fall on character
    /// boundaries; nothing is appended in that case.
    fn append_range(&self, text: &str, range: Range<usize>) -> Result<()> {
        match text.get(range.clone()) {
            Some(part) => {
                self.append_str(part);
                Ok(())
            }
            None => Err(LoggerError::other(format!(
                "range {}..{} is not a valid slice of a {}-byte string",
                range.start,
                range.end,
                text.len()
            ))),
        }
    }
}

/// Character sink that emits one log event per completed line.
///
/// Concurrent writers to the same appender are serialized by an internal
/// lock, and every line is dispatched while that lock is held, so lines
/// reach the sinks whole and in the order they were completed.
///
/// A sink must not write back into the appender that feeds it: the lock is
/// not reentrant.
///
/// # Example
///
/// ```
/// use rust_secure_logger::prelude::*;
/// use std::fmt::Write as _;
///
/// let state = LoggingState::new();
/// let logger = state.get_logger("child-process");
/// let mut out = logger.as_appendable(LogLevel::Info, None);
///
/// write!(out, "line1\nline2").unwrap();
/// assert_eq!(out.pending(), "line2");
/// ```
pub struct StreamAppender {
    logger: Logger,
    level: LogLevel,
    actor: Option<Arc<dyn ActorContext>>,
    buffer: Mutex<Vec<u8>>,
}

impl StreamAppender {
    pub(crate) fn new(logger: Logger, level: LogLevel, actor: Option<Arc<dyn ActorContext>>) -> Self {
        Self {
            logger,
            level,
            actor,
            buffer: Mutex::new(Vec::with_capacity(256)),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// The buffered fragment not yet terminated by a newline.
    pub fn pending(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    /// Append raw bytes. Invalid UTF-8 is replaced when a line is emitted,
    /// so a multi-byte character split across two writes survives.
    pub fn append_bytes(&self, bytes: &[u8]) {
        let mut buffer = self.buffer.lock();
        buffer.extend_from_slice(bytes);

        if !bytes.contains(&b'\n') {
            return;
        }

        let mut start = 0;
        while let Some(offset) = buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let line = match &buffer[start..end] {
                [head @ .., b'\r'] => head,
                line => line,
            };
            // Empty lines are consumed without an event
            if !line.is_empty() {
                self.emit(line);
            }
            start = end + 1;
        }
        buffer.drain(..start);
    }

    fn emit(&self, line: &[u8]) {
        self.logger
            .event(self.level)
            .maybe_actor(self.actor.as_deref())
            .log(|| String::from_utf8_lossy(line));
    }
}

impl Appendable for StreamAppender {
    fn append_str(&self, text: &str) {
        self.append_bytes(text.as_bytes());
    }
}

impl fmt::Write for StreamAppender {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append_str(s);
        Ok(())
    }
}

impl fmt::Write for &StreamAppender {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append_str(s);
        Ok(())
    }
}

impl io::Write for StreamAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append_bytes(buf);
        Ok(buf.len())
    }

    /// Complete lines are dispatched on write; a partial line stays
    /// buffered until its newline arrives.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Write for &StreamAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for StreamAppender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamAppender")
            .field("topic", &self.logger.topic())
            .field("level", &self.level)
            .field("pending", &self.pending())
            .finish()
    }
}
