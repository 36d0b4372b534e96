//! Persistent, append-only event stores

use crate::core::{EventStore, LogEvent, LoggerError, Result};
#[cfg(feature = "file")]
use fs2::FileExt;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Event store writing one JSON object per line.
///
/// The file is locked exclusively for as long as the store is open, so two
/// processes can never interleave writes into the same store.
///
/// # Example
///
/// ```no_run
/// use rust_secure_logger::prelude::*;
///
/// let store = JsonEventStore::open("/var/lib/app/events.jsonl").unwrap();
/// let state = LoggingState::builder()
///     .event_store(store, LogLevel::Warn)
///     .initialized(true)
///     .build();
/// ```
pub struct JsonEventStore {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonEventStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "opening event store",
                    format!("Failed to open '{}'", path.display()),
                    e,
                )
            })?;

        #[cfg(feature = "file")]
        file.try_lock_exclusive()
            .map_err(|_| LoggerError::store_locked(path.display().to_string()))?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every event back from a store file. Blank lines are skipped.
    pub fn read_events(path: impl AsRef<Path>) -> Result<Vec<LogEvent>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            LoggerError::io_operation(
                "reading event store",
                format!("Failed to open '{}'", path.display()),
                e,
            )
        })?;

        let mut events = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            events.push(serde_json::from_str(&line)?);
        }
        Ok(events)
    }
}

impl EventStore for JsonEventStore {
    fn write_event(&self, event: &LogEvent) -> Result<()> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        // One write per event keeps each line whole
        self.file.lock().write_all(line.as_bytes())?;
        Ok(())
    }

    fn name(&self) -> &str {
        "json-event-store"
    }
}

impl Drop for JsonEventStore {
    fn drop(&mut self) {
        let file = self.file.get_mut();
        let _ = file.flush();
        #[cfg(feature = "file")]
        let _ = FileExt::unlock(&*file);
    }
}

/// Bounded in-memory event store; the oldest event is evicted first.
///
/// Meant for embedding and tests.
#[derive(Debug)]
pub struct MemoryEventStore {
    capacity: usize,
    events: Mutex<VecDeque<LogEvent>>,
}

impl MemoryEventStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            events: Mutex::new(VecDeque::with_capacity(capacity.clamp(1, 1024))),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy of the retained events, oldest first.
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventStore for MemoryEventStore {
    fn write_event(&self, event: &LogEvent) -> Result<()> {
        let mut events = self.events.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory-event-store"
    }
}
