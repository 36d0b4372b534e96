//! Audit collaborators: where escalated fatal events end up

use crate::core::{AuditClient, AuditEventKind, LoggerError, Result, SessionLabel};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// One submitted system event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub actor: SessionLabel,
    pub kind: AuditEventKind,
    /// The submitted payload, kept as JSON when it parses as JSON.
    pub payload: serde_json::Value,
}

impl AuditRecord {
    pub fn new(actor: &SessionLabel, kind: AuditEventKind, payload: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            actor: actor.clone(),
            kind,
            payload: serde_json::from_str(payload)
                .unwrap_or_else(|_| serde_json::Value::String(payload.to_string())),
        }
    }
}

/// Audit collaborator appending one JSON record per line to a file.
pub struct JsonAuditTrail {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonAuditTrail {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "opening audit trail",
                    format!("Failed to open '{}'", path.display()),
                    e,
                )
            })?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<AuditRecord>> {
        let file = File::open(path.as_ref())?;
        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if !line.trim().is_empty() {
                records.push(serde_json::from_str(&line)?);
            }
        }
        Ok(records)
    }
}

impl AuditClient for JsonAuditTrail {
    fn submit_system_event(
        &self,
        actor: &SessionLabel,
        kind: AuditEventKind,
        payload: &str,
    ) -> Result<()> {
        let mut line = serde_json::to_string(&AuditRecord::new(actor, kind, payload))?;
        line.push('\n');
        let mut file = self.file.lock();
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "json-audit-trail"
    }
}

/// Audit collaborator that keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditTrail {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl AuditClient for MemoryAuditTrail {
    fn submit_system_event(
        &self,
        actor: &SessionLabel,
        kind: AuditEventKind,
        payload: &str,
    ) -> Result<()> {
        self.records.lock().push(AuditRecord::new(actor, kind, payload));
        Ok(())
    }

    fn name(&self) -> &str {
        "memory-audit-trail"
    }
}
