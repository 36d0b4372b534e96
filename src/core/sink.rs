//! Sink traits: the three delivery targets of an admitted event
//!
//! Sinks are shared by every thread that logs, so each method takes `&self`
//! and implementations guard their own state. A call is treated as a
//! blocking, thread-safe unit of work.

use super::{actor::SessionLabel, error::Result, log_event::LogEvent};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Textual sink: console, plain file or rolling file.
pub trait Appender: Send + Sync {
    fn append(&self, event: &LogEvent) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

/// Append-only persistent event store.
///
/// The minimum-level gate lives in the logging state, not in the store;
/// retention and compaction are the store's own business.
pub trait EventStore: Send + Sync {
    fn write_event(&self, event: &LogEvent) -> Result<()>;

    fn name(&self) -> &str {
        "event-store"
    }
}

/// Kinds of system event the logging core submits to the audit service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventKind {
    FatalEvent,
}

impl AuditEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventKind::FatalEvent => "FATAL_EVENT",
        }
    }
}

impl fmt::Display for AuditEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit collaborator receiving escalated fatal events.
pub trait AuditClient: Send + Sync {
    fn submit_system_event(
        &self,
        actor: &SessionLabel,
        kind: AuditEventKind,
        payload: &str,
    ) -> Result<()>;

    fn name(&self) -> &str {
        "audit"
    }
}
