//! Sink implementations

pub mod audit_trail;
pub mod console;
pub mod event_store;
pub mod file;
pub mod null;
pub mod rolling_file;

pub use audit_trail::{AuditRecord, JsonAuditTrail, MemoryAuditTrail};
pub use console::ConsoleAppender;
pub use event_store::{JsonEventStore, MemoryEventStore};
pub use file::FileAppender;
pub use null::NullAppender;
pub use rolling_file::{RollingFileAppender, RotationPolicy, RotationStrategy};

pub use crate::core::{Appender, AuditClient, EventStore};
