//! # Rust Secure Logger
//!
//! Structured logging core with secret redaction, per-sink thresholds and
//! audit escalation of fatal events.
//!
//! ## Features
//!
//! - **Lazy**: messages are closures, evaluated only when a sink admits the level
//! - **Redacting**: the acting session's secret never reaches a sink
//! - **Isolated sinks**: a failing or panicking sink never affects the caller or other sinks
//! - **Snapshot configuration**: reconfiguration swaps the whole sink set atomically
//! - **Synchronous**: no logging thread, no queue, no reordering
//!
//! ## Quick start
//!
//! ```
//! use rust_secure_logger::prelude::*;
//!
//! let state = LoggingState::builder()
//!     .text_sink(ConsoleAppender::with_colors(false))
//!     .event_store(MemoryEventStore::new(1000), LogLevel::Warn)
//!     .audit_client(MemoryAuditTrail::new())
//!     .build();
//!
//! let logger = state.get_logger("startup");
//! logger.info(|| "wiring services");
//! state.mark_initialized();
//! logger.warn(|| "cache cold");
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{
        ConsoleAppender, FileAppender, JsonAuditTrail, JsonEventStore, MemoryAuditTrail,
        MemoryEventStore, NullAppender, RollingFileAppender, RotationPolicy,
    };
    pub use crate::core::{
        ActorContext, Appendable, Appender, AuditClient, AuditEventKind, CapturedFailure,
        ErrorDescription, EventStore, LogEvent, LogLevel, Logger, LoggerError, LoggingConfig,
        LoggingState, LoggingStateBuilder, MemoryWriter, OutputFormat, Result, SecretValue,
        SessionLabel, StreamAppender, TimestampFormat,
    };
}

pub use appenders::{ConsoleAppender, FileAppender, RollingFileAppender};
pub use core::{
    ActorContext, Appendable, Appender, AuditClient, AuditEventKind, CapturedFailure,
    ErrorDescription, EventBuilder, EventStore, FallbackWriter, LifecyclePhase, LogEvent, LogLevel,
    Logger, LoggerError, LoggerMetrics, LoggingConfig, LoggingState, LoggingStateBuilder,
    MemoryWriter, OutputFormat, Result, SecretValue, SessionLabel, StreamAppender,
    TimestampFormat,
};
