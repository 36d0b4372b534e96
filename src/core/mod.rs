//! Core logger types and traits

pub mod actor;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event_builder;
pub mod failure;
pub mod fallback;
pub mod log_event;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod redaction;
pub mod sink;
pub mod state;
pub mod stream_appender;
pub mod time_format;

pub use actor::{ActorContext, SecretValue, SessionLabel};
pub use config::{ConsoleConfig, LoggingConfig, RollingFileConfig, TextSinkConfig};
pub use dispatcher::SinkDispatcher;
pub use error::{LoggerError, Result};
pub use event_builder::{EventBuilder, RENDER_FAILURE_MESSAGE};
pub use failure::{CapturedFailure, ErrorDescription};
pub use fallback::{DiagnosticKind, FallbackWriter, MemoryWriter};
pub use log_event::LogEvent;
pub use log_level::LogLevel;
pub use logger::Logger;
pub use metrics::LoggerMetrics;
pub use output_format::OutputFormat;
pub use redaction::{clean_non_printable, RedactionFilter, RedactionOutcome, REDACTED_PLACEHOLDER};
pub use sink::{Appender, AuditClient, AuditEventKind, EventStore};
pub use state::{
    LifecyclePhase, LoggingState, LoggingStateBuilder, SinkSnapshot, DEFAULT_SUPPRESSED_FATAL_MARKER,
};
pub use stream_appender::{Appendable, StreamAppender};
pub use time_format::{format_compact_duration, TimestampFormat};
