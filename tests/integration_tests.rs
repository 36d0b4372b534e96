//! Integration tests for the logging core
//!
//! These tests verify:
//! - Level admission and lazy message production
//! - Secret redaction before any sink sees a message
//! - Audit escalation of fatal events and marker suppression
//! - Sink isolation
//! - Lifecycle: fallback writer, initialization, disabling
//! - File, rolling file and JSON store sinks end to end

use rust_secure_logger::appenders::{
    FileAppender, JsonAuditTrail, JsonEventStore, MemoryAuditTrail, MemoryEventStore,
    RollingFileAppender, RotationPolicy,
};
use rust_secure_logger::core::config::{LoggingConfig, RollingFileConfig, TextSinkConfig};
use rust_secure_logger::core::{
    ActorContext, Appender, AuditClient, AuditEventKind, CapturedFailure, EventStore, LogEvent, LogLevel,
    LoggerError, LoggingState, LoggingStateBuilder, MemoryWriter, Result, SecretValue,
    SessionLabel,
};
use parking_lot::Mutex;
use std::cell::Cell;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Textual sink recording every rendered message.
#[derive(Default)]
struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Appender for RecordingSink {
    fn append(&self, event: &LogEvent) -> Result<()> {
        self.messages.lock().push(event.message().to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Sink that fails on every call.
struct BrokenSink;

impl Appender for BrokenSink {
    fn append(&self, _event: &LogEvent) -> Result<()> {
        Err(LoggerError::other("disk unplugged"))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

/// Store that panics on every call.
struct ExplodingStore;

impl EventStore for ExplodingStore {
    fn write_event(&self, _event: &LogEvent) -> Result<()> {
        panic!("store corrupted")
    }
}

/// Audit collaborator that rejects every submission.
struct RejectingAudit;

impl AuditClient for RejectingAudit {
    fn submit_system_event(&self, _actor: &SessionLabel, _kind: AuditEventKind, _payload: &str) -> Result<()> {
        Err(LoggerError::other("audit service unreachable"))
    }

    fn name(&self) -> &str {
        "rejecting-audit"
    }
}

/// Audit collaborator that panics on every submission.
struct PanickingAudit;

impl AuditClient for PanickingAudit {
    fn submit_system_event(&self, _actor: &SessionLabel, _kind: AuditEventKind, _payload: &str) -> Result<()> {
        panic!("audit queue poisoned")
    }

    fn name(&self) -> &str {
        "panicking-audit"
    }
}

struct LoggedInUser {
    password: &'static str,
}

impl ActorContext for LoggedInUser {
    fn label(&self) -> SessionLabel {
        SessionLabel::new()
            .with_session_id("s-42")
            .with_username("jdoe")
            .with_source_address("192.0.2.7")
    }

    fn current_secret(&self) -> Result<Option<SecretValue>> {
        Ok(Some(SecretValue::from(self.password)))
    }
}

fn initialized_with(
    text: Arc<RecordingSink>,
    text_level: LogLevel,
    audit: Arc<MemoryAuditTrail>,
    memory: &MemoryWriter,
) -> Arc<LoggingState> {
    LoggingState::builder()
        .shared_text_sink(text)
        .text_threshold(text_level)
        .shared_audit_client(audit)
        .fallback_memory(memory)
        .initialized(true)
        .build()
}

#[test]
fn test_trace_below_debug_threshold_dispatches_nothing() {
    let text = Arc::new(RecordingSink::default());
    let memory = MemoryWriter::new();
    let state = initialized_with(text.clone(), LogLevel::Debug, Arc::new(MemoryAuditTrail::new()), &memory);
    let logger = state.get_logger("scenario-1");
    let produced = Cell::new(false);

    logger.trace(|| {
        produced.set(true);
        "x"
    });

    assert!(!produced.get());
    assert!(text.messages().is_empty());
    assert_eq!(state.metrics().events_dispatched(), 0);
}

#[test]
fn test_secret_redacted_in_every_sink() {
    let text = Arc::new(RecordingSink::default());
    let store = Arc::new(MemoryEventStore::new(10));
    let state = LoggingState::builder()
        .shared_text_sink(text.clone())
        .text_threshold(LogLevel::Trace)
        .shared_event_store(store.clone(), LogLevel::Trace)
        .initialized(true)
        .build();
    let logger = state.get_logger("auth");
    let user = LoggedInUser { password: "Secr3t!" };

    logger.debug_for(&user, || "login failed for Secr3t!");

    assert_eq!(text.messages(), vec!["login failed for <redacted>"]);
    let stored = store.events();
    assert_eq!(stored[0].message(), "login failed for <redacted>");
    assert_eq!(stored[0].username(), Some("jdoe"));
    assert_eq!(stored[0].source_address(), Some("192.0.2.7"));
}

#[test]
fn test_fatal_escalates_once() {
    let text = Arc::new(RecordingSink::default());
    let audit = Arc::new(MemoryAuditTrail::new());
    let memory = MemoryWriter::new();
    let state = initialized_with(text.clone(), LogLevel::Info, audit.clone(), &memory);

    state.get_logger("storage").fatal(|| "disk full");

    let records = audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, AuditEventKind::FatalEvent);
    assert!(records[0].actor.is_system());
    assert_eq!(records[0].payload["errorMessage"], "disk full");
    assert_eq!(records[0].payload["topic"], "storage");
    assert_eq!(records[0].payload["level"], "FATAL");
    assert_eq!(text.messages(), vec!["disk full"]);
}

#[test]
fn test_suppressed_marker_skips_audit_only() {
    let text = Arc::new(RecordingSink::default());
    let audit = Arc::new(MemoryAuditTrail::new());
    let memory = MemoryWriter::new();
    let state = initialized_with(text.clone(), LogLevel::Info, audit.clone(), &memory);

    state.get_logger("core").fatal(|| "internal code 5039 occurred");

    assert!(audit.is_empty());
    assert_eq!(text.messages(), vec!["internal code 5039 occurred"]);
    assert_eq!(state.metrics().audit_suppressions(), 1);
}

#[test]
fn test_custom_markers_replace_default() {
    let audit = Arc::new(MemoryAuditTrail::new());
    let state = LoggingState::builder()
        .text_sink(RecordingSink::default())
        .shared_audit_client(audit.clone())
        .suppressed_markers(["ECONNRESET"])
        .initialized(true)
        .build();
    let logger = state.get_logger("net");

    logger.fatal(|| "code 5039");
    logger.fatal(|| "peer sent ECONNRESET");

    let records = audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].payload["errorMessage"], "code 5039");
}

#[test]
fn test_fallback_before_init_then_disable_silences_everything() {
    let text = Arc::new(RecordingSink::default());
    let store = Arc::new(MemoryEventStore::new(10));
    let memory = MemoryWriter::new();
    let state = LoggingState::builder()
        .shared_text_sink(text.clone())
        .shared_event_store(store.clone(), LogLevel::Trace)
        .fallback_memory(&memory)
        .build();
    let logger = state.get_logger("boot");

    logger.info(|| "startup step 1");
    assert!(memory.contents().contains("boot startup step 1"));
    assert!(text.messages().is_empty());
    assert!(store.is_empty());

    state.disable_all_logging();
    let produced = Cell::new(false);
    for level in LogLevel::ALL {
        logger.log(level, || {
            produced.set(true);
            "after disable"
        });
    }

    assert!(!produced.get());
    assert_eq!(memory.lines().len(), 1);
    assert!(text.messages().is_empty());
    assert!(store.is_empty());
}

#[test]
fn test_events_after_init_reach_configured_sinks_only() {
    let text = Arc::new(RecordingSink::default());
    let memory = MemoryWriter::new();
    let state = LoggingState::builder()
        .shared_text_sink(text.clone())
        .fallback_memory(&memory)
        .build();
    let logger = state.get_logger("boot");

    logger.info(|| "before");
    state.mark_initialized();
    logger.info(|| "after");

    assert_eq!(text.messages(), vec!["after"]);
    assert_eq!(memory.lines().len(), 1);
    assert!(memory.contents().contains("before"));
}

#[test]
fn test_broken_sinks_are_isolated() {
    let store = Arc::new(MemoryEventStore::new(10));
    let audit = Arc::new(MemoryAuditTrail::new());
    let memory = MemoryWriter::new();
    let state = LoggingState::builder()
        .text_sink(BrokenSink)
        .shared_event_store(store.clone(), LogLevel::Info)
        .shared_audit_client(audit.clone())
        .fallback_memory(&memory)
        .initialized(true)
        .build();

    state.get_logger("t").fatal(|| "still delivered");

    assert_eq!(store.len(), 1);
    assert_eq!(audit.len(), 1);
    assert!(memory.contents().contains("[LOGGER ERROR] sink 'broken' failed: disk unplugged"));

    let exploding = LoggingState::builder()
        .text_sink(RecordingSink::default())
        .event_store(ExplodingStore, LogLevel::Info)
        .shared_audit_client(audit.clone())
        .fallback_memory(&memory)
        .initialized(true)
        .build();
    exploding.get_logger("t").fatal(|| "after panic");

    assert_eq!(audit.len(), 2);
    assert_eq!(exploding.metrics().sink_panics(), 1);
    assert!(memory.contents().contains("[LOGGER CRITICAL] sink 'event-store' panicked: store corrupted"));

    let text = Arc::new(RecordingSink::default());
    let store = Arc::new(MemoryEventStore::new(10));
    let rejected = LoggingState::builder()
        .shared_text_sink(text.clone())
        .shared_event_store(store.clone(), LogLevel::Info)
        .audit_client(RejectingAudit)
        .fallback_memory(&memory)
        .initialized(true)
        .build();
    rejected.get_logger("t").fatal(|| "audit down");

    assert_eq!(text.messages(), vec!["audit down"]);
    assert_eq!(store.len(), 1);
    assert_eq!(rejected.metrics().sink_failures(), 1);
    assert_eq!(rejected.metrics().audit_submissions(), 0);
    assert!(memory
        .contents()
        .contains("[LOGGER ERROR] sink 'rejecting-audit' failed: audit service unreachable"));

    let text = Arc::new(RecordingSink::default());
    let store = Arc::new(MemoryEventStore::new(10));
    let panicking = LoggingState::builder()
        .shared_text_sink(text.clone())
        .shared_event_store(store.clone(), LogLevel::Info)
        .audit_client(PanickingAudit)
        .fallback_memory(&memory)
        .initialized(true)
        .build();
    panicking.get_logger("t").fatal(|| "audit crashed");
    panicking.get_logger("t").warn(|| "logging continues");

    assert_eq!(text.messages(), vec!["audit crashed", "logging continues"]);
    assert_eq!(store.len(), 2);
    assert_eq!(panicking.metrics().sink_panics(), 1);
    assert_eq!(panicking.metrics().audit_submissions(), 0);
    assert!(memory
        .contents()
        .contains("[LOGGER CRITICAL] sink 'panicking-audit' panicked: audit queue poisoned"));
}

#[test]
fn test_sink_failure_reports_can_be_silenced() {
    let memory = MemoryWriter::new();
    let state = LoggingState::builder()
        .text_sink(BrokenSink)
        .report_sink_failures(false)
        .fallback_memory(&memory)
        .initialized(true)
        .build();

    state.get_logger("t").info(|| "lost");

    assert!(memory.contents().is_empty());
    assert_eq!(state.metrics().sink_failures(), 1);
}

#[test]
fn test_store_attached_at_runtime() {
    let state = LoggingState::builder()
        .text_sink(RecordingSink::default())
        .text_threshold(LogLevel::Warn)
        .initialized(true)
        .build();
    let logger = state.get_logger("late");
    assert!(!logger.is_enabled(LogLevel::Debug));

    let store = Arc::new(MemoryEventStore::new(10));
    state.attach_shared_event_store(store.clone(), LogLevel::Debug);
    assert!(logger.is_enabled(LogLevel::Debug));

    logger.debug(|| "now persisted");
    state.detach_event_store();
    logger.debug(|| "not persisted");

    assert_eq!(store.len(), 1);
}

#[test]
fn test_duration_and_cause_annotations() {
    let store = Arc::new(MemoryEventStore::new(10));
    let state = LoggingState::builder()
        .shared_event_store(store.clone(), LogLevel::Trace)
        .initialized(true)
        .build();
    let logger = state.get_logger("ldap");
    let user = LoggedInUser { password: "hunter2" };
    let err = std::io::Error::new(std::io::ErrorKind::TimedOut, "bind timed out for hunter2");

    logger
        .event(LogLevel::Warn)
        .actor(&user)
        .cause(&err)
        .duration(|| Duration::from_millis(2300))
        .log(|| "bind with hunter2 failed");

    let event = &store.events()[0];
    assert_eq!(event.message(), "bind with <redacted> failed (2.3s)");
    let cause = event.cause().expect("cause attached");
    assert_eq!(cause.kind, "Error");
    assert!(event.enhanced_message().starts_with("{s-42,jdoe,192.0.2.7} "));
}

#[test]
fn test_error_description_form() {
    let text = Arc::new(RecordingSink::default());
    let state = LoggingState::builder()
        .shared_text_sink(text.clone())
        .initialized(true)
        .build();

    state
        .get_logger("svc")
        .error_description(&CapturedFailure::new("QuotaExceeded", "tenant t1 over 10GB"));

    assert_eq!(text.messages(), vec!["QuotaExceeded: tenant t1 over 10GB"]);
}

#[test]
fn test_file_sink_keeps_one_line_per_event() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");
    let appender = Arc::new(FileAppender::new(&log_file).expect("Failed to create appender"));
    let state = LoggingState::builder()
        .shared_text_sink(appender)
        .initialized(true)
        .build();

    state
        .get_logger("web")
        .info(|| "User login\nERROR [2024-10-17] Fake error injected\nINFO Continuation");
    state.flush().expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1, "Log should be a single line, not multiple");
    assert!(lines[0].contains("User login ERROR [2024-10-17] Fake error injected INFO Continuation"));
}

#[test]
fn test_rolling_file_through_state() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("roll.log");
    let appender = RollingFileAppender::with_policy(
        &log_file,
        RotationPolicy::new().with_max_size(200).with_max_backups(2),
    )
    .expect("Failed to create appender");
    let state = LoggingState::builder()
        .text_sink(appender)
        .initialized(true)
        .build();
    let logger = state.get_logger("roll");

    for i in 0..30 {
        logger.info(|| format!("rolling message {}", i));
    }
    state.flush().expect("Failed to flush");

    assert!(temp_dir.path().join("roll.log.1").exists());
    assert!(!temp_dir.path().join("roll.log.3").exists());
}

#[test]
fn test_json_store_and_audit_trail_files() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store_path = temp_dir.path().join("events.jsonl");
    let audit_path = temp_dir.path().join("audit.jsonl");

    {
        let state = LoggingState::builder()
            .event_store(JsonEventStore::open(&store_path).expect("store"), LogLevel::Warn)
            .audit_client(JsonAuditTrail::open(&audit_path).expect("audit"))
            .initialized(true)
            .build();
        let logger = state.get_logger("billing");
        logger.info(|| "ignored by store");
        logger.warn(|| "invoice late");
        logger.fatal(|| "ledger mismatch");
    }

    let events = JsonEventStore::read_events(&store_path).expect("read events");
    let messages: Vec<_> = events.iter().map(|e| e.message()).collect();
    assert_eq!(messages, vec!["invoice late", "ledger mismatch"]);

    let records = JsonAuditTrail::read_records(&audit_path).expect("read audit");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].payload["errorMessage"], "ledger mismatch");
}

#[test]
fn test_state_from_config_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("configured.log");
    let config = LoggingConfig {
        text_level: LogLevel::Debug,
        text_sink: TextSinkConfig::File(RollingFileConfig::new(&log_file)),
        redaction_placeholder: "***".to_string(),
        ..LoggingConfig::default()
    };

    let state = LoggingStateBuilder::from_config(&config)
        .expect("valid config")
        .initialized(true)
        .build();
    let user = LoggedInUser { password: "tok-123" };
    state.get_logger("cfg").debug_for(&user, || "token tok-123 issued");
    state.flush().expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert!(content.contains("{s-42,jdoe,192.0.2.7} token *** issued"));
}
