//! Sink dispatch with per-sink failure isolation
//!
//! Delivery order is fixed:
//!
//! 1. textual sink (the raw fallback writer before initialization)
//! 2. persistent event store
//! 3. audit escalation, for `FATAL` only
//!
//! Every sink call runs inside its own boundary: an `Err` or a panic is
//! counted, optionally reported on the fallback writer, and then forgotten.
//! Nothing a sink does can reach the caller or skip a later sink.

use super::{
    actor::SessionLabel,
    error::Result,
    fallback::{DiagnosticKind, FallbackWriter},
    log_event::LogEvent,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    sink::AuditEventKind,
    state::{LifecyclePhase, SinkSnapshot},
};
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Audit payload for an escalated fatal event.
#[derive(Debug, Serialize)]
struct FatalEventPayload<'a> {
    level: LogLevel,
    actor: Option<&'a str>,
    source: Option<&'a str>,
    topic: &'a str,
    #[serde(rename = "errorMessage")]
    error_message: &'a str,
}

/// Routes one event to the sinks of one snapshot.
pub struct SinkDispatcher<'a> {
    snapshot: &'a SinkSnapshot,
    fallback: &'a FallbackWriter,
    metrics: &'a LoggerMetrics,
}

impl<'a> SinkDispatcher<'a> {
    pub fn new(
        snapshot: &'a SinkSnapshot,
        fallback: &'a FallbackWriter,
        metrics: &'a LoggerMetrics,
    ) -> Self {
        Self {
            snapshot,
            fallback,
            metrics,
        }
    }

    /// Deliver `event` to every sink that admits it.
    pub fn dispatch(&self, event: &LogEvent, store_disabled: bool) {
        let level = event.level();

        match self.snapshot.phase {
            LifecyclePhase::Disabled => return,
            LifecyclePhase::Uninitialized => {
                if self.snapshot.text_admits(level) {
                    self.fallback.write_line(&event.to_log_string());
                    self.metrics.record_fallback_write();
                    self.metrics.record_dispatched();
                }
                return;
            }
            LifecyclePhase::Initialized => {}
        }

        self.metrics.record_dispatched();

        if self.snapshot.text_admits(level) {
            if let Some(sink) = &self.snapshot.text_sink {
                self.isolate(sink.name(), || sink.append(event));
            }
        }

        if self.snapshot.store_admits(level, store_disabled) {
            if let Some(store) = &self.snapshot.event_store {
                self.isolate(store.name(), || store.write_event(event));
            }
        }

        if level == LogLevel::Fatal {
            self.escalate(event);
        }
    }

    /// Submit a fatal event to the audit collaborator unless its message
    /// carries a suppressed marker.
    fn escalate(&self, event: &LogEvent) {
        if self.snapshot.suppressed_marker_in(event.message()).is_some() {
            self.metrics.record_audit_suppression();
            return;
        }

        let Some(audit) = &self.snapshot.audit else {
            return;
        };

        let delivered = self.isolate(audit.name(), || {
            let payload = serde_json::to_string(&FatalEventPayload {
                level: event.level(),
                actor: event.username(),
                source: event.source_address(),
                topic: event.topic(),
                error_message: event.message(),
            })?;
            audit.submit_system_event(&SessionLabel::system(), AuditEventKind::FatalEvent, &payload)
        });

        if delivered {
            self.metrics.record_audit_submission();
        }
    }

    /// Run one sink call behind its own failure boundary.
    ///
    /// Returns whether the call succeeded.
    fn isolate(&self, sink: &str, call: impl FnOnce() -> Result<()>) -> bool {
        match panic::catch_unwind(AssertUnwindSafe(call)) {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                self.metrics.record_sink_failure();
                if self.snapshot.report_sink_failures {
                    self.fallback
                        .report(DiagnosticKind::Error, &format!("sink '{}' failed: {}", sink, e));
                }
                false
            }
            Err(panic_info) => {
                self.metrics.record_sink_panic();
                if self.snapshot.report_sink_failures {
                    self.fallback.report(
                        DiagnosticKind::Critical,
                        &format!(
                            "sink '{}' panicked: {}. Other sinks continue to function.",
                            sink,
                            panic_message(panic_info.as_ref())
                        ),
                    );
                }
                false
            }
        }
    }
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
