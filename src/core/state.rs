//! Process-wide logging state
//!
//! One [`LoggingState`] is created by the host at startup and handed (as an
//! `Arc`) to everything that needs a [`Logger`]. The sink set, thresholds and
//! lifecycle phase live in an immutable [`SinkSnapshot`]; every
//! reconfiguration builds a new snapshot and swaps it in whole, so a reader
//! never sees half of an update. Loggers take one snapshot per call and use
//! it for both the admission check and the dispatch.

use super::{
    config::LoggingConfig,
    dispatcher::SinkDispatcher,
    error::Result,
    fallback::{FallbackWriter, MemoryWriter},
    log_event::LogEvent,
    log_level::LogLevel,
    logger::Logger,
    metrics::LoggerMetrics,
    redaction::RedactionFilter,
    sink::{Appender, AuditClient, EventStore},
};
use crate::appenders::NullAppender;
use parking_lot::RwLock;
use std::sync::Arc;

/// Marker withheld from audit escalation unless configured otherwise.
pub const DEFAULT_SUPPRESSED_FATAL_MARKER: &str = "5039";

/// Lifecycle of the logging state.
///
/// `Uninitialized -> Initialized` is one-way; `Disabled` is terminal and
/// can be entered from either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Only the raw fallback writer receives events.
    Uninitialized,
    /// Events go to the configured sinks.
    Initialized,
    /// Everything is silenced until the process restarts.
    Disabled,
}

/// Immutable view of the sink configuration.
#[derive(Clone)]
pub struct SinkSnapshot {
    pub(crate) phase: LifecyclePhase,
    pub(crate) text_sink: Option<Arc<dyn Appender>>,
    pub(crate) text_threshold: LogLevel,
    pub(crate) event_store: Option<Arc<dyn EventStore>>,
    pub(crate) store_threshold: LogLevel,
    pub(crate) audit: Option<Arc<dyn AuditClient>>,
    pub(crate) suppressed_markers: Arc<[String]>,
    pub(crate) dev_debug: bool,
    pub(crate) report_sink_failures: bool,
}

impl SinkSnapshot {
    fn initial() -> Self {
        Self {
            phase: LifecyclePhase::Uninitialized,
            text_sink: None,
            text_threshold: LogLevel::Info,
            event_store: None,
            store_threshold: LogLevel::Info,
            audit: None,
            suppressed_markers: Arc::from(vec![DEFAULT_SUPPRESSED_FATAL_MARKER.to_string()]),
            dev_debug: false,
            report_sink_failures: true,
        }
    }

    fn disabled() -> Self {
        Self {
            phase: LifecyclePhase::Disabled,
            text_sink: Some(Arc::new(NullAppender)),
            event_store: None,
            audit: None,
            ..Self::initial()
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn text_threshold(&self) -> LogLevel {
        self.text_threshold
    }

    pub fn store_threshold(&self) -> LogLevel {
        self.store_threshold
    }

    pub fn has_text_sink(&self) -> bool {
        self.text_sink.is_some()
    }

    pub fn has_event_store(&self) -> bool {
        self.event_store.is_some()
    }

    pub fn has_audit_client(&self) -> bool {
        self.audit.is_some()
    }

    pub fn suppressed_markers(&self) -> &[String] {
        &self.suppressed_markers
    }

    pub fn dev_debug(&self) -> bool {
        self.dev_debug
    }

    /// Whether the textual sink (or, before initialization, the fallback
    /// writer standing in for it) admits `level`.
    #[inline]
    pub(crate) fn text_admits(&self, level: LogLevel) -> bool {
        match self.phase {
            LifecyclePhase::Uninitialized => level.is_admitted_by(self.text_threshold),
            LifecyclePhase::Initialized => {
                self.text_sink.is_some() && level.is_admitted_by(self.text_threshold)
            }
            LifecyclePhase::Disabled => false,
        }
    }

    #[inline]
    pub(crate) fn store_admits(&self, level: LogLevel, store_disabled: bool) -> bool {
        match self.phase {
            LifecyclePhase::Initialized => {
                !store_disabled
                    && self.event_store.is_some()
                    && level.is_admitted_by(self.store_threshold)
            }
            LifecyclePhase::Uninitialized | LifecyclePhase::Disabled => false,
        }
    }

    /// Admission gate: true iff at least one sink this handle may use
    /// admits `level`. Constant work, no allocation.
    #[inline]
    pub fn admits(&self, level: LogLevel, store_disabled: bool) -> bool {
        self.text_admits(level) || self.store_admits(level, store_disabled)
    }

    /// First suppressed marker contained in `message`, if any.
    pub(crate) fn suppressed_marker_in(&self, message: &str) -> Option<&str> {
        self.suppressed_markers
            .iter()
            .find(|m| !m.is_empty() && message.contains(m.as_str()))
            .map(String::as_str)
    }
}

impl std::fmt::Debug for SinkSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkSnapshot")
            .field("phase", &self.phase)
            .field("text_sink", &self.text_sink.as_ref().map(|s| s.name().to_string()))
            .field("text_threshold", &self.text_threshold)
            .field("event_store", &self.event_store.as_ref().map(|s| s.name().to_string()))
            .field("store_threshold", &self.store_threshold)
            .field("audit", &self.audit.as_ref().map(|a| a.name().to_string()))
            .field("suppressed_markers", &self.suppressed_markers)
            .field("dev_debug", &self.dev_debug)
            .finish()
    }
}

/// Process-wide logging context.
///
/// # Example
///
/// ```
/// use rust_secure_logger::prelude::*;
///
/// let state = LoggingState::builder()
///     .text_sink(ConsoleAppender::with_colors(false))
///     .text_threshold(LogLevel::Debug)
///     .build();
///
/// let logger = state.get_logger("startup");
/// logger.info(|| "wiring services");     // goes to the fallback writer
///
/// state.mark_initialized();
/// logger.info(|| "ready");               // goes to the console sink
/// ```
pub struct LoggingState {
    snapshot: RwLock<Arc<SinkSnapshot>>,
    fallback: FallbackWriter,
    redaction: RedactionFilter,
    metrics: LoggerMetrics,
}

impl LoggingState {
    /// State with no sinks, writing to standard error until initialized.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::builder().build()
    }

    #[must_use]
    pub fn builder() -> LoggingStateBuilder {
        LoggingStateBuilder::new()
    }

    /// Logger for `topic` using every configured sink.
    pub fn get_logger(self: &Arc<Self>, topic: impl Into<String>) -> Logger {
        Logger::new(Arc::clone(self), topic.into(), false)
    }

    /// Logger for `topic` that never writes to the persistent store, e.g.
    /// for the store's own diagnostics.
    pub fn get_logger_without_store(self: &Arc<Self>, topic: impl Into<String>) -> Logger {
        Logger::new(Arc::clone(self), topic.into(), true)
    }

    /// Current snapshot. Cheap: one reference-count increment.
    #[inline]
    pub fn snapshot(&self) -> Arc<SinkSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    #[inline]
    pub(crate) fn admits(&self, level: LogLevel, store_disabled: bool) -> bool {
        self.snapshot.read().admits(level, store_disabled)
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.snapshot.read().phase
    }

    pub fn is_initialized(&self) -> bool {
        self.phase() == LifecyclePhase::Initialized
    }

    pub fn is_disabled(&self) -> bool {
        self.phase() == LifecyclePhase::Disabled
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn fallback(&self) -> &FallbackWriter {
        &self.fallback
    }

    pub fn redaction(&self) -> &RedactionFilter {
        &self.redaction
    }

    /// Replace the snapshot with an edited copy. Ignored once disabled.
    fn update(&self, edit: impl FnOnce(&mut SinkSnapshot)) {
        let mut current = self.snapshot.write();
        if current.phase == LifecyclePhase::Disabled {
            return;
        }
        let mut next = SinkSnapshot::clone(&current);
        edit(&mut next);
        *current = Arc::new(next);
    }

    /// Switch from the fallback writer to the configured sinks.
    ///
    /// Called once by the host after its own startup completes; further
    /// calls are no-ops.
    pub fn mark_initialized(&self) {
        self.update(|s| {
            if s.phase == LifecyclePhase::Uninitialized {
                s.phase = LifecyclePhase::Initialized;
            }
        });
    }

    /// Silence everything for the rest of the process lifetime.
    ///
    /// All sinks are replaced by a null sink; later reconfiguration is
    /// ignored.
    pub fn disable_all_logging(&self) {
        let mut current = self.snapshot.write();
        let mut disabled = SinkSnapshot::disabled();
        disabled.suppressed_markers = Arc::clone(&current.suppressed_markers);
        *current = Arc::new(disabled);
    }

    pub fn attach_text_sink<A: Appender + 'static>(&self, sink: A) {
        self.attach_shared_text_sink(Arc::new(sink));
    }

    pub fn attach_shared_text_sink(&self, sink: Arc<dyn Appender>) {
        self.update(|s| s.text_sink = Some(sink));
    }

    pub fn detach_text_sink(&self) {
        self.update(|s| s.text_sink = None);
    }

    /// Attach the persistent store with its own minimum level.
    pub fn attach_event_store<S: EventStore + 'static>(&self, store: S, min_level: LogLevel) {
        self.attach_shared_event_store(Arc::new(store), min_level);
    }

    pub fn attach_shared_event_store(&self, store: Arc<dyn EventStore>, min_level: LogLevel) {
        self.update(|s| {
            s.event_store = Some(store);
            s.store_threshold = min_level;
        });
    }

    pub fn detach_event_store(&self) {
        self.update(|s| s.event_store = None);
    }

    pub fn attach_audit_client<C: AuditClient + 'static>(&self, client: C) {
        self.attach_shared_audit_client(Arc::new(client));
    }

    pub fn attach_shared_audit_client(&self, client: Arc<dyn AuditClient>) {
        self.update(|s| s.audit = Some(client));
    }

    pub fn detach_audit_client(&self) {
        self.update(|s| s.audit = None);
    }

    pub fn set_text_threshold(&self, level: LogLevel) {
        self.update(|s| s.text_threshold = level);
    }

    pub fn set_store_threshold(&self, level: LogLevel) {
        self.update(|s| s.store_threshold = level);
    }

    /// Replace the set of markers that keep a fatal event out of audit.
    pub fn set_suppressed_markers<I, S>(&self, markers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let markers: Vec<String> = markers.into_iter().map(Into::into).collect();
        self.update(|s| s.suppressed_markers = Arc::from(markers));
    }

    pub fn set_dev_debug(&self, enabled: bool) {
        self.update(|s| s.dev_debug = enabled);
    }

    pub fn set_report_sink_failures(&self, enabled: bool) {
        self.update(|s| s.report_sink_failures = enabled);
    }

    /// Apply thresholds, markers, flags and the textual sink from `config`
    /// in one snapshot replacement. The attached store and audit client
    /// are kept; the redaction placeholder is fixed at build time.
    pub fn apply_config(&self, config: &LoggingConfig) -> Result<()> {
        config.validate()?;
        let text_sink = config.text_sink.build()?;
        let markers: Arc<[String]> = Arc::from(config.suppressed_fatal_markers.clone());

        self.update(|s| {
            s.text_sink = text_sink;
            s.text_threshold = config.text_level;
            s.store_threshold = config.store_level;
            s.suppressed_markers = markers;
            s.dev_debug = config.dev_debug;
            s.report_sink_failures = config.report_sink_failures;
        });
        Ok(())
    }

    /// Deliver an already-built event using `snapshot`.
    pub(crate) fn dispatch(&self, snapshot: &SinkSnapshot, event: &LogEvent, store_disabled: bool) {
        SinkDispatcher::new(snapshot, &self.fallback, &self.metrics).dispatch(event, store_disabled);
    }

    /// Flush the textual sink.
    pub fn flush(&self) -> Result<()> {
        match &self.snapshot().text_sink {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for LoggingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingState")
            .field("snapshot", &*self.snapshot.read())
            .finish_non_exhaustive()
    }
}

/// Builder for [`LoggingState`]
///
/// # Example
/// ```
/// use rust_secure_logger::prelude::*;
///
/// let state = LoggingState::builder()
///     .text_threshold(LogLevel::Trace)
///     .event_store(MemoryEventStore::new(1000), LogLevel::Info)
///     .suppressed_markers(["5039", "known-benign"])
///     .initialized(true)
///     .build();
///
/// assert!(state.is_initialized());
/// ```
pub struct LoggingStateBuilder {
    snapshot: SinkSnapshot,
    fallback: Option<FallbackWriter>,
    redaction: RedactionFilter,
    initialized: bool,
}

impl LoggingStateBuilder {
    pub fn new() -> Self {
        Self {
            snapshot: SinkSnapshot::initial(),
            fallback: None,
            redaction: RedactionFilter::new(),
            initialized: false,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn text_sink<A: Appender + 'static>(mut self, sink: A) -> Self {
        self.snapshot.text_sink = Some(Arc::new(sink));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared_text_sink(mut self, sink: Arc<dyn Appender>) -> Self {
        self.snapshot.text_sink = Some(sink);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn text_threshold(mut self, level: LogLevel) -> Self {
        self.snapshot.text_threshold = level;
        self
    }

    /// Threshold of the event store, when one is attached later.
    #[must_use = "builder methods return a new value"]
    pub fn store_threshold(mut self, level: LogLevel) -> Self {
        self.snapshot.store_threshold = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn event_store<S: EventStore + 'static>(mut self, store: S, min_level: LogLevel) -> Self {
        self.snapshot.event_store = Some(Arc::new(store));
        self.snapshot.store_threshold = min_level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared_event_store(mut self, store: Arc<dyn EventStore>, min_level: LogLevel) -> Self {
        self.snapshot.event_store = Some(store);
        self.snapshot.store_threshold = min_level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn audit_client<C: AuditClient + 'static>(mut self, client: C) -> Self {
        self.snapshot.audit = Some(Arc::new(client));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared_audit_client(mut self, client: Arc<dyn AuditClient>) -> Self {
        self.snapshot.audit = Some(client);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn suppressed_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let markers: Vec<String> = markers.into_iter().map(Into::into).collect();
        self.snapshot.suppressed_markers = Arc::from(markers);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn dev_debug(mut self, enabled: bool) -> Self {
        self.snapshot.dev_debug = enabled;
        self
    }

    /// Whether sink failures are reported on the fallback writer.
    #[must_use = "builder methods return a new value"]
    pub fn report_sink_failures(mut self, enabled: bool) -> Self {
        self.snapshot.report_sink_failures = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn fallback_writer(mut self, writer: FallbackWriter) -> Self {
        self.fallback = Some(writer);
        self
    }

    /// Route the fallback channel into `memory`.
    #[must_use = "builder methods return a new value"]
    pub fn fallback_memory(self, memory: &MemoryWriter) -> Self {
        self.fallback_writer(FallbackWriter::new(memory.clone()))
    }

    #[must_use = "builder methods return a new value"]
    pub fn redaction_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.redaction = self.redaction.with_placeholder(placeholder);
        self
    }

    /// Start in the initialized phase, for hosts that wire sinks up front.
    #[must_use = "builder methods return a new value"]
    pub fn initialized(mut self, initialized: bool) -> Self {
        self.initialized = initialized;
        self
    }

    pub fn build(self) -> Arc<LoggingState> {
        let mut snapshot = self.snapshot;
        if self.initialized {
            snapshot.phase = LifecyclePhase::Initialized;
        }

        Arc::new(LoggingState {
            snapshot: RwLock::new(Arc::new(snapshot)),
            fallback: self.fallback.unwrap_or_default(),
            redaction: self.redaction,
            metrics: LoggerMetrics::new(),
        })
    }
}

impl Default for LoggingStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
