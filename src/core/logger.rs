//! Topic-bound logger handles

use super::{
    actor::ActorContext,
    event_builder::EventBuilder,
    failure::ErrorDescription,
    log_level::LogLevel,
    state::LoggingState,
    stream_appender::StreamAppender,
};
use std::fmt;
use std::sync::Arc;

/// Cheap, cloneable handle bound to one topic.
///
/// Every message is passed as a producer closure. The producer runs only if
/// some sink admits the level, so a disabled call costs one snapshot read
/// and two comparisons.
///
/// # Example
///
/// ```
/// use rust_secure_logger::prelude::*;
///
/// let state = LoggingState::new();
/// let logger = state.get_logger("scheduler");
///
/// logger.info(|| "job started");
/// logger.debug(|| format!("expensive {:?}", vec![1, 2, 3])); // never built
/// ```
#[derive(Clone)]
pub struct Logger {
    state: Arc<LoggingState>,
    topic: Arc<str>,
    store_disabled: bool,
}

impl Logger {
    pub(crate) fn new(state: Arc<LoggingState>, topic: String, store_disabled: bool) -> Self {
        Self {
            state,
            topic: Arc::from(topic),
            store_disabled,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Whether this handle skips the persistent store.
    pub fn is_store_disabled(&self) -> bool {
        self.store_disabled
    }

    pub fn state(&self) -> &Arc<LoggingState> {
        &self.state
    }

    /// Admission check: true iff at least one sink this handle may use
    /// admits `level`.
    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.state.admits(level, self.store_disabled)
    }

    #[inline]
    pub fn is_trace_enabled(&self) -> bool {
        self.is_enabled(LogLevel::Trace)
    }

    #[inline]
    pub fn is_debug_enabled(&self) -> bool {
        self.is_enabled(LogLevel::Debug)
    }

    /// Start a builder for one event at `level`.
    pub fn event(&self, level: LogLevel) -> EventBuilder<'_> {
        EventBuilder::new(self, level)
    }

    pub fn log<F, M>(&self, level: LogLevel, message: F)
    where
        F: FnOnce() -> M,
        M: fmt::Display,
    {
        self.event(level).log(message);
    }

    /// Log on behalf of `actor`; the actor's current secret is redacted.
    pub fn log_for<F, M>(&self, level: LogLevel, actor: &dyn ActorContext, message: F)
    where
        F: FnOnce() -> M,
        M: fmt::Display,
    {
        self.event(level).actor(actor).log(message);
    }

    pub fn trace<F: FnOnce() -> M, M: fmt::Display>(&self, message: F) {
        self.log(LogLevel::Trace, message);
    }

    pub fn debug<F: FnOnce() -> M, M: fmt::Display>(&self, message: F) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info<F: FnOnce() -> M, M: fmt::Display>(&self, message: F) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn<F: FnOnce() -> M, M: fmt::Display>(&self, message: F) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error<F: FnOnce() -> M, M: fmt::Display>(&self, message: F) {
        self.log(LogLevel::Error, message);
    }

    /// Log at `FATAL`. Once initialized, this also escalates to the audit
    /// collaborator unless the message carries a suppressed marker.
    pub fn fatal<F: FnOnce() -> M, M: fmt::Display>(&self, message: F) {
        self.log(LogLevel::Fatal, message);
    }

    pub fn trace_for<F: FnOnce() -> M, M: fmt::Display>(&self, actor: &dyn ActorContext, message: F) {
        self.log_for(LogLevel::Trace, actor, message);
    }

    pub fn debug_for<F: FnOnce() -> M, M: fmt::Display>(&self, actor: &dyn ActorContext, message: F) {
        self.log_for(LogLevel::Debug, actor, message);
    }

    pub fn info_for<F: FnOnce() -> M, M: fmt::Display>(&self, actor: &dyn ActorContext, message: F) {
        self.log_for(LogLevel::Info, actor, message);
    }

    pub fn warn_for<F: FnOnce() -> M, M: fmt::Display>(&self, actor: &dyn ActorContext, message: F) {
        self.log_for(LogLevel::Warn, actor, message);
    }

    pub fn error_for<F: FnOnce() -> M, M: fmt::Display>(&self, actor: &dyn ActorContext, message: F) {
        self.log_for(LogLevel::Error, actor, message);
    }

    pub fn fatal_for<F: FnOnce() -> M, M: fmt::Display>(&self, actor: &dyn ActorContext, message: F) {
        self.log_for(LogLevel::Fatal, actor, message);
    }

    /// `TRACE` event emitted only while the state is in dev-debug mode.
    pub fn trace_dev_debug<F, M>(&self, actor: Option<&dyn ActorContext>, message: F)
    where
        F: FnOnce() -> M,
        M: fmt::Display,
    {
        self.event(LogLevel::Trace)
            .dev_debug_only()
            .maybe_actor(actor)
            .log(message);
    }

    /// Log the debug rendering of a pre-built error description.
    pub fn log_description(
        &self,
        level: LogLevel,
        actor: Option<&dyn ActorContext>,
        info: &dyn ErrorDescription,
    ) {
        self.event(level).maybe_actor(actor).describe(info);
    }

    pub fn error_description(&self, info: &dyn ErrorDescription) {
        self.log_description(LogLevel::Error, None, info);
    }

    /// Character sink that emits one event per completed line.
    ///
    /// Useful for capturing the output of components that only know how to
    /// write to a text stream.
    pub fn as_appendable(
        &self,
        level: LogLevel,
        actor: Option<Arc<dyn ActorContext>>,
    ) -> StreamAppender {
        StreamAppender::new(self.clone(), level, actor)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("topic", &self.topic)
            .field("store_disabled", &self.store_disabled)
            .finish()
    }
}
