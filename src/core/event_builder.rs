//! Fluent construction of one log call
//!
//! The admission check happens when the builder is created. Everything
//! attached afterwards (actor, cause, duration producer, message producer)
//! is dropped untouched if the event was not admitted.

use super::{
    actor::ActorContext,
    dispatcher::panic_message,
    failure::{CapturedFailure, ErrorDescription},
    log_event::LogEvent,
    log_level::LogLevel,
    logger::Logger,
    redaction::{clean_owned, RedactionOutcome},
    state::SinkSnapshot,
    time_format::format_compact_duration,
};
use std::error::Error as StdError;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

/// Prefix of the message logged in place of one whose producer failed.
pub const RENDER_FAILURE_MESSAGE: &str = "unable to render log message";

type DurationProducer<'a> = Box<dyn FnOnce() -> Duration + 'a>;

/// Builder for a single log event
///
/// # Example
///
/// ```
/// use rust_secure_logger::prelude::*;
/// use std::time::Instant;
///
/// let state = LoggingState::new();
/// let logger = state.get_logger("ldap");
/// let session = SessionLabel::new().with_username("jdoe");
/// let started = Instant::now();
///
/// logger
///     .event(LogLevel::Info)
///     .actor(&session)
///     .duration(|| started.elapsed())
///     .log(|| "bind completed");
/// ```
pub struct EventBuilder<'a> {
    logger: &'a Logger,
    level: LogLevel,
    snapshot: Option<Arc<SinkSnapshot>>,
    actor: Option<&'a dyn ActorContext>,
    cause: Option<CapturedFailure>,
    duration: Option<DurationProducer<'a>>,
}

impl<'a> EventBuilder<'a> {
    pub(crate) fn new(logger: &'a Logger, level: LogLevel) -> Self {
        let snapshot = logger.state().snapshot();
        let admitted = snapshot.admits(level, logger.is_store_disabled());

        Self {
            logger,
            level,
            snapshot: admitted.then_some(snapshot),
            actor: None,
            cause: None,
            duration: None,
        }
    }

    /// Whether the event will be delivered anywhere.
    pub fn is_enabled(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Drop the event unless the state is in dev-debug mode.
    pub(crate) fn dev_debug_only(mut self) -> Self {
        if !self.snapshot.as_ref().is_some_and(|s| s.dev_debug()) {
            self.snapshot = None;
        }
        self
    }

    /// Session the event belongs to; its secret is redacted from the
    /// message.
    #[must_use]
    pub fn actor(mut self, actor: &'a dyn ActorContext) -> Self {
        self.actor = Some(actor);
        self
    }

    #[must_use]
    pub fn maybe_actor(mut self, actor: Option<&'a dyn ActorContext>) -> Self {
        self.actor = actor;
        self
    }

    /// Attach a failure. Captured only if the event is admitted.
    #[must_use]
    pub fn cause<E: StdError + ?Sized>(mut self, err: &E) -> Self {
        if self.is_enabled() {
            self.cause = Some(CapturedFailure::from_error(err));
        }
        self
    }

    #[must_use]
    pub fn captured(mut self, failure: CapturedFailure) -> Self {
        if self.is_enabled() {
            self.cause = Some(failure);
        }
        self
    }

    /// Append `" (<duration>)"` to the message. The producer runs only if
    /// the event is admitted.
    #[must_use]
    pub fn duration<D>(mut self, duration: D) -> Self
    where
        D: FnOnce() -> Duration + 'a,
    {
        if self.is_enabled() {
            self.duration = Some(Box::new(duration));
        }
        self
    }

    /// Emit the event with a deferred message.
    pub fn log<F, M>(self, message: F)
    where
        F: FnOnce() -> M,
        M: fmt::Display,
    {
        self.finish(move || Ok(message().to_string()));
    }

    /// Emit the event with a producer that may fail. A failure is logged
    /// as `"unable to render log message: <error>"` instead.
    pub fn try_log<F, M, E>(self, message: F)
    where
        F: FnOnce() -> std::result::Result<M, E>,
        M: fmt::Display,
        E: fmt::Display,
    {
        self.finish(move || message().map(|m| m.to_string()).map_err(|e| e.to_string()));
    }

    /// Emit the event with the debug rendering of an error description.
    pub fn describe(self, info: &dyn ErrorDescription) {
        self.finish(|| Ok(info.to_debug_str()));
    }

    fn finish<R>(self, render: R)
    where
        R: FnOnce() -> std::result::Result<String, String>,
    {
        let EventBuilder {
            logger,
            level,
            snapshot,
            actor,
            cause,
            duration,
        } = self;

        let Some(snapshot) = snapshot else {
            return;
        };

        let state = logger.state();
        let built = panic::catch_unwind(AssertUnwindSafe(|| {
            let message = match panic::catch_unwind(AssertUnwindSafe(render)) {
                Ok(Ok(message)) => message,
                Ok(Err(reason)) => {
                    state.metrics().record_render_failure();
                    format!("{}: {}", RENDER_FAILURE_MESSAGE, reason)
                }
                Err(panic_info) => {
                    state.metrics().record_render_failure();
                    format!("{}: {}", RENDER_FAILURE_MESSAGE, panic_message(panic_info.as_ref()))
                }
            };

            let message = clean_owned(message);
            let cause = cause.map(|failure| failure.map_text(clean_owned));

            let (mut message, cause) = match actor {
                Some(actor) => {
                    let redacted = state.redaction().apply_with_cause(message, cause, actor);
                    if let RedactionOutcome::Unresolved(_) = redacted.outcome {
                        state.metrics().record_redaction_failure();
                    }
                    (redacted.message, redacted.cause)
                }
                None => (message, cause),
            };

            if let Some(producer) = duration {
                if let Ok(elapsed) = panic::catch_unwind(AssertUnwindSafe(producer)) {
                    message.push_str(" (");
                    message.push_str(&format_compact_duration(elapsed));
                    message.push(')');
                }
            }

            LogEvent::new(level, logger.topic(), message)
                .with_actor(actor.map(|a| a.label()))
                .with_cause(cause)
        }));

        match built {
            Ok(event) => state.dispatch(&snapshot, &event, logger.is_store_disabled()),
            Err(_) => {
                state.metrics().record_render_failure();
            }
        }
    }
}
