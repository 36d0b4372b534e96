//! Logger metrics for observability
//!
//! Counters for dispatch health: how many events went out, how many sink
//! calls failed or panicked, and what happened on the escalation path.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics shared by every logger created from one logging state
///
/// # Example
///
/// ```
/// use rust_secure_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_dispatched();
/// metrics.record_sink_failure();
///
/// assert_eq!(metrics.events_dispatched(), 1);
/// assert_eq!(metrics.sink_failures(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Events that passed the gate and were handed to the dispatcher
    events_dispatched: AtomicU64,

    /// Sink calls that returned an error
    sink_failures: AtomicU64,

    /// Sink calls that panicked
    sink_panics: AtomicU64,

    /// Fatal events forwarded to the audit collaborator
    audit_submissions: AtomicU64,

    /// Fatal events withheld from audit because of a suppressed marker
    audit_suppressions: AtomicU64,

    /// Message producers that failed and were replaced by a fallback message
    render_failures: AtomicU64,

    /// Events whose actor secret could not be resolved
    redaction_failures: AtomicU64,

    /// Lines written to the raw fallback writer
    fallback_writes: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            events_dispatched: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            sink_panics: AtomicU64::new(0),
            audit_submissions: AtomicU64::new(0),
            audit_suppressions: AtomicU64::new(0),
            render_failures: AtomicU64::new(0),
            redaction_failures: AtomicU64::new(0),
            fallback_writes: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn events_dispatched(&self) -> u64 {
        self.events_dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_panics(&self) -> u64 {
        self.sink_panics.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn audit_submissions(&self) -> u64 {
        self.audit_submissions.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn audit_suppressions(&self) -> u64 {
        self.audit_suppressions.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn render_failures(&self) -> u64 {
        self.render_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn redaction_failures(&self) -> u64 {
        self.redaction_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn fallback_writes(&self) -> u64 {
        self.fallback_writes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.events_dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_panic(&self) -> u64 {
        self.sink_panics.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_audit_submission(&self) -> u64 {
        self.audit_submissions.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_audit_suppression(&self) -> u64 {
        self.audit_suppressions.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_render_failure(&self) -> u64 {
        self.render_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_redaction_failure(&self) -> u64 {
        self.redaction_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_fallback_write(&self) -> u64 {
        self.fallback_writes.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of sink calls that failed or panicked, as a percentage of
    /// dispatched events (0.0 - 100.0).
    ///
    /// Returns 0.0 if nothing has been dispatched.
    pub fn failure_rate(&self) -> f64 {
        let dispatched = self.events_dispatched() as f64;
        if dispatched == 0.0 {
            return 0.0;
        }
        let failed = (self.sink_failures() + self.sink_panics()) as f64;
        (failed / dispatched * 100.0).min(100.0)
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.events_dispatched.store(0, Ordering::Relaxed);
        self.sink_failures.store(0, Ordering::Relaxed);
        self.sink_panics.store(0, Ordering::Relaxed);
        self.audit_submissions.store(0, Ordering::Relaxed);
        self.audit_suppressions.store(0, Ordering::Relaxed);
        self.render_failures.store(0, Ordering::Relaxed);
        self.redaction_failures.store(0, Ordering::Relaxed);
        self.fallback_writes.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            events_dispatched: AtomicU64::new(self.events_dispatched()),
            sink_failures: AtomicU64::new(self.sink_failures()),
            sink_panics: AtomicU64::new(self.sink_panics()),
            audit_submissions: AtomicU64::new(self.audit_submissions()),
            audit_suppressions: AtomicU64::new(self.audit_suppressions()),
            render_failures: AtomicU64::new(self.render_failures()),
            redaction_failures: AtomicU64::new(self.redaction_failures()),
            fallback_writes: AtomicU64::new(self.fallback_writes()),
        }
    }
}
