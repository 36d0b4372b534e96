//! Captured failure summaries attached to log events

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;

/// Summary of a failure captured at the call site.
///
/// Independent of any particular error type: the kind is a type name, the
/// trace is the chain of `source()` messages, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedFailure {
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<String>,
}

impl CapturedFailure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            trace: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_trace(mut self, trace: Vec<String>) -> Self {
        self.trace = trace;
        self
    }

    /// Rewrite the message and every trace entry. The kind is left alone.
    #[must_use]
    pub fn map_text<F>(self, mut f: F) -> Self
    where
        F: FnMut(String) -> String,
    {
        Self {
            kind: self.kind,
            message: f(self.message),
            trace: self.trace.into_iter().map(&mut f).collect(),
        }
    }

    /// Capture a concrete error, walking its source chain.
    pub fn from_error<E: StdError + ?Sized>(err: &E) -> Self {
        let kind = std::any::type_name_of_val(err);
        Self::capture(short_type_name(kind), err)
    }

    /// Capture a type-erased error. The kind is not recoverable, so callers
    /// name it.
    pub fn from_dyn(kind: impl Into<String>, err: &(dyn StdError + 'static)) -> Self {
        Self::capture(&kind.into(), err)
    }

    fn capture<E: StdError + ?Sized>(kind: &str, err: &E) -> Self {
        let mut trace = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            trace.push(cause.to_string());
            source = cause.source();
        }

        Self {
            kind: kind.to_string(),
            message: err.to_string(),
            trace,
        }
    }
}

fn short_type_name(full: &str) -> &str {
    // `core::num::error::ParseIntError` -> `ParseIntError`; generics are kept
    let head = full.split('<').next().unwrap_or(full);
    let start = head.rfind("::").map(|i| i + 2).unwrap_or(0);
    &full[start..]
}

impl fmt::Display for CapturedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        for cause in &self.trace {
            write!(f, " <- {}", cause)?;
        }
        Ok(())
    }
}

/// A pre-built error description that knows how to render itself for logs.
pub trait ErrorDescription {
    fn to_debug_str(&self) -> String;
}

impl ErrorDescription for CapturedFailure {
    fn to_debug_str(&self) -> String {
        self.to_string()
    }
}
