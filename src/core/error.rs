//! Error types for the logger system
//!
//! None of these ever reach the code that emits log events: the dispatcher
//! consumes every sink result individually. They surface from constructors
//! (opening files, parsing configuration) and from sink implementations.

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A sink rejected an event
    #[error("Sink '{sink}' failed: {message}")]
    SinkFailed { sink: String, message: String },

    /// The actor's current secret could not be resolved
    #[error("Redaction failed: {0}")]
    RedactionFailed(String),

    /// A message producer failed to render
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Event store already held by another writer
    #[error("Failed to acquire exclusive lock on event store '{path}'")]
    StoreLocked { path: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a sink failure
    pub fn sink(sink: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::SinkFailed {
            sink: sink.into(),
            message: message.into(),
        }
    }

    pub fn redaction<S: Into<String>>(msg: S) -> Self {
        LoggerError::RedactionFailed(msg.into())
    }

    pub fn rendering<S: Into<String>>(msg: S) -> Self {
        LoggerError::RenderingFailed(msg.into())
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn store_locked(path: impl Into<String>) -> Self {
        LoggerError::StoreLocked { path: path.into() }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
