//! Logging macros for ergonomic log message formatting.
//!
//! The macros wrap their format arguments in a closure, so nothing is
//! formatted unless some sink admits the level.
//!
//! # Examples
//!
//! ```
//! use rust_secure_logger::prelude::*;
//! use rust_secure_logger::info;
//!
//! let state = LoggingState::new();
//! let logger = state.get_logger("server");
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // On behalf of a session; its secret is redacted
//! let session = SessionLabel::new().with_username("jdoe");
//! info!(logger, actor: &session, "User {} logged in", "jdoe");
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_secure_logger::prelude::*;
/// # let logger = LoggingState::new().get_logger("t");
/// use rust_secure_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, actor: $actor:expr, $($arg:tt)+) => {
        $logger.log_for($level, $actor, || format!($($arg)+))
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, || format!($($arg)+))
    };
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use rust_secure_logger::prelude::*;
/// # let logger = LoggingState::builder().text_threshold(LogLevel::Trace).build().get_logger("t");
/// use rust_secure_logger::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_secure_logger::prelude::*;
/// # let logger = LoggingState::new().get_logger("t");
/// use rust_secure_logger::warn;
/// warn!(logger, "Low disk space");
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message. Escalates to audit like [`Logger::fatal`].
///
/// [`Logger::fatal`]: crate::Logger::fatal
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}
