//! Basic logger usage example
//!
//! Demonstrates the lifecycle, per-sink thresholds, redaction and audit
//! escalation.
//!
//! Run with: cargo run --example basic_usage

use rust_secure_logger::prelude::*;
use std::sync::Arc;

struct LoggedInUser {
    name: String,
    password: String,
}

impl ActorContext for LoggedInUser {
    fn label(&self) -> SessionLabel {
        SessionLabel::new()
            .with_username(self.name.clone())
            .with_source_address("10.0.0.7")
    }

    fn current_secret(&self) -> Result<Option<SecretValue>> {
        Ok(Some(SecretValue::new(self.password.clone())))
    }
}

fn main() -> Result<()> {
    println!("=== Rust Secure Logger - Basic Usage Example ===\n");

    let store = Arc::new(MemoryEventStore::new(100));
    let audit = Arc::new(MemoryAuditTrail::new());
    let state = LoggingState::builder()
        .text_sink(ConsoleAppender::new())
        .text_threshold(LogLevel::Debug)
        .shared_event_store(store.clone(), LogLevel::Warn)
        .shared_audit_client(audit.clone())
        .build();
    let logger = state.get_logger("example");

    println!("1. Before initialization only the fallback writer (stderr) is used:");
    logger.info(|| "wiring services");
    logger.trace(|| "hidden: below the text threshold");

    state.mark_initialized();

    println!("\n2. Logging at different levels:");
    logger.trace(|| "This is a trace message (hidden)");
    logger.debug(|| "This is a debug message");
    logger.info(|| "This is an info message");
    logger.warn(|| "This is a warning message");
    logger.error(|| "This is an error message");

    println!("\n3. Secrets of the acting session are redacted:");
    let user = LoggedInUser {
        name: "jdoe".to_string(),
        password: "hunter2".to_string(),
    };
    logger.warn_for(&user, || format!("login retried with password {}", user.password));

    println!("\n4. Fatal events are escalated to audit:");
    logger.fatal(|| "database unreachable");
    logger.fatal(|| "error 5039: expected shutdown, not audited");

    println!("\n=== Summary ===");
    println!("Events in store: {}", store.len());
    println!("Audit records:   {}", audit.len());
    for event in store.events() {
        println!("  stored: {}", event.to_log_string());
    }

    state.disable_all_logging();
    logger.error(|| "dropped: logging is disabled");

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
