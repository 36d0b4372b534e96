//! File logging example
//!
//! Builds the logging state from a JSON config with a rolling text file,
//! then attaches a persistent event store and audit trail.
//!
//! Run with: cargo run --example file_logging

use rust_secure_logger::core::{RollingFileConfig, TextSinkConfig};
use rust_secure_logger::prelude::*;

fn main() -> Result<()> {
    println!("=== Rust Secure Logger - File Logging Example ===\n");

    let mut config = LoggingConfig::default();
    config.text_level = LogLevel::Debug;
    config.store_level = LogLevel::Warn;
    config.text_sink = TextSinkConfig::File(RollingFileConfig {
        max_bytes: 4 * 1024,
        max_backups: 3,
        compress: true,
        ..RollingFileConfig::new("application.log")
    });
    println!("Configuration:\n{}\n", config.to_json()?);

    let state = LoggingStateBuilder::from_config(&config)?.build();
    state.attach_event_store(JsonEventStore::open("events.jsonl")?, config.store_level);
    state.attach_audit_client(JsonAuditTrail::open("audit.jsonl")?);
    state.mark_initialized();

    let logger = state.get_logger("file-example");
    logger.info(|| "Application started");
    logger.debug(|| "Loading configuration...");
    logger.warn(|| "Using default settings for some options");

    for i in 1..=200 {
        logger.info(|| format!("Processing item {}/200", i));
        if i % 50 == 0 {
            logger.warn(|| format!("Item {} took longer than expected", i));
        }
    }

    let failure = CapturedFailure::from_error(&std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused",
    ));
    logger
        .event(LogLevel::Error)
        .captured(failure)
        .log(|| "Failed to load optional plugin");
    logger.fatal(|| "Shutting down after unrecoverable error");

    state.flush()?;

    let events = JsonEventStore::read_events("events.jsonl")?;
    let records = JsonAuditTrail::read_records("audit.jsonl")?;
    println!("Stored events: {}", events.len());
    println!("Audit records: {}", records.len());
    println!(
        "Dispatched: {}, sink failures: {}",
        state.metrics().events_dispatched(),
        state.metrics().sink_failures()
    );

    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.log' (and its .gz backups) for the text output");

    Ok(())
}
