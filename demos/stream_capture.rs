//! Stream capture example
//!
//! Routes the output of code that only knows how to write to a text stream
//! into the logger, one event per line.
//!
//! Run with: cargo run --example stream_capture

use rust_secure_logger::prelude::*;
use std::io::Write as _;
use std::sync::Arc;
use std::thread;

fn print_report(out: &mut impl std::fmt::Write) -> std::fmt::Result {
    writeln!(out, "report generated")?;
    write!(out, "rows: ")?;
    writeln!(out, "{}", 42)?;
    writeln!(out, "status: ok")
}

fn main() -> Result<()> {
    println!("=== Rust Secure Logger - Stream Capture Example ===\n");

    let store = Arc::new(MemoryEventStore::new(100));
    let state = LoggingState::builder()
        .text_sink(ConsoleAppender::new())
        .shared_event_store(store.clone(), LogLevel::Info)
        .initialized(true)
        .build();
    let logger = state.get_logger("captured");

    println!("1. fmt::Write output becomes one event per line:");
    let mut appender = logger.as_appendable(LogLevel::Info, None);
    print_report(&mut appender).map_err(|e| LoggerError::other(e.to_string()))?;

    println!("\n2. io::Write output, split mid-line:");
    appender.write_all(b"child process ")?;
    appender.write_all(b"exited\npartial tail")?;
    println!("   pending: {:?}", appender.pending());
    drop(appender);

    println!("\n3. Threads sharing one appender never interleave within a line:");
    let session: Arc<dyn ActorContext> = Arc::new(SessionLabel::new().with_username("batch"));
    let shared = Arc::new(logger.as_appendable(LogLevel::Warn, Some(session)));
    let workers: Vec<_> = (0..3)
        .map(|t| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for i in 0..3 {
                    shared.append_str(&format!("worker {} ", t));
                    shared.append_str(&format!("step {}\n", i));
                }
            })
        })
        .collect();
    for worker in workers {
        let _ = worker.join();
    }

    println!("\nEvents captured: {}", store.len());
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
