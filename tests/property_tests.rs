//! Property-based tests for rust_secure_logger using proptest

use proptest::prelude::*;
use rust_secure_logger::core::clean_non_printable;
use rust_secure_logger::prelude::*;
use std::cell::Cell;
use std::sync::Arc;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Trace),
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Fatal),
    ]
}

struct FixedSecret(String);

impl ActorContext for FixedSecret {
    fn label(&self) -> SessionLabel {
        SessionLabel::new().with_username("prop")
    }

    fn current_secret(&self) -> Result<Option<SecretValue>> {
        Ok(Some(SecretValue::new(self.0.clone())))
    }
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(parsed, level);
    }

    #[test]
    fn test_log_level_case_insensitive(level in any_level(), use_lower in any::<bool>()) {
        let text = if use_lower {
            level.to_str().to_lowercase()
        } else {
            level.to_str().to_string()
        };
        prop_assert_eq!(text.parse::<LogLevel>().unwrap(), level);
    }

    #[test]
    fn test_log_level_invalid_parse(invalid_str in "[^TDIWEFtdiwefor ]+") {
        prop_assert!(invalid_str.parse::<LogLevel>().is_err());
    }
}

// ============================================================================
// Admission Gate
// ============================================================================

proptest! {
    /// If a level is admitted, every higher level is admitted too.
    #[test]
    fn test_gate_is_monotonic(
        text_level in any_level(),
        store_level in any_level(),
        with_store in any::<bool>(),
        store_disabled in any::<bool>(),
        initialized in any::<bool>(),
    ) {
        let mut builder = LoggingState::builder()
            .text_sink(NullAppender)
            .text_threshold(text_level)
            .fallback_writer(rust_secure_logger::FallbackWriter::sink())
            .initialized(initialized);
        if with_store {
            builder = builder.event_store(MemoryEventStore::new(4), store_level);
        }
        let state = builder.build();
        let logger = if store_disabled {
            state.get_logger_without_store("p")
        } else {
            state.get_logger("p")
        };

        for pair in LogLevel::ALL.windows(2) {
            if logger.is_enabled(pair[0]) {
                prop_assert!(logger.is_enabled(pair[1]));
            }
        }
    }

    /// A producer for a non-admitted level never runs.
    #[test]
    fn test_disabled_producer_never_runs(threshold in any_level(), level in any_level()) {
        prop_assume!(level < threshold);
        let state = LoggingState::builder()
            .text_sink(NullAppender)
            .text_threshold(threshold)
            .initialized(true)
            .build();
        let logger = state.get_logger("p");
        let ran = Cell::new(false);

        logger.log(level, || {
            ran.set(true);
            "never"
        });

        prop_assert!(!ran.get());
    }
}

// ============================================================================
// Redaction and sanitation
// ============================================================================

proptest! {
    #[test]
    fn test_secret_never_reaches_store(
        secret in "[A-Z0-9]{1,12}",
        prefix in "[a-z \t\n]{0,20}",
        suffix in "[a-z \t\n]{0,20}",
        repeats in 1usize..4,
        split_at in any::<prop::sample::Index>(),
        filler in prop::sample::select(vec!["", "\u{7}", "\u{0}", "\u{1b}", "\u{200B}", "\u{202E}", "\u{FEFF}"]),
    ) {
        let store = Arc::new(MemoryEventStore::new(4));
        let state = LoggingState::builder()
            .shared_event_store(store.clone(), LogLevel::Trace)
            .initialized(true)
            .build();
        // An invisible character inside each occurrence must not hide it
        let cut = split_at.index(secret.len() + 1);
        let disguised = format!("{}{}{}", &secret[..cut], filler, &secret[cut..]);
        let message = format!("{}{}{}", prefix, disguised.repeat(repeats), suffix);

        state
            .get_logger("p")
            .info_for(&FixedSecret(secret.clone()), || message.clone());

        let delivered = store.events();
        prop_assert_eq!(delivered.len(), 1);
        prop_assert!(!delivered[0].message().contains(&secret));
        prop_assert!(delivered[0].message().contains("<redacted>"));
    }

    #[test]
    fn test_clean_output_is_single_visible_line(message in ".*") {
        let cleaned = clean_non_printable(&message);
        prop_assert!(!cleaned.chars().any(|c| c.is_control()));
        prop_assert!(!cleaned.contains('\u{202E}'), "cleaned output contains U+202E");
    }

    #[test]
    fn test_message_sanitization_newlines(message in ".*") {
        let store = Arc::new(MemoryEventStore::new(4));
        let state = LoggingState::builder()
            .shared_event_store(store.clone(), LogLevel::Trace)
            .initialized(true)
            .build();

        state.get_logger("p").warn(|| format!("first\n{}\r\nlast", message));

        let delivered = store.events();
        prop_assert!(!delivered[0].message().contains('\n'));
        prop_assert!(!delivered[0].message().contains('\r'));
    }
}

// ============================================================================
// StreamAppender
// ============================================================================

proptest! {
    /// However the text is chunked, each line comes out exactly once.
    #[test]
    fn test_stream_chunking_preserves_lines(
        lines in prop::collection::vec("[a-z0-9 ]{1,16}", 1..20),
        chunk in 1usize..7,
    ) {
        let store = Arc::new(MemoryEventStore::new(64));
        let state = LoggingState::builder()
            .shared_event_store(store.clone(), LogLevel::Trace)
            .initialized(true)
            .build();
        let appender = state.get_logger("p").as_appendable(LogLevel::Info, None);

        let text: String = lines.iter().map(|l| format!("{}\n", l)).collect();
        let bytes = text.as_bytes();
        for part in bytes.chunks(chunk) {
            appender.append_bytes(part);
        }

        let delivered: Vec<String> = store.events().iter().map(|e| e.message().to_string()).collect();
        let expected: Vec<String> = lines.iter().map(|l| clean_non_printable(l).into_owned()).collect();
        prop_assert_eq!(delivered, expected);
        prop_assert_eq!(appender.pending(), "");
    }
}
