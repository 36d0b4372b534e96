//! Secret redaction and message sanitation
//!
//! Two passes run on every admitted message, in this order:
//!
//! 1. [`clean_non_printable`] removes control and invisible formatting
//!    characters so a message always renders as a single visible line.
//! 2. [`RedactionFilter`] replaces each occurrence of the actor's current
//!    secret with a placeholder.
//!
//! Redaction always runs on cleaned text, the same text the sinks receive.

use super::actor::ActorContext;
use super::error::LoggerError;
use super::failure::CapturedFailure;
use std::borrow::Cow;

/// Placeholder substituted for a redacted secret.
pub const REDACTED_PLACEHOLDER: &str = "<redacted>";

/// Outcome of one redaction attempt.
#[derive(Debug)]
pub enum RedactionOutcome {
    /// No secret was available, or it did not occur in the message.
    Untouched,
    /// This many occurrences were replaced.
    Redacted(usize),
    /// The secret could not be resolved; the message passed through as is.
    Unresolved(LoggerError),
}

#[derive(Debug)]
pub struct Redacted {
    pub message: String,
    pub cause: Option<CapturedFailure>,
    pub outcome: RedactionOutcome,
}

/// Strips a known secret from rendered messages.
#[derive(Debug, Clone)]
pub struct RedactionFilter {
    placeholder: String,
}

impl RedactionFilter {
    pub fn new() -> Self {
        Self {
            placeholder: REDACTED_PLACEHOLDER.to_string(),
        }
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Replace every occurrence of `secret` in `message`.
    ///
    /// An empty secret never matches.
    pub fn redact<'a>(&self, message: &'a str, secret: &str) -> Cow<'a, str> {
        if secret.is_empty() || !message.contains(secret) {
            return Cow::Borrowed(message);
        }
        Cow::Owned(message.replace(secret, &self.placeholder))
    }

    /// Redact the actor's current secret from `message`.
    ///
    /// Never fails: an unresolvable secret yields the original message
    /// together with [`RedactionOutcome::Unresolved`].
    pub fn apply(&self, message: String, actor: &dyn ActorContext) -> Redacted {
        self.apply_with_cause(message, None, actor)
    }

    /// Redact the actor's current secret from `message` and from the text
    /// of a captured failure. The secret is resolved once for both.
    ///
    /// Both the secret as given and its cleaned form are matched, so a
    /// secret containing a tab or line break is still found in cleaned text.
    pub fn apply_with_cause(
        &self,
        message: String,
        cause: Option<CapturedFailure>,
        actor: &dyn ActorContext,
    ) -> Redacted {
        let secret = match actor.current_secret() {
            Ok(Some(secret)) if !secret.is_empty() => secret,
            Ok(_) => {
                return Redacted {
                    message,
                    cause,
                    outcome: RedactionOutcome::Untouched,
                }
            }
            Err(e) => {
                return Redacted {
                    message,
                    cause,
                    outcome: RedactionOutcome::Unresolved(e),
                }
            }
        };

        let raw = secret.expose();
        let cleaned = clean_non_printable(raw);
        let mut forms = vec![raw];
        if cleaned != raw && !cleaned.trim().is_empty() {
            forms.push(&*cleaned);
        }

        let mut count = 0;
        let message = self.scrub(message, &forms, &mut count);
        let cause = cause.map(|failure| failure.map_text(|text| self.scrub(text, &forms, &mut count)));

        Redacted {
            message,
            cause,
            outcome: if count == 0 {
                RedactionOutcome::Untouched
            } else {
                RedactionOutcome::Redacted(count)
            },
        }
    }

    fn scrub(&self, mut text: String, forms: &[&str], count: &mut usize) -> String {
        for &form in forms {
            let found = text.matches(form).count();
            if found > 0 {
                text = text.replace(form, &self.placeholder);
                *count += found;
            }
        }
        text
    }
}

impl Default for RedactionFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove characters that do not print.
///
/// Tabs and line breaks become a single space so words stay separated;
/// every other control character and the invisible bidi/zero-width
/// formatting characters are dropped.
pub fn clean_non_printable(input: &str) -> Cow<'_, str> {
    if !input.chars().any(is_unprintable) {
        return Cow::Borrowed(input);
    }

    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\t' | '\n' | '\r' => output.push(' '),
            c if is_unprintable(c) => {}
            c => output.push(c),
        }
    }
    Cow::Owned(output)
}

/// Owned variant of [`clean_non_printable`] that reuses `input` when it
/// is already clean.
pub fn clean_owned(input: String) -> String {
    let cleaned = match clean_non_printable(&input) {
        Cow::Owned(cleaned) => Some(cleaned),
        Cow::Borrowed(_) => None,
    };
    cleaned.unwrap_or(input)
}

fn is_unprintable(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}' | '\u{FEFF}'
        )
}
