//! Log event structure

use super::actor::SessionLabel;
use super::failure::CapturedFailure;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One admitted log call.
///
/// Built once, after the message has been rendered and redacted, then shared
/// by reference with every sink. There are no setters: sinks can read an
/// event but never change what the next sink sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    timestamp: DateTime<Utc>,
    topic: String,
    level: LogLevel,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    actor: Option<SessionLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cause: Option<CapturedFailure>,
}

impl LogEvent {
    pub fn new(level: LogLevel, topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            topic: topic.into(),
            level,
            message: message.into(),
            actor: None,
            cause: None,
        }
    }

    pub fn with_actor(mut self, actor: Option<SessionLabel>) -> Self {
        self.actor = actor;
        self
    }

    pub fn with_cause(mut self, cause: Option<CapturedFailure>) -> Self {
        self.cause = cause;
        self
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn actor(&self) -> Option<&SessionLabel> {
        self.actor.as_ref()
    }

    pub fn cause(&self) -> Option<&CapturedFailure> {
        self.cause.as_ref()
    }

    /// Username of the actor, if one was attached.
    pub fn username(&self) -> Option<&str> {
        self.actor.as_ref().and_then(|a| a.username.as_deref())
    }

    pub fn source_address(&self) -> Option<&str> {
        self.actor.as_ref().and_then(|a| a.source_address.as_deref())
    }

    /// Message prefixed with the actor label and followed by the cause.
    ///
    /// This is what the textual sinks print after the level and topic.
    pub fn enhanced_message(&self) -> String {
        let mut output = String::with_capacity(self.message.len() + 32);
        if let Some(actor) = self.actor.as_ref().filter(|a| !a.is_empty()) {
            output.push_str(&actor.to_string());
            output.push(' ');
        }
        output.push_str(&self.message);
        if let Some(cause) = &self.cause {
            output.push_str(" | cause: ");
            output.push_str(&cause.to_string());
        }
        output
    }

    /// Single line written to the raw fallback channel.
    pub fn to_log_string(&self) -> String {
        format!(
            "{} {:5} {} {}",
            self.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            self.level,
            self.topic,
            self.enhanced_message()
        )
    }
}
