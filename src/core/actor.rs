//! Actor (session) context consumed for correlation and redaction
//!
//! The logger never resolves identities itself. Callers hand in something
//! implementing [`ActorContext`]; the logger only reads its label and, when
//! the event is admitted, its current secret.

use super::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity and origin of the session that produced an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLabel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_address: Option<String>,
}

const SYSTEM_SESSION_ID: &str = "SYSTEM";

impl SessionLabel {
    pub fn new() -> Self {
        Self::default()
    }

    /// The label used when the logging core itself acts, e.g. when it
    /// submits an audit record for a fatal event.
    pub fn system() -> Self {
        Self {
            session_id: Some(SYSTEM_SESSION_ID.to_string()),
            username: None,
            source_address: None,
        }
    }

    pub fn is_system(&self) -> bool {
        self.session_id.as_deref() == Some(SYSTEM_SESSION_ID)
    }

    #[must_use]
    pub fn with_session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn with_source_address(mut self, address: impl Into<String>) -> Self {
        self.source_address = Some(address.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.session_id.is_none() && self.username.is_none() && self.source_address.is_none()
    }
}

impl fmt::Display for SessionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [&self.session_id, &self.username, &self.source_address]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect();
        write!(f, "{{{}}}", parts.join(","))
    }
}

/// A secret held by a session, e.g. the credential the user logged in with.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue(String);

impl SecretValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue(****)")
    }
}

impl From<&str> for SecretValue {
    fn from(s: &str) -> Self {
        SecretValue::new(s)
    }
}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

/// Session context supplied by the host application.
pub trait ActorContext: Send + Sync {
    /// Identity used for display and audit correlation.
    fn label(&self) -> SessionLabel;

    /// Secret currently held by the session, if any.
    ///
    /// Resolving it may fail (an expired session, a locked credential
    /// store); the logger then passes the message through unredacted.
    fn current_secret(&self) -> Result<Option<SecretValue>> {
        Ok(None)
    }
}

impl ActorContext for SessionLabel {
    fn label(&self) -> SessionLabel {
        self.clone()
    }
}

impl<T: ActorContext + ?Sized> ActorContext for std::sync::Arc<T> {
    fn label(&self) -> SessionLabel {
        (**self).label()
    }

    fn current_secret(&self) -> Result<Option<SecretValue>> {
        (**self).current_secret()
    }
}
