//! Sink that discards everything

use crate::core::{Appender, LogEvent, Result};

/// Textual sink installed by `disable_all_logging`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAppender;

impl Appender for NullAppender {
    fn append(&self, _event: &LogEvent) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}
