//! The append-only diagnostic log carried on every request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a [`LogEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Progress information.
    Info,
    /// Something odd that did not stop the request.
    Warning,
    /// The failure that ended the request.
    Error,
}

/// One line of a request's `log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the entry was appended.
    pub timestamp: DateTime<Utc>,
    /// Severity.
    pub level: LogLevel,
    /// Error class for failures (`user`, `transient`, `internal`, `timeout`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Human-readable text, verbatim from the handler for user errors.
    pub message: String,
}

impl LogEntry {
    /// An informational entry stamped now.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level: LogLevel::Info,
            class: None,
            message: message.into(),
        }
    }

    /// An error entry of the given class stamped now.
    pub fn error(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level: LogLevel::Error,
            class: Some(class.into()),
            message: message.into(),
        }
    }
}
