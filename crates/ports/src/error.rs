//! Error type shared by every port.
//!
//! Drivers map their backend failures into these variants. Callers only
//! need to tell a missing row, a taken key and a retryable hiccup apart;
//! a lost compare-and-swap is not an error (see [`ExecutionRepo::update`]).
//!
//! [`ExecutionRepo::update`]: crate::ExecutionRepo::update

use std::time::Duration;

/// Failure of a port operation.
#[derive(Debug, thiserror::Error)]
pub enum PortsError {
    /// No record under the key.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Record kind, e.g. "Resource" or "Task".
        entity: String,
        /// The key that was looked up.
        id: String,
    },

    /// Insert of a record whose key is already taken.
    #[error("{entity} already exists: {id}")]
    AlreadyExists {
        /// Record kind.
        entity: String,
        /// The taken key.
        id: String,
    },

    /// The backend did not answer in time.
    #[error("timeout: {operation} after {duration:?}")]
    Timeout {
        /// Port method that timed out.
        operation: String,
        /// How long was waited.
        duration: Duration,
    },

    /// Anything else the backend reports.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PortsError {
    /// [`PortsError::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// [`PortsError::AlreadyExists`].
    pub fn already_exists(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// [`PortsError::Timeout`].
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Whether retrying the same call later may succeed. Handlers report
    /// these as `transient`.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn only_timeouts_are_retryable() {
        assert!(PortsError::timeout("save", Duration::from_secs(1)).is_retryable());
        assert!(!PortsError::not_found("Resource", "r1").is_retryable());
        assert!(!PortsError::already_exists("Resource", "r1").is_retryable());
        assert!(!PortsError::Internal("disk".into()).is_retryable());
    }

    #[test]
    fn messages_name_the_record() {
        assert_eq!(
            PortsError::not_found("Task", "t-1").to_string(),
            "Task not found: t-1"
        );
        assert_eq!(
            PortsError::already_exists("ExecutionRequest", "e-1").to_string(),
            "ExecutionRequest already exists: e-1"
        );
        assert_eq!(
            PortsError::timeout("dequeue", Duration::from_millis(250)).to_string(),
            "timeout: dequeue after 250ms"
        );
    }
}
