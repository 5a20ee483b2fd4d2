//! Request-level status tracking.

use serde::{Deserialize, Serialize};

/// The lifecycle status of an execution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Persisted and queued, not yet picked up.
    Ready,
    /// A worker is running the handler.
    Running,
    /// The handler succeeded.
    Finished,
    /// The handler failed or timed out.
    Failed,
}

impl RequestStatus {
    /// Returns `true` if the request has reached a final state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }

    /// Returns `true` if the request completed successfully.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// The wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(RequestStatus::Finished.is_terminal());
        assert!(RequestStatus::Failed.is_terminal());
        assert!(!RequestStatus::Ready.is_terminal());
        assert!(!RequestStatus::Running.is_terminal());
    }

    #[test]
    fn success_state() {
        assert!(RequestStatus::Finished.is_success());
        assert!(!RequestStatus::Failed.is_success());
    }

    #[test]
    fn serde_matches_display() {
        for status in [
            RequestStatus::Ready,
            RequestStatus::Running,
            RequestStatus::Finished,
            RequestStatus::Failed,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
            let back: RequestStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }
}
