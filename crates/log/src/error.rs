//! Logger setup errors.

/// Result alias for this crate.
pub type LogResult<T> = Result<T, LogError>;

/// Why the subscriber could not be installed.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The level/filter directive did not parse.
    #[error("invalid filter: {0}")]
    Filter(String),

    /// A global subscriber is already installed.
    #[error("logger initialization failed: {0}")]
    Init(String),
}
