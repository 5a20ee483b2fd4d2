//! Execution request error types.

use geocat_permission::PermissionError;
use thiserror::Error;

use crate::status::RequestStatus;

/// Errors raised while creating or advancing an execution request.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A state transition is not valid for the current status.
    ///
    /// Always a programming error: the request is left untouched.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: RequestStatus,
        /// Attempted target status.
        to: RequestStatus,
    },

    /// `func_name` is not one of the seven known verbs.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// `input_params` is missing keys or has the wrong shape.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The permission spec in `input_params` can never be applied.
    #[error("invalid permission spec: {0}")]
    InvalidPermissionSpec(#[from] PermissionError),
}

impl ExecutionError {
    /// Shorthand for [`ExecutionError::InvalidParameters`].
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }
}
