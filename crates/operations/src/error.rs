//! Operation errors and their classification.

use std::fmt;

use geocat_catalog::CatalogError;
use geocat_core::ResourceKey;
use geocat_execution::ExecutionError;
use geocat_permission::PermissionError;

/// How the dispatcher treats a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The caller's mistake; logged verbatim, never retried.
    User,
    /// A backend hiccup; the caller may submit a new request.
    Transient,
    /// A bug or an unexpected backend failure.
    Internal,
}

impl ErrorClass {
    /// Name recorded on the request's log entry.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Transient => "transient",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by an operation handler.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    /// Input did not match the verb's parameter shape.
    #[error("validation: {0}")]
    Validation(String),

    /// The target resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(ResourceKey),

    /// The requester may not perform the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// `create` of a uuid that is taken.
    #[error("resource already exists: {0}")]
    DuplicateResource(ResourceKey),

    /// The permission spec cannot be applied.
    #[error("invalid permission spec: {0}")]
    InvalidPermissionSpec(#[from] PermissionError),

    /// A retryable backend failure.
    #[error("transient: {0}")]
    Transient(String),

    /// Anything else.
    #[error("internal: {0}")]
    Internal(String),
}

impl OperationError {
    /// Shorthand for [`OperationError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// The dispatcher's view of this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_)
            | Self::NotFound(_)
            | Self::PermissionDenied(_)
            | Self::DuplicateResource(_)
            | Self::InvalidPermissionSpec(_) => ErrorClass::User,
            Self::Transient(_) => ErrorClass::Transient,
            Self::Internal(_) => ErrorClass::Internal,
        }
    }

    /// Whether a new request might succeed where this one failed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Transient
    }
}

impl From<CatalogError> for OperationError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(uuid) => Self::NotFound(uuid),
            CatalogError::DuplicateResource(uuid) => Self::DuplicateResource(uuid),
            CatalogError::InvalidInput(msg) => Self::Validation(msg),
            CatalogError::InvalidPermissionSpec(err) => Self::InvalidPermissionSpec(err),
            CatalogError::Storage(err) if err.is_retryable() => Self::Transient(err.to_string()),
            CatalogError::Storage(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<ExecutionError> for OperationError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::InvalidPermissionSpec(err) => Self::InvalidPermissionSpec(err),
            ExecutionError::InvalidParameters(msg) => Self::Validation(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}
