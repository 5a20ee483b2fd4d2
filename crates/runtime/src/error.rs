//! The service error taxonomy.
//!
//! `InvalidParameters`, `Forbidden` and `NotFound` are resolved before a
//! request exists; everything a handler raises ends up on the request log
//! instead and never surfaces here.

use geocat_catalog::CatalogError;
use geocat_core::ResourceKey;
use geocat_execution::ExecutionError;
use geocat_permission::PermissionError;
use geocat_ports::PortsError;

/// Errors from the request store, dispatcher and watchdog.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input did not match the verb's parameter shape.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The caller may not touch this request or resource.
    #[error("forbidden")]
    Forbidden,

    /// Unknown execution request or resource.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity.
        entity: String,
        /// The id that was looked up.
        id: String,
    },

    /// A resource with this uuid already exists.
    #[error("resource already exists: {0}")]
    DuplicateResource(ResourceKey),

    /// The permission spec is not acceptable.
    #[error("invalid permission spec: {0}")]
    InvalidPermissionSpec(#[from] PermissionError),

    /// A backend hiccup; retry with a new request.
    #[error("transient failure: {0}")]
    TransientFailure(String),

    /// A bug or an unexpected backend failure.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    /// Shorthand for [`ServiceError::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether the caller caused the error.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::TransientFailure(_) | Self::InternalError(_))
    }

    /// Whether repeating the call may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientFailure(_))
    }
}

impl From<ExecutionError> for ServiceError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::InvalidParameters(msg) => Self::InvalidParameters(msg),
            err @ ExecutionError::UnknownFunction(_) => Self::InvalidParameters(err.to_string()),
            ExecutionError::InvalidPermissionSpec(err) => Self::InvalidPermissionSpec(err),
            err @ ExecutionError::InvalidTransition { .. } => Self::InternalError(err.to_string()),
        }
    }
}

impl From<PortsError> for ServiceError {
    fn from(err: PortsError) -> Self {
        match err {
            PortsError::NotFound { entity, id } => Self::NotFound { entity, id },
            err if err.is_retryable() => Self::TransientFailure(err.to_string()),
            err => Self::InternalError(err.to_string()),
        }
    }
}

impl From<CatalogError> for ServiceError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(uuid) => Self::not_found("resource", uuid.as_str()),
            CatalogError::DuplicateResource(uuid) => Self::DuplicateResource(uuid),
            CatalogError::InvalidInput(msg) => Self::InvalidParameters(msg),
            CatalogError::InvalidPermissionSpec(err) => Self::InvalidPermissionSpec(err),
            CatalogError::Storage(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocat_core::Subject;
    use std::time::Duration;

    #[test]
    fn not_found_display() {
        let err = ServiceError::not_found("execution request", "42");
        assert_eq!(err.to_string(), "execution request not found: 42");
        assert!(err.is_client_error());
    }

    #[test]
    fn reserved_manage_stays_a_permission_error() {
        let err = ServiceError::from(ExecutionError::from(
            PermissionError::ReservedSubjectManage {
                subject: Subject::Anonymous,
            },
        ));
        assert!(matches!(err, ServiceError::InvalidPermissionSpec(_)));
    }

    #[test]
    fn retryable_propagation() {
        let err = ServiceError::from(PortsError::timeout("insert", Duration::from_secs(1)));
        assert!(err.is_retryable());
        assert!(!err.is_client_error());

        let err = ServiceError::from(PortsError::Internal("bad".into()));
        assert!(!err.is_retryable());
    }

    #[test]
    fn transitions_are_internal() {
        let err = ServiceError::from(ExecutionError::InvalidTransition {
            from: geocat_execution::RequestStatus::Finished,
            to: geocat_execution::RequestStatus::Running,
        });
        assert!(matches!(err, ServiceError::InternalError(_)));
    }
}
