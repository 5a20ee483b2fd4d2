//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use geocat_catalog::CatalogError;
use geocat_ports::PortsError;
use geocat_runtime::ServiceError;
use serde::{Deserialize, Serialize};

/// Error body `{status, code, message}`. `403` is sent without a body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{status} ({code}): {message}")]
pub struct ApiError {
    /// Short machine-readable status.
    pub status: String,
    /// HTTP status code.
    pub code: u16,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    /// Create an error.
    #[must_use]
    pub fn new(status: impl Into<String>, code: u16, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            code,
            message: message.into(),
        }
    }

    /// `400`.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", 400, message)
    }

    /// `403`.
    #[must_use]
    pub fn forbidden() -> Self {
        Self::new("forbidden", 403, "")
    }

    /// `404`.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", 404, message)
    }

    /// `500`. The detail is logged, not returned.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!(error = %message, "request failed");
        Self::new("internal_error", 500, "internal server error")
    }

    /// The status code to send.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidParameters(_)
            | ServiceError::InvalidPermissionSpec(_)
            | ServiceError::DuplicateResource(_) => Self::bad_request(err.to_string()),
            ServiceError::Forbidden => Self::forbidden(),
            ServiceError::NotFound { .. } => Self::not_found(err.to_string()),
            ServiceError::TransientFailure(_) | ServiceError::InternalError(_) => {
                Self::internal(err.to_string())
            }
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ServiceError::from(err).into()
    }
}

impl From<PortsError> for ApiError {
    fn from(err: PortsError) -> Self {
        ServiceError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::FORBIDDEN {
            return status.into_response();
        }
        (status, Json(self)).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<Json<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use geocat_core::ResourceKey;
    use geocat_permission::PermissionError;
    use rstest::rstest;

    #[rstest]
    #[case(ServiceError::InvalidParameters("delete: missing field `uuid`".into()), 400)]
    #[case(ServiceError::InvalidPermissionSpec(PermissionError::UnknownRole("owner".into())), 400)]
    #[case(ServiceError::DuplicateResource(ResourceKey::new("r1").unwrap()), 400)]
    #[case(ServiceError::Forbidden, 403)]
    #[case(ServiceError::not_found("resource", "r1"), 404)]
    #[case(ServiceError::TransientFailure("queue full".into()), 500)]
    #[case(ServiceError::InternalError("boom".into()), 500)]
    fn service_errors_map_to_codes(#[case] err: ServiceError, #[case] code: u16) {
        assert_eq!(ApiError::from(err).code, code);
    }

    #[test]
    fn internal_errors_hide_the_detail() {
        let err = ApiError::from(ServiceError::InternalError("db password wrong".into()));
        assert!(!err.message.contains("password"));
    }

    #[test]
    fn forbidden_has_no_body() {
        let response = ApiError::forbidden().into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers().get(axum::http::header::CONTENT_TYPE),
            None
        );
    }
}
