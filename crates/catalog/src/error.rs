//! Resource manager errors.

use geocat_core::ResourceKey;
use geocat_permission::PermissionError;
use geocat_ports::PortsError;

/// Why a resource mutation or lookup failed.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No resource with this uuid.
    #[error("resource not found: {0}")]
    NotFound(ResourceKey),

    /// A resource with this uuid already exists.
    #[error("resource already exists: {0}")]
    DuplicateResource(ResourceKey),

    /// The request is well-formed but cannot apply to this resource.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The permission spec cannot be applied to this resource.
    #[error(transparent)]
    InvalidPermissionSpec(#[from] PermissionError),

    /// The backing store failed.
    #[error("storage: {0}")]
    Storage(#[from] PortsError),
}

impl CatalogError {
    /// Caller mistakes, never worth retrying.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::DuplicateResource(_)
                | Self::InvalidInput(_)
                | Self::InvalidPermissionSpec(_)
        )
    }

    /// Backend hiccups a fresh request may get past.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(err) if err.is_retryable())
    }
}
