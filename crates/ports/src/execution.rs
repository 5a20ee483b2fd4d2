//! Execution request repository port.
//!
//! Persistence for [`ExecutionRequest`] records. Every write after the
//! initial insert is a compare-and-swap on the request's `version`, so two
//! workers can never both move the same request out of `ready`.

use async_trait::async_trait;
use geocat_core::ExecutionId;
use geocat_execution::{ExecutionRequest, RequestStatus};

use crate::error::PortsError;

/// Durable store of execution requests.
#[async_trait]
pub trait ExecutionRepo: Send + Sync {
    /// Persist a new request. Fails with [`PortsError::AlreadyExists`] if the
    /// id is taken.
    async fn insert(&self, request: &ExecutionRequest) -> Result<(), PortsError>;

    /// Load a request, `None` if unknown.
    async fn get(&self, id: ExecutionId) -> Result<Option<ExecutionRequest>, PortsError>;

    /// Compare-and-swap write. Stores `request` only if the stored version
    /// equals `expected_version`; returns whether it did.
    async fn update(
        &self,
        request: &ExecutionRequest,
        expected_version: u64,
    ) -> Result<bool, PortsError>;

    /// Remove a request. Returns `false` if it did not exist.
    async fn delete(&self, id: ExecutionId) -> Result<bool, PortsError>;

    /// All requests currently in `status`.
    async fn list_by_status(
        &self,
        status: RequestStatus,
    ) -> Result<Vec<ExecutionRequest>, PortsError>;

    /// A user's requests, oldest first.
    async fn list_for_user(&self, user: &str) -> Result<Vec<ExecutionRequest>, PortsError>;
}
