//! Resource repository port.

use async_trait::async_trait;
use geocat_core::ResourceKey;
use geocat_ports::PortsError;

use crate::resource::Resource;

/// Storage of resource records. Each call is one atomic write or read of a
/// whole record.
#[async_trait]
pub trait ResourceRepo: Send + Sync {
    /// Load a resource, `None` if unknown.
    async fn get(&self, uuid: &ResourceKey) -> Result<Option<Resource>, PortsError>;

    /// Store a new resource. Fails with [`PortsError::AlreadyExists`] if the
    /// uuid is taken.
    async fn insert(&self, resource: &Resource) -> Result<(), PortsError>;

    /// Store an existing resource, replacing the previous record.
    async fn save(&self, resource: &Resource) -> Result<(), PortsError>;

    /// Remove a resource. Returns `false` if it did not exist.
    async fn delete(&self, uuid: &ResourceKey) -> Result<bool, PortsError>;
}
