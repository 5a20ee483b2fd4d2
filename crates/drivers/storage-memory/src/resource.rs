//! In-memory resource repository.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use geocat_catalog::{Resource, ResourceRepo};
use geocat_core::ResourceKey;
use geocat_ports::PortsError;

/// Resources keyed by uuid. Every write replaces the whole record.
#[derive(Debug, Default)]
pub struct MemoryResourceRepo {
    resources: DashMap<ResourceKey, Resource>,
}

impl MemoryResourceRepo {
    /// An empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[async_trait]
impl ResourceRepo for MemoryResourceRepo {
    async fn get(&self, uuid: &ResourceKey) -> Result<Option<Resource>, PortsError> {
        Ok(self.resources.get(uuid).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, resource: &Resource) -> Result<(), PortsError> {
        match self.resources.entry(resource.uuid.clone()) {
            Entry::Occupied(_) => Err(PortsError::already_exists(
                "Resource",
                resource.uuid.as_str(),
            )),
            Entry::Vacant(slot) => {
                slot.insert(resource.clone());
                Ok(())
            }
        }
    }

    async fn save(&self, resource: &Resource) -> Result<(), PortsError> {
        match self.resources.get_mut(&resource.uuid) {
            Some(mut stored) => {
                *stored = resource.clone();
                Ok(())
            }
            None => Err(PortsError::not_found("Resource", resource.uuid.as_str())),
        }
    }

    async fn delete(&self, uuid: &ResourceKey) -> Result<bool, PortsError> {
        Ok(self.resources.remove(uuid).is_some())
    }
}
