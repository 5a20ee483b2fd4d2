//! The resource manager: every mutation a handler performs goes through here.
//!
//! Each mutation is a single repository write of the whole record; the
//! matching [`ResourceEvent`] is emitted only after that write commits.

use std::collections::BTreeSet;
use std::sync::Arc;

use geocat_core::{Principal, ResourceKey, Subject};
use geocat_permission::{
    CompactPermissionSpec, CompactionContext, PermissionTable, PermissionsInput, Role,
};
use geocat_ports::{PortsError, UserDirectory};
use geocat_telemetry::{EventBus, ResourceEvent};
use serde_json::{Map, Value};

use crate::defaults::PermissionDefaults;
use crate::error::CatalogError;
use crate::policy;
use crate::repo::ResourceRepo;
use crate::resource::{NewResource, Resource, ResourcePatch};

/// Outcome of an ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingested {
    /// A new resource was created.
    Created,
    /// An existing resource was refreshed.
    Updated,
}

/// Performs resource mutations and emits their events.
pub struct ResourceManager {
    repo: Arc<dyn ResourceRepo>,
    directory: Arc<dyn UserDirectory>,
    events: Arc<EventBus<ResourceEvent>>,
    defaults: PermissionDefaults,
}

impl ResourceManager {
    /// Wire a manager over its collaborators.
    pub fn new(
        repo: Arc<dyn ResourceRepo>,
        directory: Arc<dyn UserDirectory>,
        events: Arc<EventBus<ResourceEvent>>,
        defaults: PermissionDefaults,
    ) -> Self {
        Self {
            repo,
            directory,
            events,
            defaults,
        }
    }

    /// The resource event bus.
    #[must_use]
    pub fn events(&self) -> &Arc<EventBus<ResourceEvent>> {
        &self.events
    }

    /// The configured default ACL policy.
    #[must_use]
    pub fn defaults(&self) -> PermissionDefaults {
        self.defaults
    }

    /// Load a resource.
    pub async fn get(&self, uuid: &ResourceKey) -> Result<Resource, CatalogError> {
        self.repo
            .get(uuid)
            .await?
            .ok_or_else(|| CatalogError::NotFound(uuid.clone()))
    }

    /// Load a resource if it exists.
    pub async fn find(&self, uuid: &ResourceKey) -> Result<Option<Resource>, CatalogError> {
        Ok(self.repo.get(uuid).await?)
    }

    /// Create a resource with the default ACL.
    pub async fn create(&self, new: NewResource) -> Result<Resource, CatalogError> {
        let acl = self.defaults.acl_for(new.resource_type, &new.owner);
        let resource = Resource::new(new, acl);
        match self.repo.insert(&resource).await {
            Ok(()) => {}
            Err(PortsError::AlreadyExists { .. }) => {
                return Err(CatalogError::DuplicateResource(resource.uuid));
            }
            Err(err) => return Err(err.into()),
        }
        tracing::info!(uuid = %resource.uuid, resource_type = %resource.resource_type, "resource created");
        self.events.emit(ResourceEvent::Created {
            uuid: resource.uuid.clone(),
            resource_type: resource.resource_type,
            owner: resource.owner.clone(),
        });
        Ok(resource)
    }

    /// Create, or refresh files, title and metadata of an existing resource
    /// with the same uuid.
    pub async fn ingest(&self, new: NewResource) -> Result<(Resource, Ingested), CatalogError> {
        let Some(mut existing) = self.repo.get(&new.uuid).await? else {
            return Ok((self.create(new).await?, Ingested::Created));
        };
        if existing.resource_type != new.resource_type {
            return Err(CatalogError::InvalidInput(format!(
                "resource {} is a {}, not a {}",
                existing.uuid, existing.resource_type, new.resource_type
            )));
        }
        existing.files = new.files;
        if let Some(title) = new.title {
            existing.title = title;
        }
        existing.apply(ResourcePatch {
            vals: Some(new.metadata),
            ..ResourcePatch::default()
        });
        self.repo.save(&existing).await?;
        tracing::info!(uuid = %existing.uuid, "resource re-ingested");
        self.events.emit(ResourceEvent::Updated {
            uuid: existing.uuid.clone(),
            notify: false,
        });
        Ok((existing, Ingested::Updated))
    }

    /// Apply a partial update.
    pub async fn update(
        &self,
        uuid: &ResourceKey,
        patch: ResourcePatch,
        notify: bool,
    ) -> Result<Resource, CatalogError> {
        let mut resource = self.get(uuid).await?;
        resource.apply(patch);
        self.repo.save(&resource).await?;
        self.events.emit(ResourceEvent::Updated {
            uuid: resource.uuid.clone(),
            notify,
        });
        Ok(resource)
    }

    /// Delete a resource. Returns how many were deleted (0 or 1).
    pub async fn delete(&self, uuid: &ResourceKey) -> Result<u64, CatalogError> {
        if !self.repo.delete(uuid).await? {
            tracing::debug!(uuid = %uuid, "delete of absent resource");
            return Ok(0);
        }
        self.events.emit(ResourceEvent::Deleted { uuid: uuid.clone() });
        Ok(1)
    }

    /// Copy `instance` under a fresh uuid for `owner`, overlaying `overrides`
    /// on the source metadata. The copy gets the default ACL.
    pub async fn copy(
        &self,
        instance: &ResourceKey,
        owner: &str,
        overrides: Map<String, Value>,
    ) -> Result<Resource, CatalogError> {
        let source = self.get(instance).await?;
        let title = overrides
            .get("title")
            .and_then(Value::as_str)
            .map_or_else(|| source.title.clone(), str::to_owned);
        let mut metadata = source.metadata.clone();
        metadata.extend(overrides);

        let new = NewResource {
            uuid: ResourceKey::generate(),
            resource_type: source.resource_type,
            owner: owner.to_owned(),
            title: Some(title),
            metadata,
            files: source.files.clone(),
        };
        let acl = self.defaults.acl_for(new.resource_type, owner);
        let mut copy = Resource::new(new, acl);
        copy.source = Some(source.uuid.clone());
        self.repo.insert(&copy).await?;
        self.events.emit(ResourceEvent::Copied {
            uuid: copy.uuid.clone(),
            source: source.uuid,
        });
        Ok(copy)
    }

    /// Replace the whole ACL. `None` applies the default ACL. `owner` becomes
    /// the owner and always keeps the `manage` bundle.
    pub async fn set_permissions(
        &self,
        uuid: &ResourceKey,
        owner: &str,
        permissions: Option<&PermissionsInput>,
    ) -> Result<Resource, CatalogError> {
        let mut resource = self.get(uuid).await?;
        let mut acl = match permissions {
            Some(input) => input.to_extended(resource.resource_type)?,
            None => self.defaults.acl_for(resource.resource_type, owner),
        };
        let table = PermissionTable::for_type(resource.resource_type);
        acl.grant(Subject::user(owner), table.bundle_owned(Role::Manage));

        resource.owner = owner.to_owned();
        resource.acl = acl;
        resource.last_updated = chrono::Utc::now();
        self.repo.save(&resource).await?;
        self.events.emit(ResourceEvent::PermissionsChanged {
            uuid: resource.uuid.clone(),
        });
        Ok(resource)
    }

    /// Strip every grant except the owner's and the administrators'.
    pub async fn remove_permissions(&self, uuid: &ResourceKey) -> Result<Resource, CatalogError> {
        let mut resource = self.get(uuid).await?;
        let admins = self.directory.admins().await?;
        let owner = resource.owner.clone();
        resource.acl.retain(|subject| {
            subject
                .username()
                .is_some_and(|name| name == owner || admins.contains(name))
        });
        let table = PermissionTable::for_type(resource.resource_type);
        resource
            .acl
            .grant(Subject::user(owner), table.bundle_owned(Role::Manage));
        resource.last_updated = chrono::Utc::now();
        self.repo.save(&resource).await?;
        self.events.emit(ResourceEvent::PermissionsChanged {
            uuid: resource.uuid.clone(),
        });
        Ok(resource)
    }

    /// The resource's ACL in compact form.
    pub async fn compact_permissions(
        &self,
        resource: &Resource,
    ) -> Result<CompactPermissionSpec, CatalogError> {
        let admins: BTreeSet<String> = self.directory.admins().await?;
        let ctx = CompactionContext::new(resource.resource_type, &resource.owner, &admins);
        Ok(resource.acl.compact(&ctx))
    }

    /// The grants actually stored on the resource, in compact form. Only the
    /// owner is reported as `manage` unconditionally; administrators show
    /// what they were granted. Partial updates merge into this.
    #[must_use]
    pub fn stored_permissions(&self, resource: &Resource) -> CompactPermissionSpec {
        let no_admins = BTreeSet::new();
        let ctx = CompactionContext::new(resource.resource_type, &resource.owner, &no_admins);
        resource.acl.compact(&ctx)
    }

    /// Codenames `principal` effectively holds on `resource`.
    #[must_use]
    pub fn effective_permissions(
        &self,
        principal: &Principal,
        resource: &Resource,
    ) -> BTreeSet<String> {
        policy::effective_permissions(principal, resource)
    }
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}
