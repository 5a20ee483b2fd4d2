//! The ACL a new resource starts with.

use geocat_core::{ResourceType, Subject};
use geocat_permission::{PermissionSpec, PermissionTable, Role, codename};
use serde::{Deserialize, Serialize};

/// What anonymous visitors get on new resources. Configured in the
/// `permissions` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionDefaults {
    /// Grant `view_resourcebase` to `AnonymousUser`.
    pub anonymous_view: bool,
    /// Grant `download_resourcebase` to `AnonymousUser` where the type has it.
    pub anonymous_download: bool,
}

impl Default for PermissionDefaults {
    fn default() -> Self {
        Self {
            anonymous_view: true,
            anonymous_download: true,
        }
    }
}

impl PermissionDefaults {
    /// Owner `manage`, plus the configured anonymous grants.
    #[must_use]
    pub fn acl_for(&self, resource_type: ResourceType, owner: &str) -> PermissionSpec {
        let table = PermissionTable::for_type(resource_type);
        let mut acl = PermissionSpec::new();
        acl.grant(Subject::user(owner), table.bundle_owned(Role::Manage));

        let mut anonymous = Vec::new();
        if self.anonymous_view {
            anonymous.push(codename::VIEW_RESOURCEBASE);
        }
        if self.anonymous_download && table.has_download() {
            anonymous.push(codename::DOWNLOAD_RESOURCEBASE);
        }
        acl.grant(Subject::Anonymous, anonymous);
        acl
    }
}
