//! Per-resource-type permission tables.
//!
//! | type | download | type-specific edit codenames |
//! |---|---|---|
//! | dataset (vector) | yes | `change_dataset_style`, `change_dataset_data` |
//! | dataset:raster | yes | `change_dataset_style` |
//! | dataset:remote | no | - |
//! | document | yes | - |
//! | map | no | - |
//! | geoapp | no | - |
//!
//! Bundles nest: `view ⊂ download ⊂ edit ⊂ manage`. Where `download` is not
//! offered, `edit` builds directly on `view`.

use std::collections::BTreeSet;

use geocat_core::{DatasetSubtype, ResourceType, Subject};

use crate::codename::{
    CHANGE_DATASET_DATA, CHANGE_DATASET_STYLE, CHANGE_RESOURCEBASE,
    CHANGE_RESOURCEBASE_PERMISSIONS, DELETE_RESOURCEBASE, DOWNLOAD_RESOURCEBASE,
    VIEW_RESOURCEBASE,
};
use crate::role::Role;

/// Roles and bundles for one concrete resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionTable {
    resource_type: ResourceType,
}

impl PermissionTable {
    /// The table for `resource_type`.
    #[must_use]
    pub fn for_type(resource_type: ResourceType) -> Self {
        Self { resource_type }
    }

    /// The resource type this table describes.
    #[must_use]
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Whether the type offers a download role at all.
    #[must_use]
    pub fn has_download(&self) -> bool {
        matches!(
            self.resource_type,
            ResourceType::Dataset(DatasetSubtype::Vector | DatasetSubtype::Raster)
                | ResourceType::Document
        )
    }

    /// Whether `role` exists for this type.
    #[must_use]
    pub fn allows(&self, role: Role) -> bool {
        role != Role::Download || self.has_download()
    }

    /// Whether `subject` may hold `role` on this type.
    #[must_use]
    pub fn allows_for(&self, subject: &Subject, role: Role) -> bool {
        self.allows(role) && !(subject.is_reserved() && role == Role::Manage)
    }

    /// Roles offered for this type, lowest first.
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|role| self.allows(*role))
    }

    /// Type-specific codenames added by `edit`.
    #[must_use]
    pub fn edit_extras(&self) -> &'static [&'static str] {
        match self.resource_type {
            ResourceType::Dataset(DatasetSubtype::Vector) => {
                &[CHANGE_DATASET_STYLE, CHANGE_DATASET_DATA]
            }
            ResourceType::Dataset(DatasetSubtype::Raster) => &[CHANGE_DATASET_STYLE],
            _ => &[],
        }
    }

    /// The codename bundle behind `role`, or `None` when the type does not
    /// offer the role.
    #[must_use]
    pub fn bundle(&self, role: Role) -> Option<BTreeSet<&'static str>> {
        if !self.allows(role) {
            return None;
        }
        let mut bundle = BTreeSet::from([VIEW_RESOURCEBASE]);
        if role == Role::View {
            return Some(bundle);
        }
        if self.has_download() {
            bundle.insert(DOWNLOAD_RESOURCEBASE);
        }
        if role == Role::Download {
            return Some(bundle);
        }
        bundle.insert(CHANGE_RESOURCEBASE);
        bundle.extend(self.edit_extras());
        if role == Role::Edit {
            return Some(bundle);
        }
        bundle.insert(CHANGE_RESOURCEBASE_PERMISSIONS);
        bundle.insert(DELETE_RESOURCEBASE);
        Some(bundle)
    }

    /// Owned copy of a bundle; empty when the role is not offered.
    #[must_use]
    pub fn bundle_owned(&self, role: Role) -> BTreeSet<String> {
        self.bundle(role)
            .unwrap_or_default()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Every codename any role of this type grants.
    #[must_use]
    pub fn codenames(&self) -> BTreeSet<&'static str> {
        self.bundle(Role::Manage).unwrap_or_default()
    }
}
