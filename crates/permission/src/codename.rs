//! Granular permission codenames.

/// Read the resource.
pub const VIEW_RESOURCEBASE: &str = "view_resourcebase";
/// Download the resource's data.
pub const DOWNLOAD_RESOURCEBASE: &str = "download_resourcebase";
/// Change the resource.
pub const CHANGE_RESOURCEBASE: &str = "change_resourcebase";
/// Change the resource's ACL.
pub const CHANGE_RESOURCEBASE_PERMISSIONS: &str = "change_resourcebase_permissions";
/// Delete the resource.
pub const DELETE_RESOURCEBASE: &str = "delete_resourcebase";
/// Change a dataset's style.
pub const CHANGE_DATASET_STYLE: &str = "change_dataset_style";
/// Change a dataset's features.
pub const CHANGE_DATASET_DATA: &str = "change_dataset_data";
/// Change metadata only.
pub const CHANGE_RESOURCEBASE_METADATA: &str = "change_resourcebase_metadata";
/// Publish the resource.
pub const PUBLISH_RESOURCEBASE: &str = "publish_resourcebase";
/// Approve the resource.
pub const APPROVE_RESOURCEBASE: &str = "approve_resourcebase";
/// Feature the resource on the landing page.
pub const FEATURE_RESOURCEBASE: &str = "feature_resourcebase";
/// Global permission to create resources; never stored on a resource ACL.
pub const ADD_RESOURCEBASE: &str = "add_resourcebase";

/// Codenames granted only by `manage`. A reserved subject holding both is
/// asking for `manage` whatever form the request takes.
pub const MANAGE_ONLY: [&str; 2] = [CHANGE_RESOURCEBASE_PERMISSIONS, DELETE_RESOURCEBASE];

/// Every codename a resource ACL may carry.
pub const KNOWN: [&str; 11] = [
    VIEW_RESOURCEBASE,
    DOWNLOAD_RESOURCEBASE,
    CHANGE_RESOURCEBASE,
    CHANGE_RESOURCEBASE_PERMISSIONS,
    DELETE_RESOURCEBASE,
    CHANGE_DATASET_STYLE,
    CHANGE_DATASET_DATA,
    CHANGE_RESOURCEBASE_METADATA,
    PUBLISH_RESOURCEBASE,
    APPROVE_RESOURCEBASE,
    FEATURE_RESOURCEBASE,
];

/// Whether `codename` may appear on a resource ACL.
#[must_use]
pub fn is_known(codename: &str) -> bool {
    KNOWN.contains(&codename)
}
