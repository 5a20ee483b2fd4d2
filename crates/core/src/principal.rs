//! The caller of an operation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::subject::Subject;

/// An authenticated (or anonymous) caller as resolved by the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Principal {
    /// `None` for the anonymous visitor.
    pub username: Option<String>,
    /// Groups the user is a member of.
    #[serde(default)]
    pub groups: BTreeSet<String>,
    /// Superusers hold every permission on every resource.
    #[serde(default)]
    pub is_superuser: bool,
    /// Staff are treated as administrators for resource permissions.
    #[serde(default)]
    pub is_staff: bool,
    /// The global `add_resourcebase` permission (create / ingest).
    #[serde(default)]
    pub can_add_resource: bool,
}

impl Principal {
    /// The unauthenticated visitor.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A plain authenticated user with no groups or global permissions.
    pub fn user(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    /// A superuser.
    pub fn superuser(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            is_superuser: true,
            can_add_resource: true,
            ..Self::default()
        }
    }

    /// Add a group membership.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.insert(group.into());
        self
    }

    /// Grant the global `add_resourcebase` permission.
    pub fn with_add_resource(mut self) -> Self {
        self.can_add_resource = true;
        self
    }

    /// Whether the caller logged in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }

    /// Superusers and staff.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_superuser || self.is_staff
    }

    /// Whether this principal is the named user.
    #[must_use]
    pub fn is(&self, username: &str) -> bool {
        self.username.as_deref() == Some(username)
    }

    /// Every subject whose grants apply to this principal.
    ///
    /// Anonymous grants apply to everyone; registered-members grants apply to
    /// every authenticated user.
    #[must_use]
    pub fn subjects(&self) -> Vec<Subject> {
        let mut subjects = vec![Subject::Anonymous];
        if let Some(username) = &self.username {
            subjects.push(Subject::RegisteredMembers);
            subjects.push(Subject::user(username.clone()));
            subjects.extend(self.groups.iter().cloned().map(Subject::Group));
        }
        subjects
    }
}
