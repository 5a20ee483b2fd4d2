//! Permission engine errors.

use geocat_core::{ResourceType, Subject};

use crate::role::Role;

/// An incoming permission spec that cannot be applied.
///
/// Every variant is a caller mistake; none is retryable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionError {
    /// `AnonymousUser` or `registered-members` asked for `manage`.
    #[error("subject `{subject}` can never be granted manage")]
    ReservedSubjectManage {
        /// The reserved subject.
        subject: Subject,
    },

    /// The role is not offered for this resource type (e.g. `download` on a map).
    #[error("role `{role}` is not available for resource type `{resource_type}`")]
    RoleNotAllowed {
        /// Requested role.
        role: Role,
        /// Target resource type.
        resource_type: ResourceType,
    },

    /// A codename outside the known vocabulary.
    #[error("unknown permission codename `{codename}`")]
    UnknownCodename {
        /// The offending codename.
        codename: String,
    },

    /// A role name outside the vocabulary.
    #[error("unknown role `{0}`")]
    UnknownRole(String),

    /// The spec could not be parsed.
    #[error("malformed permission spec: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for PermissionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_reserved_subject() {
        let err = PermissionError::ReservedSubjectManage {
            subject: Subject::Anonymous,
        };
        assert_eq!(
            err.to_string(),
            "subject `AnonymousUser` can never be granted manage"
        );
    }

    #[test]
    fn display_role_not_allowed() {
        let err = PermissionError::RoleNotAllowed {
            role: Role::Download,
            resource_type: ResourceType::Map,
        };
        assert_eq!(
            err.to_string(),
            "role `download` is not available for resource type `map`"
        );
    }
}
