//! The operation verbs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExecutionError;

/// Selects the handler that runs a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuncName {
    /// Create a new resource.
    Create,
    /// Create or refresh a resource from uploaded files.
    Ingest,
    /// Partially update a resource.
    Update,
    /// Delete a resource.
    Delete,
    /// Copy a resource under a fresh uuid.
    Copy,
    /// Replace a resource's ACL.
    SetPermissions,
    /// Strip a resource's ACL down to owner and administrators.
    RemovePermissions,
}

impl FuncName {
    /// Every verb.
    pub const ALL: [Self; 7] = [
        Self::Create,
        Self::Ingest,
        Self::Update,
        Self::Delete,
        Self::Copy,
        Self::SetPermissions,
        Self::RemovePermissions,
    ];

    /// The wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Ingest => "ingest",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Copy => "copy",
            Self::SetPermissions => "set_permissions",
            Self::RemovePermissions => "remove_permissions",
        }
    }

    /// Whether the verb mutates its target resource and therefore takes the
    /// per-resource lock. `copy` only reads its source.
    #[must_use]
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::Copy)
    }
}

impl fmt::Display for FuncName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuncName {
    type Err = ExecutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|func| func.as_str() == s)
            .ok_or_else(|| ExecutionError::UnknownFunction(s.to_owned()))
    }
}
