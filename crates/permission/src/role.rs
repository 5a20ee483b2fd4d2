//! The compact role vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PermissionError;

/// A named bundle of codenames. Ordering is the privilege order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Read-only.
    View,
    /// Read and download.
    Download,
    /// Download plus edit rights.
    Edit,
    /// Edit plus ACL changes and deletion.
    Manage,
}

impl Role {
    /// All roles, lowest first.
    pub const ALL: [Self; 4] = [Self::View, Self::Download, Self::Edit, Self::Manage];

    /// The wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Download => "download",
            Self::Edit => "edit",
            Self::Manage => "manage",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "download" => Ok(Self::Download),
            "edit" => Ok(Self::Edit),
            "manage" => Ok(Self::Manage),
            other => Err(PermissionError::UnknownRole(other.to_owned())),
        }
    }
}
