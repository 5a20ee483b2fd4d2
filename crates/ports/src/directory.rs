//! User directory port.
//!
//! Resolves usernames to [`Principal`]s. Authentication itself happens
//! upstream; this port only answers who a named user is.

use std::collections::BTreeSet;

use async_trait::async_trait;
use geocat_core::Principal;

use crate::error::PortsError;

/// Lookup of users, their groups, and their administrator flags.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// The principal for `username`, `None` if there is no such user.
    async fn principal(&self, username: &str) -> Result<Option<Principal>, PortsError>;

    /// Usernames of every superuser and staff member.
    async fn admins(&self) -> Result<BTreeSet<String>, PortsError>;

    /// Resolve an optional username; absent means anonymous. An unknown name
    /// resolves to a plain authenticated user with no groups.
    async fn resolve(&self, username: Option<&str>) -> Result<Principal, PortsError> {
        match username {
            None => Ok(Principal::anonymous()),
            Some(name) => Ok(self
                .principal(name)
                .await?
                .unwrap_or_else(|| Principal::user(name))),
        }
    }
}
