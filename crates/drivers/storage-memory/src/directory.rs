//! Fixed user table.

use std::collections::BTreeSet;

use async_trait::async_trait;
use dashmap::DashMap;
use geocat_core::Principal;
use geocat_ports::{PortsError, UserDirectory};

/// A user directory over an in-memory table of principals.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    users: DashMap<String, Principal>,
}

impl MemoryDirectory {
    /// An empty directory; every name resolves to a plain user.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a principal. Anonymous principals are ignored.
    pub fn insert(&self, principal: Principal) {
        if let Some(name) = principal.username.clone() {
            self.users.insert(name, principal);
        }
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_user(self, principal: Principal) -> Self {
        self.insert(principal);
        self
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn principal(&self, username: &str) -> Result<Option<Principal>, PortsError> {
        Ok(self.users.get(username).map(|entry| entry.value().clone()))
    }

    async fn admins(&self) -> Result<BTreeSet<String>, PortsError> {
        Ok(self
            .users
            .iter()
            .filter(|entry| entry.value().is_admin())
            .map(|entry| entry.key().clone())
            .collect())
    }
}
