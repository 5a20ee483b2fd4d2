//! Incoming permission specs, which may mix the extended and compact forms.

use std::collections::{BTreeMap, BTreeSet};

use geocat_core::{ResourceType, Subject};
use serde::{Deserialize, Serialize};

use crate::compact::{
    CompactGrant, CompactPermissionSpec, check_codenames, expand_grant, holds_manage_only,
};
use crate::error::PermissionError;
use crate::role::Role;
use crate::spec::PermissionSpec;
use crate::table::PermissionTable;

/// One subject's requested permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubjectPermissions {
    /// Extended form: explicit codenames.
    Codenames(BTreeSet<String>),
    /// Compact form: a role, optionally with extras.
    Grant(CompactGrant),
}

impl SubjectPermissions {
    fn requests_manage(&self) -> bool {
        match self {
            Self::Codenames(codenames) => holds_manage_only(codenames),
            Self::Grant(grant) => {
                grant.role == Some(Role::Manage) || holds_manage_only(&grant.extra)
            }
        }
    }
}

/// The `permissions` value of a `set_permissions` request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionsInput(BTreeMap<Subject, SubjectPermissions>);

impl PermissionsInput {
    /// Add or replace one subject's entry.
    #[must_use]
    pub fn with(mut self, subject: Subject, permissions: SubjectPermissions) -> Self {
        self.0.insert(subject, permissions);
        self
    }

    /// Whether no subject is named.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reject `manage` for a reserved subject in either form.
    pub fn check_reserved(&self) -> Result<(), PermissionError> {
        match self
            .0
            .iter()
            .find(|(subject, perms)| subject.is_reserved() && perms.requests_manage())
        {
            Some((subject, _)) => Err(PermissionError::ReservedSubjectManage {
                subject: subject.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Checks that need no resource type: reserved subjects and the codename
    /// vocabulary.
    pub fn check(&self) -> Result<(), PermissionError> {
        self.check_reserved()?;
        for perms in self.0.values() {
            match perms {
                SubjectPermissions::Codenames(codenames) => check_codenames(codenames)?,
                SubjectPermissions::Grant(grant) => check_codenames(&grant.extra)?,
            }
        }
        Ok(())
    }

    /// Resolve to the extended form for `resource_type`, validating every
    /// entry. Codename entries are taken verbatim; compact entries expand to
    /// their bundle plus extras.
    pub fn to_extended(&self, resource_type: ResourceType) -> Result<PermissionSpec, PermissionError> {
        self.check()?;
        let table = PermissionTable::for_type(resource_type);
        let mut spec = PermissionSpec::new();
        for (subject, perms) in &self.0 {
            let codenames = match perms {
                SubjectPermissions::Codenames(codenames) => codenames.clone(),
                SubjectPermissions::Grant(grant) => expand_grant(table, grant)?,
            };
            spec.grant(subject.clone(), codenames);
        }
        Ok(spec)
    }
}

impl From<CompactPermissionSpec> for PermissionsInput {
    fn from(spec: CompactPermissionSpec) -> Self {
        Self(
            spec.into_iter()
                .map(|(subject, grant)| (subject, SubjectPermissions::Grant(grant)))
                .collect(),
        )
    }
}

impl From<PermissionSpec> for PermissionsInput {
    fn from(spec: PermissionSpec) -> Self {
        Self(
            spec.iter()
                .map(|(subject, codenames)| {
                    (subject.clone(), SubjectPermissions::Codenames(codenames.clone()))
                })
                .collect(),
        )
    }
}
