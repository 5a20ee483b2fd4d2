//! The compact permission spec: subject → role (+ extras).

use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

use geocat_core::{ResourceType, Subject};
use serde::{Deserialize, Serialize};

use crate::codename::{self, MANAGE_ONLY};
use crate::error::PermissionError;
use crate::role::Role;
use crate::spec::PermissionSpec;
use crate::table::PermissionTable;

/// One subject's entry in a compact spec.
///
/// Wire form is the bare role name when there are no extras, otherwise
/// `{"role": "view", "extra": ["change_dataset_style"]}`. `role` is `null`
/// when the subject's grants cover no bundle at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GrantRepr", into = "GrantRepr")]
pub struct CompactGrant {
    /// Highest role whose bundle the grants cover.
    pub role: Option<Role>,
    /// Grants outside that bundle.
    pub extra: BTreeSet<String>,
}

impl CompactGrant {
    /// A plain role with no extras.
    #[must_use]
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            extra: BTreeSet::new(),
        }
    }

    /// Attach extra codenames.
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra.extend(extra.into_iter().map(Into::into));
        self
    }

    /// Max role, union of extras.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            role: self.role.max(other.role),
            extra: self.extra.union(&other.extra).cloned().collect(),
        }
    }

    /// Whether the grant amounts to `manage` in any form.
    fn requests_manage(&self) -> bool {
        self.role == Some(Role::Manage) || holds_manage_only(&self.extra)
    }
}

pub(crate) fn holds_manage_only(codenames: &BTreeSet<String>) -> bool {
    MANAGE_ONLY.iter().all(|c| codenames.contains(*c))
}

pub(crate) fn check_codenames<'a>(
    codenames: impl IntoIterator<Item = &'a String>,
) -> Result<(), PermissionError> {
    for codename in codenames {
        if !codename::is_known(codename) {
            return Err(PermissionError::UnknownCodename {
                codename: codename.clone(),
            });
        }
    }
    Ok(())
}

/// Bundle ∪ extras for one validated grant.
pub(crate) fn expand_grant(
    table: PermissionTable,
    grant: &CompactGrant,
) -> Result<BTreeSet<String>, PermissionError> {
    check_codenames(&grant.extra)?;
    let mut codenames = match grant.role {
        Some(role) if !table.allows(role) => {
            return Err(PermissionError::RoleNotAllowed {
                role,
                resource_type: table.resource_type(),
            });
        }
        Some(role) => table.bundle_owned(role),
        None => BTreeSet::new(),
    };
    codenames.extend(grant.extra.iter().cloned());
    Ok(codenames)
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum GrantRepr {
    Role(Role),
    Detailed {
        role: Option<Role>,
        #[serde(default)]
        extra: BTreeSet<String>,
    },
}

impl From<GrantRepr> for CompactGrant {
    fn from(repr: GrantRepr) -> Self {
        match repr {
            GrantRepr::Role(role) => Self::role(role),
            GrantRepr::Detailed { role, extra } => Self { role, extra },
        }
    }
}

impl From<CompactGrant> for GrantRepr {
    fn from(grant: CompactGrant) -> Self {
        match grant.role {
            Some(role) if grant.extra.is_empty() => Self::Role(role),
            role => Self::Detailed {
                role,
                extra: grant.extra,
            },
        }
    }
}

/// What compaction needs to know beyond the grants themselves.
#[derive(Debug, Clone, Copy)]
pub struct CompactionContext<'a> {
    /// Table of the resource's concrete type.
    pub table: PermissionTable,
    /// Username of the resource owner.
    pub owner: &'a str,
    /// Usernames of superusers and staff.
    pub admins: &'a BTreeSet<String>,
}

impl<'a> CompactionContext<'a> {
    /// Context for a resource of `resource_type` owned by `owner`.
    #[must_use]
    pub fn new(resource_type: ResourceType, owner: &'a str, admins: &'a BTreeSet<String>) -> Self {
        Self {
            table: PermissionTable::for_type(resource_type),
            owner,
            admins,
        }
    }

    /// The owner and administrators always compact to `manage`.
    #[must_use]
    pub fn is_privileged(&self, subject: &Subject) -> bool {
        subject
            .username()
            .is_some_and(|name| name == self.owner || self.admins.contains(name))
    }
}

/// A resource ACL in the role vocabulary. This is the wire representation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompactPermissionSpec(BTreeMap<Subject, CompactGrant>);

impl CompactPermissionSpec {
    /// An empty spec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a subject's grant, replacing any previous one.
    pub fn insert(&mut self, subject: Subject, grant: CompactGrant) -> Option<CompactGrant> {
        self.0.insert(subject, grant)
    }

    /// Builder form of [`insert`](Self::insert) for a plain role.
    #[must_use]
    pub fn with_role(mut self, subject: Subject, role: Role) -> Self {
        self.0.insert(subject, CompactGrant::role(role));
        self
    }

    /// A subject's grant.
    #[must_use]
    pub fn get(&self, subject: &Subject) -> Option<&CompactGrant> {
        self.0.get(subject)
    }

    /// A subject's role, `None` when absent or role-less.
    #[must_use]
    pub fn role_of(&self, subject: &Subject) -> Option<Role> {
        self.0.get(subject).and_then(|grant| grant.role)
    }

    /// Drop a subject.
    pub fn remove(&mut self, subject: &Subject) -> Option<CompactGrant> {
        self.0.remove(subject)
    }

    /// Iterate in subject order.
    pub fn iter(&self) -> btree_map::Iter<'_, Subject, CompactGrant> {
        self.0.iter()
    }

    /// Number of subjects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no subjects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reject `manage` for reserved subjects, in role or codename form.
    ///
    /// Needs no resource type, so callers can reject such a request before
    /// looking anything up.
    pub fn check_reserved(&self) -> Result<(), PermissionError> {
        match self
            .0
            .iter()
            .find(|(subject, grant)| subject.is_reserved() && grant.requests_manage())
        {
            Some((subject, _)) => Err(PermissionError::ReservedSubjectManage {
                subject: subject.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Full validation against a resource type: reserved subjects, roles
    /// offered by the type, and known extra codenames.
    pub fn validate(&self, resource_type: ResourceType) -> Result<(), PermissionError> {
        self.check_reserved()?;
        let table = PermissionTable::for_type(resource_type);
        for grant in self.0.values() {
            expand_grant(table, grant)?;
        }
        Ok(())
    }

    /// Expand every role to its bundle for `resource_type` and add extras.
    ///
    /// Invalid specs are rejected, never downgraded.
    pub fn expand(&self, resource_type: ResourceType) -> Result<PermissionSpec, PermissionError> {
        self.check_reserved()?;
        let table = PermissionTable::for_type(resource_type);
        let mut spec = PermissionSpec::new();
        for (subject, grant) in &self.0 {
            spec.grant(subject.clone(), expand_grant(table, grant)?);
        }
        Ok(spec)
    }

    /// PATCH semantics: per subject the higher role and the union of extras.
    ///
    /// Only ever grows access. Commutative and idempotent.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = self.0.clone();
        for (subject, grant) in &other.0 {
            merged
                .entry(subject.clone())
                .and_modify(|existing| *existing = existing.merge(grant))
                .or_insert_with(|| grant.clone());
        }
        Self(merged)
    }
}

impl FromIterator<(Subject, CompactGrant)> for CompactPermissionSpec {
    fn from_iter<T: IntoIterator<Item = (Subject, CompactGrant)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for CompactPermissionSpec {
    type Item = (Subject, CompactGrant);
    type IntoIter = btree_map::IntoIter<Subject, CompactGrant>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CompactPermissionSpec {
    type Item = (&'a Subject, &'a CompactGrant);
    type IntoIter = btree_map::Iter<'a, Subject, CompactGrant>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codename::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn plain_role_serializes_as_a_string() {
        let spec = CompactPermissionSpec::new()
            .with_role(Subject::user("alice"), Role::Manage)
            .with_role(Subject::group("editors"), Role::Edit);
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({"alice": "manage", "group:editors": "edit"})
        );
    }

    #[test]
    fn grant_with_extras_serializes_as_an_object() {
        let grant = CompactGrant::role(Role::View).with_extra([PUBLISH_RESOURCEBASE]);
        assert_eq!(
            serde_json::to_value(&grant).unwrap(),
            json!({"role": "view", "extra": ["publish_resourcebase"]})
        );

        let roleless = CompactGrant {
            role: None,
            extra: BTreeSet::from([DOWNLOAD_RESOURCEBASE.to_owned()]),
        };
        assert_eq!(
            serde_json::to_value(&roleless).unwrap(),
            json!({"role": null, "extra": ["download_resourcebase"]})
        );
    }

    #[test]
    fn both_wire_forms_parse() {
        let spec: CompactPermissionSpec = serde_json::from_value(json!({
            "alice": "manage",
            "bob": {"role": "download"},
            "AnonymousUser": {"role": "view", "extra": ["feature_resourcebase"]},
        }))
        .unwrap();
        assert_eq!(spec.role_of(&Subject::user("alice")), Some(Role::Manage));
        assert_eq!(
            spec.get(&Subject::user("bob")),
            Some(&CompactGrant::role(Role::Download))
        );
        assert_eq!(
            spec.get(&Subject::Anonymous).unwrap().extra,
            BTreeSet::from([FEATURE_RESOURCEBASE.to_owned()])
        );
    }

    #[test]
    fn unknown_role_name_fails_to_parse() {
        let parsed = serde_json::from_value::<CompactPermissionSpec>(json!({"bob": "owner"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn reserved_manage_is_rejected_not_downgraded() {
        let spec = CompactPermissionSpec::new().with_role(Subject::Anonymous, Role::Manage);
        assert_eq!(
            spec.expand(ResourceType::VECTOR),
            Err(PermissionError::ReservedSubjectManage {
                subject: Subject::Anonymous
            })
        );
    }

    #[test]
    fn reserved_manage_in_codename_form_is_rejected() {
        let mut spec = CompactPermissionSpec::new();
        spec.insert(
            Subject::RegisteredMembers,
            CompactGrant::role(Role::Edit).with_extra(MANAGE_ONLY),
        );
        assert!(matches!(
            spec.check_reserved(),
            Err(PermissionError::ReservedSubjectManage { .. })
        ));
    }

    #[test]
    fn role_not_offered_by_type_is_rejected() {
        let spec = CompactPermissionSpec::new().with_role(Subject::user("bob"), Role::Download);
        assert_eq!(
            spec.validate(ResourceType::Map),
            Err(PermissionError::RoleNotAllowed {
                role: Role::Download,
                resource_type: ResourceType::Map,
            })
        );
        assert!(spec.validate(ResourceType::Document).is_ok());
    }

    #[test]
    fn unknown_extra_is_rejected() {
        let mut spec = CompactPermissionSpec::new();
        spec.insert(
            Subject::user("bob"),
            CompactGrant::role(Role::View).with_extra(["drop_table"]),
        );
        assert_eq!(
            spec.validate(ResourceType::VECTOR),
            Err(PermissionError::UnknownCodename {
                codename: "drop_table".into()
            })
        );
    }

    #[test]
    fn expansion_uses_type_bundles() {
        let spec = CompactPermissionSpec::new()
            .with_role(Subject::user("alice"), Role::Manage)
            .with_role(Subject::user("bob"), Role::View);
        let extended = spec.expand(ResourceType::VECTOR).unwrap();
        assert_eq!(
            extended.get(&Subject::user("bob")),
            Some(&BTreeSet::from([VIEW_RESOURCEBASE.to_owned()]))
        );
        assert_eq!(extended.get(&Subject::user("alice")).map(BTreeSet::len), Some(7));
    }

    #[test]
    fn merge_takes_higher_role_and_keeps_one_sided_subjects() {
        let current = CompactPermissionSpec::new()
            .with_role(Subject::user("alice"), Role::Manage)
            .with_role(Subject::user("bob"), Role::View);
        let patch = CompactPermissionSpec::new()
            .with_role(Subject::user("bob"), Role::Download)
            .with_role(Subject::user("carol"), Role::View);
        let merged = current.merge(&patch);
        assert_eq!(merged.role_of(&Subject::user("alice")), Some(Role::Manage));
        assert_eq!(merged.role_of(&Subject::user("bob")), Some(Role::Download));
        assert_eq!(merged.role_of(&Subject::user("carol")), Some(Role::View));
    }

    #[test]
    fn merge_never_downgrades() {
        let current = CompactPermissionSpec::new().with_role(Subject::user("bob"), Role::Edit);
        let patch = CompactPermissionSpec::new().with_role(Subject::user("bob"), Role::View);
        assert_eq!(
            current.merge(&patch).role_of(&Subject::user("bob")),
            Some(Role::Edit)
        );
    }
}
