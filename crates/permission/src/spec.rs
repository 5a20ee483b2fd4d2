//! The extended permission spec: subject → granular codenames.

use std::collections::{BTreeMap, BTreeSet};

use geocat_core::{Principal, Subject};
use serde::{Deserialize, Serialize};

use crate::compact::{CompactGrant, CompactPermissionSpec, CompactionContext};
use crate::role::Role;

/// A resource's full access matrix.
///
/// Subjects with no codenames are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSpec {
    grants: BTreeMap<Subject, BTreeSet<String>>,
}

impl PermissionSpec {
    /// An empty ACL.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add codenames to a subject's grant set.
    pub fn grant<I, S>(&mut self, subject: Subject, codenames: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.grants.entry(subject.clone()).or_default();
        entry.extend(codenames.into_iter().map(Into::into));
        if entry.is_empty() {
            self.grants.remove(&subject);
        }
    }

    /// Builder form of [`grant`](Self::grant).
    pub fn with<I, S>(mut self, subject: Subject, codenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.grant(subject, codenames);
        self
    }

    /// Codenames held by `subject`.
    #[must_use]
    pub fn get(&self, subject: &Subject) -> Option<&BTreeSet<String>> {
        self.grants.get(subject)
    }

    /// Drop every grant of `subject`.
    pub fn revoke(&mut self, subject: &Subject) -> Option<BTreeSet<String>> {
        self.grants.remove(subject)
    }

    /// Keep only the subjects for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&Subject) -> bool) {
        self.grants.retain(|subject, _| keep(subject));
    }

    /// Iterate `(subject, codenames)` in subject order.
    pub fn iter(&self) -> impl Iterator<Item = (&Subject, &BTreeSet<String>)> {
        self.grants.iter()
    }

    /// Number of subjects with at least one grant.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Whether nobody holds anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Codenames that apply to `principal` through its user entry, its
    /// groups, `registered-members` (if authenticated) and `AnonymousUser`.
    ///
    /// Ownership and administrator rights are not considered here.
    #[must_use]
    pub fn effective_for(&self, principal: &Principal) -> BTreeSet<String> {
        principal
            .subjects()
            .iter()
            .filter_map(|subject| self.grants.get(subject))
            .flatten()
            .cloned()
            .collect()
    }

    /// Compact this ACL into role assignments.
    ///
    /// Each subject gets the highest role its grants fully cover; uncovered
    /// grants are carried as `extra`. The owner and administrators are always
    /// `manage`, and the owner is present even without a stored grant.
    #[must_use]
    pub fn compact(&self, ctx: &CompactionContext<'_>) -> CompactPermissionSpec {
        let mut compact = CompactPermissionSpec::new();
        for (subject, codenames) in &self.grants {
            let grant = if ctx.is_privileged(subject) {
                CompactGrant::role(Role::Manage)
            } else {
                classify(ctx, subject, codenames)
            };
            compact.insert(subject.clone(), grant);
        }
        compact.insert(Subject::user(ctx.owner), CompactGrant::role(Role::Manage));
        compact
    }
}

fn classify(
    ctx: &CompactionContext<'_>,
    subject: &Subject,
    codenames: &BTreeSet<String>,
) -> CompactGrant {
    for role in Role::ALL.into_iter().rev() {
        if !ctx.table.allows_for(subject, role) {
            continue;
        }
        let Some(bundle) = ctx.table.bundle(role) else {
            continue;
        };
        if bundle.iter().all(|codename| codenames.contains(*codename)) {
            let extra = codenames
                .iter()
                .filter(|codename| !bundle.contains(codename.as_str()))
                .cloned()
                .collect();
            return CompactGrant {
                role: Some(role),
                extra,
            };
        }
    }
    CompactGrant {
        role: None,
        extra: codenames.clone(),
    }
}

impl<'a> IntoIterator for &'a PermissionSpec {
    type Item = (&'a Subject, &'a BTreeSet<String>);
    type IntoIter = std::collections::btree_map::Iter<'a, Subject, BTreeSet<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.grants.iter()
    }
}
