//! Composable authorization predicates.
//!
//! Endpoints combine rules explicitly, e.g.
//! `is_admin().or(is_owner()).or(has_perm(CHANGE_RESOURCEBASE))`.

use std::collections::BTreeSet;

use geocat_core::Principal;
use geocat_permission::codename;

use crate::resource::Resource;

/// Every codename the principal holds on `resource`.
///
/// Administrators and the owner hold every codename; everyone else gets the
/// union of the ACL entries that apply to them.
#[must_use]
pub fn effective_permissions(principal: &Principal, resource: &Resource) -> BTreeSet<String> {
    if principal.is_admin() || principal.is(&resource.owner) {
        return codename::KNOWN.iter().map(|c| (*c).to_owned()).collect();
    }
    resource.acl.effective_for(principal)
}

/// A yes/no decision about a principal acting on a resource.
pub trait Rule: Send + Sync {
    /// Whether `principal` may act on `resource`.
    fn allows(&self, principal: &Principal, resource: &Resource) -> bool;
}

impl<F> Rule for F
where
    F: Fn(&Principal, &Resource) -> bool + Send + Sync,
{
    fn allows(&self, principal: &Principal, resource: &Resource) -> bool {
        self(principal, resource)
    }
}

/// Both rules must allow.
#[derive(Debug, Clone, Copy)]
pub struct And<A, B>(A, B);

/// Either rule may allow.
#[derive(Debug, Clone, Copy)]
pub struct Or<A, B>(A, B);

impl<A: Rule, B: Rule> Rule for And<A, B> {
    fn allows(&self, principal: &Principal, resource: &Resource) -> bool {
        self.0.allows(principal, resource) && self.1.allows(principal, resource)
    }
}

impl<A: Rule, B: Rule> Rule for Or<A, B> {
    fn allows(&self, principal: &Principal, resource: &Resource) -> bool {
        self.0.allows(principal, resource) || self.1.allows(principal, resource)
    }
}

/// `and` / `or` combinators for every rule.
pub trait RuleExt: Rule + Sized {
    /// Both `self` and `other`.
    fn and<R: Rule>(self, other: R) -> And<Self, R> {
        And(self, other)
    }

    /// Either `self` or `other`.
    fn or<R: Rule>(self, other: R) -> Or<Self, R> {
        Or(self, other)
    }
}

impl<T: Rule> RuleExt for T {}

/// Superusers and staff.
#[must_use]
pub fn is_admin() -> impl Rule + Copy {
    |principal: &Principal, _: &Resource| principal.is_admin()
}

/// The resource owner.
#[must_use]
pub fn is_owner() -> impl Rule + Copy {
    |principal: &Principal, resource: &Resource| principal.is(&resource.owner)
}

/// Holds `codename` through the ACL (or by being owner/admin).
#[must_use]
pub fn has_perm(codename: &'static str) -> impl Rule + Copy {
    move |principal: &Principal, resource: &Resource| {
        effective_permissions(principal, resource).contains(codename)
    }
}
