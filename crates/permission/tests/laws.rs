//! Property tests for the compact/expand/merge laws.
//!
//! - Round trip: `compact(expand(C)) == C` for canonical specs
//! - Merge is commutative and idempotent
//! - Merge never lowers a subject's role

use std::collections::BTreeSet;

use geocat_core::{DatasetSubtype, ResourceType, Subject};
use geocat_permission::codename::{
    APPROVE_RESOURCEBASE, CHANGE_RESOURCEBASE_METADATA, FEATURE_RESOURCEBASE,
    PUBLISH_RESOURCEBASE,
};
use geocat_permission::{
    CompactGrant, CompactPermissionSpec, CompactionContext, PermissionTable, Role,
};
use proptest::prelude::*;

const OWNER: &str = "alice";

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_subject() -> impl Strategy<Value = Subject> {
    prop_oneof![
        Just(Subject::Anonymous),
        Just(Subject::RegisteredMembers),
        Just(Subject::user("bob")),
        Just(Subject::user("carol")),
        Just(Subject::group("editors")),
        Just(Subject::group("viewers")),
    ]
}

fn arb_role() -> impl Strategy<Value = Option<Role>> {
    prop_oneof![
        Just(None),
        Just(Some(Role::View)),
        Just(Some(Role::Download)),
        Just(Some(Role::Edit)),
        Just(Some(Role::Manage)),
    ]
}

/// Codenames outside every bundle, so extras never complete a higher role.
fn arb_extras() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(
        prop_oneof![
            Just(CHANGE_RESOURCEBASE_METADATA.to_owned()),
            Just(PUBLISH_RESOURCEBASE.to_owned()),
            Just(APPROVE_RESOURCEBASE.to_owned()),
            Just(FEATURE_RESOURCEBASE.to_owned()),
        ],
        0..3,
    )
}

fn arb_resource_type() -> impl Strategy<Value = ResourceType> {
    prop_oneof![
        Just(ResourceType::VECTOR),
        Just(ResourceType::Dataset(DatasetSubtype::Raster)),
        Just(ResourceType::Dataset(DatasetSubtype::Remote)),
        Just(ResourceType::Document),
        Just(ResourceType::Map),
        Just(ResourceType::GeoApp),
    ]
}

/// Specs compaction itself could have produced for a resource of
/// `resource_type` owned by [`OWNER`] with no administrators.
fn arb_canonical_spec(resource_type: ResourceType) -> impl Strategy<Value = CompactPermissionSpec> {
    let table = PermissionTable::for_type(resource_type);
    prop::collection::btree_map(arb_subject(), (arb_role(), arb_extras()), 0..6).prop_map(
        move |entries| {
            let mut spec: CompactPermissionSpec = entries
                .into_iter()
                .filter(|(_, (role, extra))| role.is_some() || !extra.is_empty())
                .map(|(subject, (role, extra))| {
                    let role = match role {
                        Some(Role::Manage) if subject.is_reserved() => Some(Role::Edit),
                        Some(Role::Download) if !table.allows(Role::Download) => Some(Role::View),
                        other => other,
                    };
                    (subject, CompactGrant { role, extra })
                })
                .collect();
            spec.insert(Subject::user(OWNER), CompactGrant::role(Role::Manage));
            spec
        },
    )
}

fn arb_typed_canonical_spec() -> impl Strategy<Value = (ResourceType, CompactPermissionSpec)> {
    arb_resource_type().prop_flat_map(|resource_type| {
        (Just(resource_type), arb_canonical_spec(resource_type))
    })
}

/// Any well-formed spec; merge needs no canonical form.
fn arb_spec() -> impl Strategy<Value = CompactPermissionSpec> {
    prop::collection::btree_map(arb_subject(), (arb_role(), arb_extras()), 0..6).prop_map(
        |entries| {
            entries
                .into_iter()
                .map(|(subject, (role, extra))| (subject, CompactGrant { role, extra }))
                .collect()
        },
    )
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn compact_of_expand_is_identity((resource_type, spec) in arb_typed_canonical_spec()) {
        let admins = BTreeSet::new();
        let ctx = CompactionContext::new(resource_type, OWNER, &admins);
        let extended = spec.expand(resource_type).unwrap();
        prop_assert_eq!(extended.compact(&ctx), spec);
    }

    #[test]
    fn merge_is_commutative(a in arb_spec(), b in arb_spec()) {
        prop_assert_eq!(a.merge(&b), b.merge(&a));
    }

    #[test]
    fn merge_is_idempotent(a in arb_spec()) {
        prop_assert_eq!(a.merge(&a), a);
    }

    #[test]
    fn merge_never_lowers_a_role(a in arb_spec(), b in arb_spec()) {
        let merged = a.merge(&b);
        for (subject, _) in a.iter().chain(b.iter()) {
            let expected = a.role_of(subject).max(b.role_of(subject));
            prop_assert!(merged.role_of(subject) >= expected);
            prop_assert!(merged.get(subject).is_some());
        }
    }

    #[test]
    fn merge_keeps_every_extra(a in arb_spec(), b in arb_spec()) {
        let merged = a.merge(&b);
        for (subject, grant) in a.iter().chain(b.iter()) {
            let merged_extra = &merged.get(subject).unwrap().extra;
            prop_assert!(grant.extra.is_subset(merged_extra));
        }
    }
}
