//! Administrative roles and the regions subentries select.

use crate::common::dn;
use meta_schema::entry::Entry;
use meta_schema::error::ValidationError;
use meta_schema::subentry::{AdministrativeRole, Subentry, SubentryCache, SubtreeSpecification};
use proptest::prelude::*;
use proptest::sample::subsequence;
use std::collections::HashSet;

fn role_sets() -> impl Strategy<Value = Vec<AdministrativeRole>> {
    subsequence(AdministrativeRole::ALL.to_vec(), 1..=AdministrativeRole::ALL.len())
}

proptest! {
    #[test]
    fn prop_predicates_follow_role_membership(roles in role_sets()) {
        let subentry = Subentry::new(SubtreeSpecification::new(), roles.iter().copied()).unwrap();
        let held: HashSet<_> = roles.iter().copied().collect();

        prop_assert_eq!(subentry.administrative_roles(), &held);
        prop_assert_eq!(
            subentry.is_collective_admin_role(),
            held.contains(&AdministrativeRole::Collective)
        );
        prop_assert_eq!(
            subentry.is_schema_admin_role(),
            held.contains(&AdministrativeRole::SubSchema)
        );
        prop_assert_eq!(
            subentry.is_access_control_admin_role(),
            held.contains(&AdministrativeRole::AccessControl)
        );
        prop_assert_eq!(
            subentry.is_triggers_admin_role(),
            held.contains(&AdministrativeRole::Triggers)
        );
    }

    #[test]
    fn prop_roles_read_from_object_classes(roles in role_sets()) {
        let object_classes: Vec<&str> = ["top", "subentry"]
            .into_iter()
            .chain(roles.iter().map(|r| r.object_class()))
            .collect();
        let entry = Entry::new(dn("cn=policy,dc=example,dc=com"))
            .with_values("objectClass", object_classes)
            .with_attribute("subtreeSpecification", "{}");

        let subentry = Subentry::from_entry(&entry).unwrap();
        let expected: HashSet<_> = roles.into_iter().collect();
        prop_assert_eq!(subentry.administrative_roles(), &expected);
    }

    #[test]
    fn prop_replacing_roles_never_empties(initial in role_sets(), replacement in role_sets()) {
        let mut subentry = Subentry::new(SubtreeSpecification::new(), initial.clone()).unwrap();
        prop_assert!(subentry.set_administrative_roles(HashSet::new()).is_err());
        prop_assert_eq!(subentry.administrative_roles().len(), initial.len());

        subentry.set_administrative_roles(replacement.iter().copied().collect()).unwrap();
        prop_assert_eq!(subentry.administrative_roles().len(), replacement.len());
    }
}

#[test]
fn test_subentry_without_roles() {
    let entry = Entry::new(dn("cn=policy,dc=example,dc=com"))
        .with_values("objectClass", ["top", "subentry"])
        .with_attribute("subtreeSpecification", "{}");
    let err = Subentry::from_entry(&entry).unwrap_err();
    assert!(matches!(
        err,
        meta_schema::error::SchemaError::Validation(ValidationError::EmptyAdministrativeRoles)
    ));
}

#[test]
fn test_cache_resolves_applicable_subentries() {
    let cache = SubentryCache::new();
    let acl = Subentry::new(
        r#"{ base "ou=people", specificExclusions { chopBefore: "ou=robots" } }"#
            .parse()
            .unwrap(),
        [AdministrativeRole::AccessControl],
    )
    .unwrap();
    let collective = Subentry::new(
        "{ minimum 1, maximum 1 }".parse().unwrap(),
        [AdministrativeRole::Collective, AdministrativeRole::AccessControl],
    )
    .unwrap();
    cache.add(dn("cn=people-acl,dc=example,dc=com"), acl);
    cache.add(dn("cn=top-level,dc=example,dc=com"), collective);

    let alice = dn("uid=alice,ou=people,dc=example,dc=com");
    assert_eq!(
        cache.applicable(&alice, AdministrativeRole::AccessControl),
        vec![dn("cn=people-acl,dc=example,dc=com")]
    );

    let people = dn("ou=people,dc=example,dc=com");
    assert_eq!(
        cache.applicable(&people, AdministrativeRole::AccessControl),
        vec![dn("cn=people-acl,dc=example,dc=com"), dn("cn=top-level,dc=example,dc=com")]
    );
    assert_eq!(
        cache.applicable(&people, AdministrativeRole::Collective),
        vec![dn("cn=top-level,dc=example,dc=com")]
    );

    let robot = dn("uid=r2,ou=robots,ou=people,dc=example,dc=com");
    assert!(cache.applicable(&robot, AdministrativeRole::AccessControl).is_empty());
}
