//! One comparator through every operation the directory can apply to it.

use crate::common::{MetaEntryBuilder, dn, oid, oid_rdn, service};
use meta_schema::error::SchemaError;
use meta_schema::handlers::ChangeOutcome;
use meta_schema::objects::SchemaObjectType;
use meta_schema::service::{SchemaChange, SchemaChangeRequest};
use std::cmp::Ordering;

#[test]
fn test_add_modify_rename_delete() {
    let service = service();
    let comparators = service.registries().comparators();

    let entry = MetaEntryBuilder::comparator("core", "2.5.13.2")
        .with_name("caseIgnoreMatch")
        .build();
    let outcome = service
        .handle(
            SchemaChangeRequest::new(SchemaChange::Add { entry: entry.clone() })
                .with_request_id("add-1"),
        )
        .unwrap();
    assert_eq!(outcome, ChangeOutcome::Modified);
    assert!(comparators.has("caseIgnoreMatch"));
    assert_eq!(
        comparators.lookup("CASEIGNOREMATCH").unwrap().compare("a", "b"),
        Ordering::Less
    );

    // Swap the implementation in place.
    let target = MetaEntryBuilder::new(SchemaObjectType::Comparator, "core", "2.5.13.2")
        .with_name("caseIgnoreMatch")
        .with_fqcn("org.example.DeepTrimToLowerComparator")
        .build();
    service
        .handle(
            SchemaChange::Modify {
                entry: entry.clone(),
                target: target.clone(),
                cascade: false,
            }
            .into(),
        )
        .unwrap();
    let comparator = comparators.lookup("2.5.13.2").unwrap();
    assert_eq!(comparator.fqcn(), "org.example.DeepTrimToLowerComparator");
    assert_eq!(comparator.compare("  A  B", "a b"), Ordering::Equal);

    service
        .handle(
            SchemaChange::Rename {
                entry: target.clone(),
                new_rdn: oid_rdn("2.5.13.99"),
                cascade: false,
            }
            .into(),
        )
        .unwrap();
    assert!(!comparators.has("2.5.13.2"));
    assert_eq!(comparators.lookup("caseIgnoreMatch").unwrap().oid(), &oid("2.5.13.99"));

    let renamed = MetaEntryBuilder::comparator("core", "2.5.13.99")
        .with_name("caseIgnoreMatch")
        .build();
    service
        .handle(SchemaChange::Delete { entry: renamed, cascade: false }.into())
        .unwrap();
    assert!(comparators.is_empty());
    assert!(!service.registries().oid_registry().has_oid("caseIgnoreMatch"));
    assert_eq!(service.generation().counter(), 4);
}

#[test]
fn test_delete_of_unknown_comparator_is_a_no_op() {
    let service = service();
    let entry = MetaEntryBuilder::comparator("core", "1.2.3.4").build();
    let outcome = service
        .handle(SchemaChange::Delete { entry, cascade: false }.into())
        .unwrap();
    assert_eq!(outcome, ChangeOutcome::Unchanged);
    assert_eq!(service.generation().counter(), 0);
}

#[test]
fn test_rename_to_non_numeric_rdn_is_refused() {
    let service = service();
    let entry = MetaEntryBuilder::comparator("core", "1.2.3.4").build();
    service.handle(SchemaChange::Add { entry: entry.clone() }.into()).unwrap();

    let err = service
        .handle(
            SchemaChange::Rename {
                entry,
                new_rdn: meta_schema::naming::Rdn::new("m-oid", "notAnOid").unwrap(),
                cascade: false,
            }
            .into(),
        )
        .unwrap_err();
    assert!(matches!(err, SchemaError::Validation(_)));
    assert!(service.registries().comparators().has("1.2.3.4"));
}

#[test]
fn test_add_under_wrong_container_label() {
    let service = service();
    // Routed to the comparator handler by its container, but one level too deep.
    let entry = meta_schema::entry::Entry::new(dn(
        "m-oid=1.2.3.4,ou=comparators,ou=extra,cn=core,ou=schema",
    ))
    .with_attribute("m-oid", "1.2.3.4")
    .with_attribute("m-fqcn", "StringComparator");
    let err = service.handle(SchemaChange::Add { entry }.into()).unwrap_err();
    assert!(err.is_naming_violation());
    assert!(service.registries().comparators().is_empty());
}

#[test]
fn test_unknown_implementation_is_refused() {
    let service = service();
    let entry = MetaEntryBuilder::comparator("core", "1.2.3.4")
        .with_attribute("m-fqcn", "ignored-second-value")
        .build();
    // The first m-fqcn value wins.
    service.handle(SchemaChange::Add { entry }.into()).unwrap();

    let entry = MetaEntryBuilder::new(SchemaObjectType::Comparator, "core", "1.2.3.5")
        .with_fqcn("com.example.NoSuchComparator")
        .build();
    let err = service.handle(SchemaChange::Add { entry }.into()).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownImplementation { .. }));
    assert!(!service.registries().comparators().has("1.2.3.5"));
}

#[test]
fn test_bytecode_is_refused_by_default() {
    let service = service();
    let entry = MetaEntryBuilder::comparator("core", "1.2.3.4")
        .with_attribute("m-bytecode", vec![0xca_u8, 0xfe, 0xba, 0xbe])
        .build();
    let err = service.handle(SchemaChange::Add { entry }.into()).unwrap_err();
    assert!(matches!(err, SchemaError::BytecodeRejected { .. }));
}

#[test]
fn test_bytecode_is_kept_when_accepted() {
    let service = meta_schema::service::SchemaServiceBuilder::new()
        .with_bytecode_accepted(true)
        .build()
        .unwrap();
    let entry = MetaEntryBuilder::comparator("other", "1.2.3.4")
        .with_attribute("m-bytecode", vec![0xca_u8, 0xfe, 0xba, 0xbe])
        .build();
    service.handle(SchemaChange::Add { entry }.into()).unwrap();

    let description = service.registries().comparators().description("1.2.3.4").unwrap();
    assert_eq!(description.bytecode(), Some("yv66vg=="));
}
