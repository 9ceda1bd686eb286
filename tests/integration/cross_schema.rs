//! Moving entities between schemas, enabled and disabled.

use crate::common::builders::container_dn;
use crate::common::{MetaEntryBuilder, dn, oid_rdn, service};
use meta_schema::entry::Entry;
use meta_schema::error::SchemaError;
use meta_schema::handlers::ChangeOutcome;
use meta_schema::objects::SchemaObjectType;
use meta_schema::service::{SchemaChange, SchemaService};

fn move_to(service: &SchemaService, entry: Entry, schema: &str) -> Result<ChangeOutcome, SchemaError> {
    service.handle(
        SchemaChange::Move {
            entry,
            new_parent: container_dn(SchemaObjectType::Comparator, schema),
            new_rdn: None,
            delete_old_rdn: false,
            cascade: false,
        }
        .into(),
    )
}

#[test]
fn test_move_into_disabled_schema_withdraws() {
    let service = service();
    let entry = MetaEntryBuilder::comparator("core", "1.2.3.4").build();
    service.handle(SchemaChange::Add { entry: entry.clone() }.into()).unwrap();

    assert_eq!(move_to(&service, entry, "legacy").unwrap(), ChangeOutcome::Modified);
    assert!(!service.registries().comparators().has("1.2.3.4"));
    assert!(!service.registries().oid_registry().has_oid("1.2.3.4"));
}

#[test]
fn test_move_out_of_disabled_schema_publishes() {
    let service = service();
    let entry = MetaEntryBuilder::comparator("legacy", "1.2.3.4").build();
    assert_eq!(
        service.handle(SchemaChange::Add { entry: entry.clone() }.into()).unwrap(),
        ChangeOutcome::Unchanged
    );

    assert_eq!(move_to(&service, entry, "nis").unwrap(), ChangeOutcome::Modified);
    let comparators = service.registries().comparators();
    assert_eq!(comparators.schema_name("1.2.3.4").unwrap(), "nis");
    assert_eq!(comparators.description("1.2.3.4").unwrap().schema_name(), Some("nis"));
}

#[test]
fn test_move_between_disabled_schemas_changes_nothing() {
    let service = service();
    service.loader().set_disabled("nis", true).unwrap();
    let entry = MetaEntryBuilder::comparator("legacy", "1.2.3.4").build();

    assert_eq!(move_to(&service, entry, "nis").unwrap(), ChangeOutcome::Unchanged);
    assert!(service.registries().is_empty());
}

#[test]
fn test_move_and_rename_across_schemas() {
    let service = service();
    let entry = MetaEntryBuilder::comparator("core", "1.2.3.4")
        .with_name("exactMatch")
        .build();
    service.handle(SchemaChange::Add { entry: entry.clone() }.into()).unwrap();

    service
        .handle(
            SchemaChange::Move {
                entry,
                new_parent: container_dn(SchemaObjectType::Comparator, "nis"),
                new_rdn: Some(oid_rdn("1.2.3.5")),
                delete_old_rdn: true,
                cascade: false,
            }
            .into(),
        )
        .unwrap();

    let comparators = service.registries().comparators();
    assert!(!comparators.has("1.2.3.4"));
    assert_eq!(comparators.schema_name("exactMatch").unwrap(), "nis");
    assert_eq!(comparators.lookup("exactMatch").unwrap().oid().as_str(), "1.2.3.5");
}

#[test]
fn test_move_refuses_wrong_container() {
    let service = service();
    let entry = MetaEntryBuilder::comparator("core", "1.2.3.4").build();
    service.handle(SchemaChange::Add { entry: entry.clone() }.into()).unwrap();

    let err = service
        .handle(
            SchemaChange::Move {
                entry,
                new_parent: dn("ou=normalizers,cn=nis,ou=schema"),
                new_rdn: None,
                delete_old_rdn: false,
                cascade: false,
            }
            .into(),
        )
        .unwrap_err();
    assert!(err.is_naming_violation());
    assert_eq!(service.registries().comparators().schema_name("1.2.3.4").unwrap(), "core");
}

#[test]
fn test_move_and_rename_onto_taken_oid() {
    let service = service();
    let first = MetaEntryBuilder::comparator("core", "1.2.3.4").build();
    let second = MetaEntryBuilder::comparator("nis", "1.2.3.5").build();
    service.handle(SchemaChange::Add { entry: first.clone() }.into()).unwrap();
    service.handle(SchemaChange::Add { entry: second }.into()).unwrap();
    let fingerprint = service.registries().fingerprint().unwrap();

    let err = service
        .handle(
            SchemaChange::Move {
                entry: first,
                new_parent: container_dn(SchemaObjectType::Comparator, "nis"),
                new_rdn: Some(oid_rdn("1.2.3.5")),
                delete_old_rdn: true,
                cascade: false,
            }
            .into(),
        )
        .unwrap_err();
    assert!(err.is_already_exists());
    assert_eq!(service.registries().fingerprint().unwrap(), fingerprint);
}

#[test]
fn test_move_into_unknown_schema() {
    let service = service();
    let entry = MetaEntryBuilder::comparator("core", "1.2.3.4").build();
    service.handle(SchemaChange::Add { entry: entry.clone() }.into()).unwrap();

    let err = move_to(&service, entry, "nowhere").unwrap_err();
    assert!(matches!(err, SchemaError::SchemaNotFound { .. }));
    assert!(service.registries().comparators().has("1.2.3.4"));
}
