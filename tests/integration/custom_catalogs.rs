//! Catalogs supplied through the registries builder see every mutation.

use crate::common::recording::RecordingCatalog;
use crate::common::{MetaEntryBuilder, oid, oid_rdn, service_with};
use meta_schema::error::SchemaError;
use meta_schema::objects::{Comparator, ObjectPayload, SchemaObjectDescription, SchemaObjectType};
use meta_schema::registry::{OidRegistry, Registries};
use meta_schema::service::SchemaChange;
use std::sync::Arc;

#[test]
fn test_handlers_drive_injected_catalog() {
    let oid_registry = Arc::new(OidRegistry::bootstrapped());
    let comparators = Arc::new(RecordingCatalog::<Comparator>::new(Arc::clone(&oid_registry)));
    let registries = Registries::builder()
        .with_oid_registry(oid_registry)
        .with_comparators(comparators.clone())
        .build();
    let service = service_with(Arc::new(registries));

    let entry = MetaEntryBuilder::comparator("core", "1.2.3.4").build();
    service.handle(SchemaChange::Add { entry: entry.clone() }.into()).unwrap();
    service
        .handle(
            SchemaChange::Rename {
                entry,
                new_rdn: oid_rdn("1.2.3.5"),
                cascade: false,
            }
            .into(),
        )
        .unwrap();
    service
        .handle(
            SchemaChange::Delete {
                entry: MetaEntryBuilder::comparator("core", "1.2.3.5").build(),
                cascade: false,
            }
            .into(),
        )
        .unwrap();
    service.disable_schema("nis").unwrap();
    service.disable_schema("core").unwrap();

    assert_eq!(
        comparators.calls(),
        vec![
            "apply - -> 1.2.3.4".to_string(),
            "apply 1.2.3.4 -> 1.2.3.5".to_string(),
            "unregister 1.2.3.5".to_string(),
            "unregister schema nis".to_string(),
            "unregister schema core".to_string(),
        ]
    );
    assert!(service.registries().comparators().is_empty());
}

#[test]
fn test_refused_changes_never_reach_the_catalog() {
    let oid_registry = Arc::new(OidRegistry::bootstrapped());
    let comparators = Arc::new(RecordingCatalog::<Comparator>::new(Arc::clone(&oid_registry)));
    let registries = Registries::builder()
        .with_oid_registry(oid_registry)
        .with_comparators(comparators.clone())
        .build();
    let service = service_with(Arc::new(registries));

    let entry = MetaEntryBuilder::comparator("core", "1.2.3.4").build();
    service.handle(SchemaChange::Add { entry: entry.clone() }.into()).unwrap();
    service
        .handle(
            SchemaChange::Add {
                entry: MetaEntryBuilder::matching_rule("core", "1.2.3.4").build(),
            }
            .into(),
        )
        .unwrap();

    assert!(service.handle(SchemaChange::Add { entry: entry.clone() }.into()).is_err());
    assert!(
        service
            .handle(SchemaChange::Delete { entry, cascade: true }.into())
            .is_err()
    );
    assert_eq!(comparators.calls(), vec!["apply - -> 1.2.3.4".to_string()]);
}

#[test]
fn test_enable_with_clashing_names_never_reaches_the_catalog() {
    let oid_registry = Arc::new(OidRegistry::bootstrapped());
    let comparators = Arc::new(RecordingCatalog::<Comparator>::new(Arc::clone(&oid_registry)));
    let registries = Registries::builder()
        .with_oid_registry(oid_registry)
        .with_comparators(comparators.clone())
        .build();
    let service = service_with(Arc::new(registries));

    let named = |value: &str| {
        SchemaObjectDescription::builder(
            SchemaObjectType::Comparator,
            oid(value),
            ObjectPayload::Implementation {
                fqcn: "StringComparator".to_string(),
                bytecode: None,
            },
        )
        .name("dup")
        .build()
        .unwrap()
    };
    let err = service
        .enable_schema("legacy", [named("7.7.1"), named("7.7.2")])
        .unwrap_err();

    assert!(matches!(err, SchemaError::NameConflict { ref name, .. } if name == "dup"));
    assert!(comparators.calls().is_empty());
    assert!(service.loader().schema("legacy").unwrap().is_disabled());
    assert!(!service.registries().oid_registry().has_oid("dup"));
    assert_eq!(service.generation().counter(), 0);
}
