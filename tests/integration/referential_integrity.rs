//! Live objects never lose what they reference.

use crate::common::builders::container_dn;
use crate::common::{MetaEntryBuilder, oid, oid_rdn, service};
use meta_schema::error::SchemaError;
use meta_schema::handlers::ChangeOutcome;
use meta_schema::objects::{ObjectPayload, SchemaObjectDescription, SchemaObjectType};
use meta_schema::service::{SchemaChange, SchemaService};
use std::sync::Arc;

const RULE: &str = "2.5.13.2";
const SYNTAX: &str = "1.3.6.1.4.1.1466.115.121.1.15";

fn add(service: &SchemaService, builder: MetaEntryBuilder) {
    let outcome = service
        .handle(SchemaChange::Add { entry: builder.build() }.into())
        .unwrap();
    assert_eq!(outcome, ChangeOutcome::Modified);
}

/// caseIgnoreMatch with its comparator and normalizer in `core`, and the
/// Directory String syntax (plus checker) it uses in `nis`.
fn populated() -> SchemaService {
    let service = service();
    add(&service, MetaEntryBuilder::comparator("core", RULE));
    add(&service, MetaEntryBuilder::normalizer("core", RULE));
    add(&service, MetaEntryBuilder::syntax_checker("nis", SYNTAX));
    add(&service, MetaEntryBuilder::syntax("nis", SYNTAX).with_name("directoryString"));
    add(
        &service,
        MetaEntryBuilder::matching_rule("core", RULE)
            .with_name("caseIgnoreMatch")
            .with_syntax(SYNTAX),
    );
    service
}

fn precluded_dependents(err: SchemaError) -> Vec<String> {
    match err {
        SchemaError::PrecludedByDependents { dependents, .. } => dependents,
        other => panic!("expected PrecludedByDependents, got {other}"),
    }
}

#[test]
fn test_delete_refused_while_referenced() {
    let service = populated();
    let fingerprint = service.registries().fingerprint().unwrap();

    for cascade in [false, true] {
        let err = service
            .handle(
                SchemaChange::Delete {
                    entry: MetaEntryBuilder::comparator("core", RULE).build(),
                    cascade,
                }
                .into(),
            )
            .unwrap_err();
        assert_eq!(precluded_dependents(err), vec![format!("matchingRule {RULE}")]);
    }
    assert_eq!(service.registries().fingerprint().unwrap(), fingerprint);
    assert_eq!(service.generation().counter(), 5);
}

#[test]
fn test_syntax_chain_is_guarded() {
    let service = populated();

    let err = service
        .handle(
            SchemaChange::Rename {
                entry: MetaEntryBuilder::syntax_checker("nis", SYNTAX).build(),
                new_rdn: oid_rdn("1.2.3.4"),
                cascade: false,
            }
            .into(),
        )
        .unwrap_err();
    assert_eq!(precluded_dependents(err), vec![format!("syntax {SYNTAX}")]);

    let err = service
        .handle(
            SchemaChange::Delete {
                entry: MetaEntryBuilder::syntax("nis", SYNTAX).build(),
                cascade: false,
            }
            .into(),
        )
        .unwrap_err();
    assert!(err.is_precluded_by_dependents());
    assert!(service.registries().syntaxes().has("directoryString"));
}

#[test]
fn test_move_refused_while_referenced() {
    let service = populated();
    let err = service
        .handle(
            SchemaChange::Move {
                entry: MetaEntryBuilder::normalizer("core", RULE).build(),
                new_parent: container_dn(SchemaObjectType::Normalizer, "nis"),
                new_rdn: None,
                delete_old_rdn: false,
                cascade: false,
            }
            .into(),
        )
        .unwrap_err();
    assert!(err.is_precluded_by_dependents());
    assert_eq!(service.registries().normalizers().schema_name(RULE).unwrap(), "core");
}

#[test]
fn test_dependents_first_then_referenced() {
    let service = populated();
    let delete = |builder: MetaEntryBuilder| {
        service
            .handle(SchemaChange::Delete { entry: builder.build(), cascade: false }.into())
            .unwrap()
    };

    assert!(delete(MetaEntryBuilder::matching_rule("core", RULE)).is_modified());
    assert!(delete(MetaEntryBuilder::comparator("core", RULE)).is_modified());
    assert!(delete(MetaEntryBuilder::normalizer("core", RULE)).is_modified());
    assert!(delete(MetaEntryBuilder::syntax("nis", SYNTAX)).is_modified());
    assert!(delete(MetaEntryBuilder::syntax_checker("nis", SYNTAX)).is_modified());
    assert!(service.registries().is_empty());
    assert!(!service.registries().oid_registry().has_oid("caseIgnoreMatch"));
}

#[test]
fn test_shared_oid_of_unrelated_kind_is_not_a_dependent() {
    let service = service();
    add(&service, MetaEntryBuilder::comparator("core", "1.2.3.4"));
    add(&service, MetaEntryBuilder::name_form("core", "1.2.3.4"));
    // A syntax sharing the rule's OID is not the syntax the rule uses.
    add(&service, MetaEntryBuilder::syntax("core", "1.2.3.5"));
    add(&service, MetaEntryBuilder::syntax("core", "1.2.3.6"));
    add(&service, MetaEntryBuilder::matching_rule("nis", "1.2.3.5").with_syntax("1.2.3.6"));

    let outcome = service
        .handle(
            SchemaChange::Delete {
                entry: MetaEntryBuilder::comparator("core", "1.2.3.4").build(),
                cascade: false,
            }
            .into(),
        )
        .unwrap();
    assert!(outcome.is_modified());
    assert!(service.registries().name_forms().has("1.2.3.4"));

    assert!(
        service
            .delete_oid(SchemaObjectType::Syntax, &oid("1.2.3.5"))
            .unwrap()
            .is_modified()
    );
    assert!(
        service
            .delete_oid(SchemaObjectType::Syntax, &oid("1.2.3.6"))
            .unwrap_err()
            .is_precluded_by_dependents()
    );
}

#[test]
fn test_disable_schema_guards_other_schemas() {
    let service = populated();
    let fingerprint = service.registries().fingerprint().unwrap();

    // Rules in core use the syntax owned by nis.
    let err = service.disable_schema("nis").unwrap_err();
    assert_eq!(precluded_dependents(err), vec![format!("matchingRule {RULE}")]);
    assert!(service.registries().syntaxes().has(SYNTAX));

    // nis declares core as a dependency.
    let err = service.disable_schema("core").unwrap_err();
    assert!(matches!(err, SchemaError::SchemaDependency { ref schema, .. } if schema == "core"));
    assert!(service.loader().schema("core").unwrap().is_enabled());
    assert_eq!(service.registries().fingerprint().unwrap(), fingerprint);

    service
        .handle(
            SchemaChange::Delete {
                entry: MetaEntryBuilder::matching_rule("core", RULE).build(),
                cascade: false,
            }
            .into(),
        )
        .unwrap();
    assert_eq!(service.disable_schema("nis").unwrap(), ChangeOutcome::Modified);
    assert!(service.registries().syntaxes().is_empty());
    assert_eq!(service.registries().len(), 2);

    assert_eq!(service.disable_schema("core").unwrap(), ChangeOutcome::Modified);
    assert!(service.registries().is_empty());
}

#[test]
fn test_enable_schema_needs_enabled_dependencies() {
    let service = populated();
    service
        .handle(
            SchemaChange::Delete {
                entry: MetaEntryBuilder::matching_rule("core", RULE).build(),
                cascade: false,
            }
            .into(),
        )
        .unwrap();
    service.disable_schema("nis").unwrap();
    service.disable_schema("core").unwrap();

    let err = service.enable_schema("nis", Vec::new()).unwrap_err();
    assert!(matches!(err, SchemaError::SchemaDependency { ref schema, .. } if schema == "nis"));
    assert!(service.loader().schema("nis").unwrap().is_disabled());

    assert_eq!(service.enable_schema("core", Vec::new()).unwrap(), ChangeOutcome::Modified);
    assert_eq!(service.enable_schema("nis", Vec::new()).unwrap(), ChangeOutcome::Modified);
}

#[test]
fn test_enable_schema_round() {
    let service = service();
    let implementation = |kind, value: &str, fqcn: &str| {
        SchemaObjectDescription::builder(
            kind,
            oid(value),
            ObjectPayload::Implementation {
                fqcn: fqcn.to_string(),
                bytecode: None,
            },
        )
        .build()
        .unwrap()
    };
    let rule = SchemaObjectDescription::builder(
        SchemaObjectType::MatchingRule,
        oid("1.2.3.4"),
        ObjectPayload::MatchingRule { syntax: None },
    )
    .name("legacyMatch")
    .build()
    .unwrap();

    let outcome = service
        .enable_schema(
            "legacy",
            [
                rule,
                implementation(SchemaObjectType::Comparator, "1.2.3.4", "StringComparator"),
                implementation(SchemaObjectType::Normalizer, "1.2.3.4", "NoOpNormalizer"),
            ],
        )
        .unwrap();
    assert_eq!(outcome, ChangeOutcome::Modified);
    assert_eq!(service.registries().len(), 3);

    let rule = service.registries().matching_rules().lookup("legacyMatch").unwrap();
    let comparator = service.registries().comparator_for(&rule).unwrap();
    assert_eq!(comparator.oid().as_str(), "1.2.3.4");

    // The comparator cannot go while the rule uses it, even via the service.
    assert!(
        service
            .delete_oid(SchemaObjectType::Comparator, &oid("1.2.3.4"))
            .unwrap_err()
            .is_precluded_by_dependents()
    );

    assert_eq!(service.disable_schema("legacy").unwrap(), ChangeOutcome::Modified);
    assert!(service.registries().is_empty());
    assert!(!service.registries().oid_registry().has_oid("legacyMatch"));
}

#[test]
fn test_refused_duplicates_keep_the_same_instances() {
    let service = populated();
    add(&service, MetaEntryBuilder::comparator("core", "1.2.3.9"));
    let comparators = service.registries().comparators();
    let taken = comparators.lookup(RULE).unwrap();
    let spare = comparators.lookup("1.2.3.9").unwrap();
    let unchanged = || {
        assert!(Arc::ptr_eq(&taken, &comparators.lookup(RULE).unwrap()));
        assert!(Arc::ptr_eq(&spare, &comparators.lookup("1.2.3.9").unwrap()));
    };

    let err = service
        .handle(
            SchemaChange::Add {
                entry: MetaEntryBuilder::comparator("other", RULE).build(),
            }
            .into(),
        )
        .unwrap_err();
    assert!(err.is_already_exists());
    unchanged();

    let err = service
        .handle(
            SchemaChange::Rename {
                entry: MetaEntryBuilder::comparator("core", "1.2.3.9").build(),
                new_rdn: oid_rdn(RULE),
                cascade: false,
            }
            .into(),
        )
        .unwrap_err();
    assert!(err.is_already_exists());
    unchanged();

    let err = service
        .handle(
            SchemaChange::Move {
                entry: MetaEntryBuilder::comparator("core", "1.2.3.9").build(),
                new_parent: container_dn(SchemaObjectType::Comparator, "other"),
                new_rdn: Some(oid_rdn(RULE)),
                delete_old_rdn: true,
                cascade: false,
            }
            .into(),
        )
        .unwrap_err();
    assert!(err.is_already_exists());
    unchanged();
}
