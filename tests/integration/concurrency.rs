//! Readers never observe a change half-applied.

use crate::common::{MetaEntryBuilder, oid_rdn, service};
use meta_schema::service::SchemaChange;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

const ROUNDS: usize = 200;

#[test]
fn test_rename_is_atomic_for_readers() {
    let service = service();
    service
        .handle(
            SchemaChange::Add {
                entry: MetaEntryBuilder::comparator("core", "1.2.3.0")
                    .with_name("movingMatch")
                    .build(),
            }
            .into(),
        )
        .unwrap();
    let done = AtomicBool::new(false);

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let comparators = service.registries().comparators();
                while !done.load(Ordering::Acquire) {
                    let entries = comparators.entries();
                    assert_eq!(entries.len(), 1, "exactly one comparator at any time");
                    let entry = &entries[0];
                    assert_eq!(entry.oid(), entry.object.oid());
                    assert_eq!(entry.description.names(), ["movingMatch".to_string()]);
                }
            });
        }

        for round in 0..ROUNDS {
            let entry = MetaEntryBuilder::comparator("core", &format!("1.2.3.{round}"))
                .with_name("movingMatch")
                .build();
            service
                .handle(
                    SchemaChange::Rename {
                        entry,
                        new_rdn: oid_rdn(&format!("1.2.3.{}", round + 1)),
                        cascade: false,
                    }
                    .into(),
                )
                .unwrap();
        }
        done.store(true, Ordering::Release);
    });

    let comparators = service.registries().comparators();
    assert_eq!(
        comparators.lookup("movingMatch").unwrap().oid().as_str(),
        format!("1.2.3.{ROUNDS}")
    );
    assert_eq!(service.generation().counter(), ROUNDS as u64 + 1);
}

#[test]
fn test_alias_stays_resolvable_during_renames() {
    let service = service();
    service
        .handle(
            SchemaChange::Add {
                entry: MetaEntryBuilder::comparator("core", "5.5.1").with_name("thing").build(),
            }
            .into(),
        )
        .unwrap();
    let done = AtomicBool::new(false);

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let comparators = service.registries().comparators();
                while !done.load(Ordering::Acquire) {
                    assert!(comparators.has("thing"), "alias lost during a rename");
                    assert!(comparators.lookup("THING").is_ok());
                }
            });
        }

        for round in 0..ROUNDS * 10 {
            let (from, to) = if round % 2 == 0 { ("5.5.1", "5.5.2") } else { ("5.5.2", "5.5.1") };
            let entry = MetaEntryBuilder::comparator("core", from).with_name("thing").build();
            service
                .handle(
                    SchemaChange::Rename {
                        entry,
                        new_rdn: oid_rdn(to),
                        cascade: false,
                    }
                    .into(),
                )
                .unwrap();
        }
        done.store(true, Ordering::Release);
    });

    assert_eq!(
        service.registries().comparators().lookup("thing").unwrap().oid().as_str(),
        "5.5.1"
    );
}

#[test]
fn test_racing_adds_of_one_oid() {
    let service = service();
    let successes: usize = thread::scope(|scope| {
        let handles: Vec<_> = ["core", "nis", "other", "core"]
            .into_iter()
            .map(|schema| {
                let service = &service;
                scope.spawn(move || {
                    let entry = MetaEntryBuilder::comparator(schema, "1.2.3.4").build();
                    service.handle(SchemaChange::Add { entry }.into()).is_ok()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum()
    });

    assert_eq!(successes, 1);
    assert_eq!(service.registries().comparators().len(), 1);
    assert_eq!(service.registries().oid_registry().names_of(&crate::common::oid("1.2.3.4")).len(), 1);
}

#[test]
fn test_parallel_adds_of_distinct_oids() {
    let service = service();
    thread::scope(|scope| {
        for worker in 0..8 {
            let service = &service;
            scope.spawn(move || {
                for i in 0..25 {
                    let entry =
                        MetaEntryBuilder::normalizer("core", &format!("1.{worker}.{i}")).build();
                    service.handle(SchemaChange::Add { entry }.into()).unwrap();
                }
            });
        }
    });

    assert_eq!(service.registries().normalizers().len(), 200);
    assert_eq!(service.generation().counter(), 200);
}
