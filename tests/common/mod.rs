//! Common test utilities for the meta-schema integration tests.

#![allow(dead_code)]

pub mod builders;
pub mod recording;

use meta_schema::naming::{Dn, Oid, Rdn};
use meta_schema::registry::Registries;
use meta_schema::schema::Schema;
use meta_schema::service::{SchemaService, SchemaServiceBuilder};
use std::sync::Arc;

pub use builders::MetaEntryBuilder;

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn dn(value: &str) -> Dn {
    value.parse().expect("valid DN")
}

pub fn oid(value: &str) -> Oid {
    Oid::new(value).expect("valid OID")
}

pub fn oid_rdn(value: &str) -> Rdn {
    Rdn::new("m-oid", value).expect("valid RDN")
}

/// Schemas every scenario starts from: `core` and `nis` enabled, `legacy`
/// disabled, plus the fallback `other`.
pub fn bootstrap_schemas() -> Vec<Schema> {
    vec![
        Schema::new("core"),
        Schema::new("nis").with_dependencies(["core"]),
        Schema::new("legacy").disabled(),
        Schema::new("other"),
    ]
}

/// A service over fresh in-memory registries.
pub fn service() -> SchemaService {
    init_logging();
    service_with(Arc::new(Registries::new()))
}

/// A service over the given registries.
pub fn service_with(registries: Arc<Registries>) -> SchemaService {
    let mut builder = SchemaServiceBuilder::new().with_registries(registries);
    for schema in bootstrap_schemas().into_iter().filter(|s| s.name() != "other") {
        builder = builder.with_bootstrap_schema(schema);
    }
    builder.build().expect("service builds")
}
