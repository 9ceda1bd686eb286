//! A catalog test double that records the calls made to it.

use meta_schema::error::SchemaResult;
use meta_schema::naming::Oid;
use meta_schema::objects::{SchemaObject, SchemaObjectDescription};
use meta_schema::registry::{CatalogChange, CatalogEntry, ObjectCatalog, OidRegistry, SchemaCatalog};
use parking_lot::Mutex;
use std::sync::Arc;

/// Wraps an in-memory catalog and logs every mutating call.
pub struct RecordingCatalog<T: SchemaObject> {
    inner: SchemaCatalog<T>,
    calls: Mutex<Vec<String>>,
}

impl<T: SchemaObject> RecordingCatalog<T> {
    pub fn new(oid_registry: Arc<OidRegistry>) -> Self {
        Self {
            inner: SchemaCatalog::new(oid_registry),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls seen so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

impl<T: SchemaObject> ObjectCatalog<T> for RecordingCatalog<T> {
    fn lookup(&self, id: &str) -> SchemaResult<Arc<T>> {
        self.inner.lookup(id)
    }

    fn description(&self, id: &str) -> SchemaResult<Arc<SchemaObjectDescription>> {
        self.inner.description(id)
    }

    fn schema_name(&self, id: &str) -> SchemaResult<String> {
        self.inner.schema_name(id)
    }

    fn unregister(&self, oid: &Oid) -> bool {
        self.record(format!("unregister {oid}"));
        self.inner.unregister(oid)
    }

    fn apply(&self, change: CatalogChange<T>) -> SchemaResult<bool> {
        let remove = change
            .remove
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        let insert = change
            .insert
            .as_ref()
            .map_or_else(|| "-".to_string(), |e| e.description.oid().to_string());
        self.record(format!("apply {remove} -> {insert}"));
        self.inner.apply(change)
    }

    fn entries(&self) -> Vec<CatalogEntry<T>> {
        self.inner.entries()
    }

    fn unregister_schema_elements(&self, schema_name: &str) -> Vec<Oid> {
        self.record(format!("unregister schema {schema_name}"));
        self.inner.unregister_schema_elements(schema_name)
    }

    fn rename_schema(&self, from: &str, to: &str) -> usize {
        self.record(format!("rename schema {from} -> {to}"));
        self.inner.rename_schema(from, to)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
