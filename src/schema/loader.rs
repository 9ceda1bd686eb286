//! Schema lookup.

use crate::error::{SchemaError, SchemaResult};
use crate::schema::Schema;
use log::info;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Resolves schema names to [`Schema`]s. Names match case-insensitively.
pub trait SchemaLoader: Send + Sync {
    /// The schema called `name`, or [`SchemaError::SchemaNotFound`].
    fn schema(&self, name: &str) -> SchemaResult<Schema>;

    /// Every known schema, sorted by name.
    fn schemas(&self) -> Vec<Schema>;

    /// Flip a schema's enabled state.
    fn set_disabled(&self, name: &str, disabled: bool) -> SchemaResult<()>;

    fn has_schema(&self, name: &str) -> bool {
        self.schema(name).is_ok()
    }
}

/// Schemas held in memory.
#[derive(Debug, Default)]
pub struct InMemorySchemaLoader {
    schemas: RwLock<HashMap<String, Schema>>,
}

impl InMemorySchemaLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schemas(schemas: impl IntoIterator<Item = Schema>) -> Self {
        let loader = Self::new();
        for schema in schemas {
            loader.add(schema);
        }
        loader
    }

    /// Add or replace a schema.
    pub fn add(&self, schema: Schema) {
        self.schemas.write().insert(key(schema.name()), schema);
    }

    pub fn remove(&self, name: &str) -> Option<Schema> {
        self.schemas.write().remove(&key(name))
    }
}

impl SchemaLoader for InMemorySchemaLoader {
    fn schema(&self, name: &str) -> SchemaResult<Schema> {
        self.schemas
            .read()
            .get(&key(name))
            .cloned()
            .ok_or_else(|| SchemaError::schema_not_found(name))
    }

    fn schemas(&self) -> Vec<Schema> {
        let mut schemas: Vec<Schema> = self.schemas.read().values().cloned().collect();
        schemas.sort_by(|a, b| a.name().cmp(b.name()));
        schemas
    }

    fn set_disabled(&self, name: &str, disabled: bool) -> SchemaResult<()> {
        let mut schemas = self.schemas.write();
        let schema = schemas
            .get_mut(&key(name))
            .ok_or_else(|| SchemaError::schema_not_found(name))?;
        schema.set_disabled(disabled);
        info!(
            "Schema '{}' is now {}",
            schema.name(),
            if disabled { "disabled" } else { "enabled" }
        );
        Ok(())
    }
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}
