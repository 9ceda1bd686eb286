//! Configuration and assembly of [`SchemaService`] instances.

use crate::constants::SCHEMA_OTHER;
use crate::error::{BuildError, BuildResult, SchemaResult};
use crate::objects::SchemaEntityFactory;
use crate::registry::Registries;
use crate::schema::{InMemorySchemaLoader, Schema, SchemaLoader};
use crate::service::SchemaService;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Settings for a schema service.
///
/// Missing fields take their defaults when loaded from JSON:
///
/// ```rust
/// use meta_schema::service::SchemaServiceConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SchemaServiceConfig::from_json(r#"{ "acceptBytecode": true }"#)?;
/// assert!(config.accept_bytecode);
/// assert_eq!(config.fallback_schema, "other");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaServiceConfig {
    /// Schema a description is registered under when it names none.
    pub fallback_schema: String,

    /// Keep `m-bytecode` payloads instead of refusing them. They are stored,
    /// never executed.
    pub accept_bytecode: bool,

    /// Schemas known to the default loader.
    pub bootstrap_schemas: Vec<Schema>,
}

impl Default for SchemaServiceConfig {
    fn default() -> Self {
        Self {
            fallback_schema: SCHEMA_OTHER.to_string(),
            accept_bytecode: false,
            bootstrap_schemas: vec![Schema::new(SCHEMA_OTHER)],
        }
    }
}

impl SchemaServiceConfig {
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check names are present and unique, and that every dependency names
    /// a bootstrap schema.
    pub fn validate(&self) -> BuildResult<()> {
        if self.fallback_schema.trim().is_empty() {
            return Err(BuildError::InvalidConfiguration {
                message: "Fallback schema name cannot be empty".to_string(),
            });
        }

        let mut names = HashSet::new();
        for schema in &self.bootstrap_schemas {
            if schema.name().trim().is_empty() {
                return Err(BuildError::InvalidConfiguration {
                    message: "Bootstrap schema names cannot be empty".to_string(),
                });
            }
            if !names.insert(schema.name().to_lowercase()) {
                return Err(BuildError::InvalidConfiguration {
                    message: format!("Bootstrap schema '{}' is listed twice", schema.name()),
                });
            }
        }

        for schema in &self.bootstrap_schemas {
            if let Some(missing) = schema
                .dependencies()
                .iter()
                .find(|dependency| !names.contains(&dependency.to_lowercase()))
            {
                return Err(BuildError::SchemaLoadError {
                    schema: format!("{} (depends on unknown schema '{}')", schema.name(), missing),
                });
            }
        }

        Ok(())
    }

    /// The bootstrap schemas, plus the fallback schema if it is not among them.
    fn loader_schemas(&self) -> Vec<Schema> {
        let mut schemas = self.bootstrap_schemas.clone();
        if !schemas
            .iter()
            .any(|s| s.name().eq_ignore_ascii_case(&self.fallback_schema))
        {
            schemas.push(Schema::new(self.fallback_schema.clone()));
        }
        schemas
    }
}

/// Builder for [`SchemaService`].
///
/// Anything not supplied is created from the configuration: an in-memory
/// loader over the bootstrap schemas, fresh in-memory catalogs and the
/// built-in implementation tables.
///
/// ```rust
/// use meta_schema::schema::Schema;
/// use meta_schema::service::SchemaServiceBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = SchemaServiceBuilder::new()
///     .with_bootstrap_schema(Schema::new("core"))
///     .with_bootstrap_schema(Schema::new("nis").disabled())
///     .build()?;
///
/// assert!(service.loader().schema("nis")?.is_disabled());
/// assert!(service.loader().has_schema("other"));
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SchemaServiceBuilder {
    config: SchemaServiceConfig,
    loader: Option<Arc<dyn SchemaLoader>>,
    registries: Option<Arc<Registries>>,
    factory: Option<SchemaEntityFactory>,
}

impl SchemaServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: SchemaServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_fallback_schema(mut self, name: impl Into<String>) -> Self {
        self.config.fallback_schema = name.into();
        self
    }

    pub fn with_bytecode_accepted(mut self, accept: bool) -> Self {
        self.config.accept_bytecode = accept;
        self
    }

    pub fn with_bootstrap_schema(mut self, schema: Schema) -> Self {
        self.config.bootstrap_schemas.push(schema);
        self
    }

    /// Use `loader` instead of one built from the bootstrap schemas.
    pub fn with_loader(mut self, loader: Arc<dyn SchemaLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Use existing registries, for example ones with custom catalogs.
    pub fn with_registries(mut self, registries: Arc<Registries>) -> Self {
        self.registries = Some(registries);
        self
    }

    /// Use a factory with extra implementations registered. Its bytecode
    /// setting is overridden by the configuration.
    pub fn with_factory(mut self, factory: SchemaEntityFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Validate the configuration and assemble the service.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if the configuration is invalid, or if a
    /// supplied loader does not know the fallback schema.
    pub fn build(self) -> BuildResult<SchemaService> {
        self.config.validate()?;

        let loader: Arc<dyn SchemaLoader> = match self.loader {
            Some(loader) => {
                if !loader.has_schema(&self.config.fallback_schema) {
                    return Err(BuildError::SchemaLoadError {
                        schema: self.config.fallback_schema.clone(),
                    });
                }
                loader
            }
            None => Arc::new(InMemorySchemaLoader::with_schemas(self.config.loader_schemas())),
        };
        let registries = self.registries.unwrap_or_default();
        let factory = self
            .factory
            .unwrap_or_default()
            .with_bytecode_accepted(self.config.accept_bytecode);

        Ok(SchemaService::assemble(self.config, registries, loader, Arc::new(factory)))
    }
}
