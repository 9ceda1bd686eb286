//! Schemas: named, enable-able groups of schema entities.
//!
//! Every schema entity belongs to exactly one schema, named by the `cn` one
//! level below the meta-schema root (`cn=<schema>,ou=schema`). A disabled
//! schema keeps its entries in the directory but contributes nothing to the
//! live registries.
//!
//! # Key Types
//!
//! - [`Schema`] - a schema's name, state and dependencies
//! - [`SchemaLoader`] - lookup of schemas by name
//! - [`InMemorySchemaLoader`] - the default loader
//!
//! # Examples
//!
//! ```rust
//! use meta_schema::schema::{InMemorySchemaLoader, Schema, SchemaLoader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = InMemorySchemaLoader::with_schemas([
//!     Schema::new("core"),
//!     Schema::new("legacy").disabled(),
//! ]);
//! assert!(loader.schema("LEGACY")?.is_disabled());
//! # Ok(())
//! # }
//! ```

pub mod loader;


pub use loader::{InMemorySchemaLoader, SchemaLoader};

use serde::{Deserialize, Serialize};

/// A named group of schema entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    name: String,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    owner: Option<String>,
}

impl Schema {
    /// An enabled schema without dependencies.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            disabled: false,
            dependencies: Vec::new(),
            owner: None,
        }
    }

    /// The same schema, disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// Names of the schemas this one builds on.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Whether `name` is among this schema's dependencies.
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d.eq_ignore_ascii_case(name))
    }

    /// Informational; nothing is enforced on the owner.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub(crate) fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }
}
