//! Live schema registry for a directory server that stores its schema in
//! the directory tree.
//!
//! Schema entities (comparators, normalizers, syntax checkers, syntaxes,
//! matching rules, name forms) live as entries under
//! `ou=<container>,cn=<schema>,ou=schema`. When the directory adds, deletes,
//! modifies, renames or moves one of those entries, this crate mirrors the
//! change into in-memory catalogs, refusing changes that would leave a live
//! object pointing at something that is gone.
//!
//! # Core Components
//!
//! - [`SchemaService`] - routes directory changes to the right handler
//! - [`MetaHandler`] - the per-kind change handler
//! - [`Registries`] - the catalogs and the OID registry they share
//! - [`Subentry`] - administrative roles and subtree specifications
//!
//! # Quick Start
//!
//! ```rust
//! use meta_schema::entry::Entry;
//! use meta_schema::service::{SchemaChange, SchemaServiceBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = SchemaServiceBuilder::new().build()?;
//!
//! let dn = "m-oid=2.5.13.2,ou=comparators,cn=other,ou=schema".parse()?;
//! let entry = Entry::new(dn)
//!     .with_attribute("m-oid", "2.5.13.2")
//!     .with_attribute("m-fqcn", "org.example.DeepTrimToLowerComparator");
//! service.handle(SchemaChange::Add { entry }.into())?;
//!
//! let comparator = service.registries().comparators().lookup("2.5.13.2")?;
//! assert_eq!(comparator.compare(" Foo  Bar", "foo bar"), std::cmp::Ordering::Equal);
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod entry;
pub mod error;
pub mod handlers;
pub mod naming;
pub mod objects;
pub mod registry;
pub mod schema;
pub mod service;
pub mod subentry;

// Re-export commonly used types for convenience
pub use entry::{AttributeValue, Entry};
pub use error::{
    BuildError, BuildResult, SchemaError, SchemaResult, ValidationError, ValidationResult,
};
pub use handlers::{ChangeOutcome, MetaHandler, SchemaChangeHandler};
pub use naming::{Dn, Oid, Rdn};
pub use objects::{SchemaEntityFactory, SchemaObject, SchemaObjectDescription, SchemaObjectType};
pub use registry::{ObjectCatalog, OidRegistry, Registries, SchemaCatalog};
pub use schema::{InMemorySchemaLoader, Schema, SchemaLoader};
pub use service::{
    SchemaChange, SchemaChangeRequest, SchemaGeneration, SchemaService, SchemaServiceBuilder,
    SchemaServiceConfig,
};
pub use subentry::{AdministrativeRole, Subentry, SubentryCache, SubtreeSpecification};
