//! Live registries: name resolution and per-kind catalogs.
//!
//! # Key Types
//!
//! - [`OidRegistry`] - case-insensitive alias to OID bindings
//! - [`ObjectCatalog`] / [`SchemaCatalog`] - the live objects of one kind
//! - [`Registries`] - every catalog plus the writer lock handlers share
//! - [`DependencyProbe`] - finds objects still referencing an OID

pub mod catalog;
pub mod oid_registry;
pub mod registries;

pub use catalog::{
    CatalogChange, CatalogEntry, CatalogProbe, DependencyProbe, Dependent, NewEntry,
    ObjectCatalog, SchemaCatalog,
};
pub use oid_registry::OidRegistry;
pub use registries::{Registries, RegistriesBuilder};
