//! Per-kind catalogs of live schema objects.
//!
//! A catalog maps OIDs to the runtime object, its description and its owning
//! schema. Every mutation goes through [`ObjectCatalog::apply`], which removes
//! and inserts under a single write lock so readers never observe a rename or
//! move half done: they see the old entry or the new one, never neither.
//!
//! Catalogs are exposed as `Arc<dyn ObjectCatalog<T>>` so alternative storage
//! can be plugged in through [`RegistriesBuilder`](crate::registry::RegistriesBuilder).

use crate::error::{SchemaError, SchemaResult};
use crate::naming::Oid;
use crate::objects::{SchemaObject, SchemaObjectDescription, SchemaObjectType};
use crate::registry::OidRegistry;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use log::{debug, trace};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A live catalog entry.
#[derive(Debug)]
pub struct CatalogEntry<T> {
    pub object: Arc<T>,
    pub description: Arc<SchemaObjectDescription>,
    pub schema_name: String,
}

impl<T> Clone for CatalogEntry<T> {
    fn clone(&self) -> Self {
        Self {
            object: Arc::clone(&self.object),
            description: Arc::clone(&self.description),
            schema_name: self.schema_name.clone(),
        }
    }
}

impl<T> CatalogEntry<T> {
    pub fn oid(&self) -> &Oid {
        self.description.oid()
    }
}

/// An object about to enter a catalog.
#[derive(Debug)]
pub struct NewEntry<T> {
    pub schema_name: String,
    pub description: SchemaObjectDescription,
    pub object: T,
}

impl<T> NewEntry<T> {
    pub fn new(schema_name: impl Into<String>, description: SchemaObjectDescription, object: T) -> Self {
        Self {
            schema_name: schema_name.into(),
            description,
            object,
        }
    }
}

/// A remove and/or insert applied as one step.
#[derive(Debug)]
pub struct CatalogChange<T> {
    pub remove: Option<Oid>,
    pub insert: Option<NewEntry<T>>,
}

impl<T> CatalogChange<T> {
    pub fn new(remove: Option<Oid>, insert: Option<NewEntry<T>>) -> Self {
        Self { remove, insert }
    }

    pub fn insert(entry: NewEntry<T>) -> Self {
        Self::new(None, Some(entry))
    }

    pub fn remove(oid: Oid) -> Self {
        Self::new(Some(oid), None)
    }

    /// Replace whatever lives under `old` with `entry`, whose OID may differ.
    pub fn replace(old: Oid, entry: NewEntry<T>) -> Self {
        Self::new(Some(old), Some(entry))
    }

    pub fn is_empty(&self) -> bool {
        self.remove.is_none() && self.insert.is_none()
    }
}

/// Storage for the live objects of one kind.
pub trait ObjectCatalog<T: SchemaObject>: Send + Sync {
    fn kind(&self) -> SchemaObjectType {
        T::KIND
    }

    /// Insert a new object; fails if its OID is taken.
    fn register(
        &self,
        schema_name: &str,
        description: SchemaObjectDescription,
        object: T,
    ) -> SchemaResult<()> {
        self.apply(CatalogChange::insert(NewEntry::new(schema_name, description, object)))
            .map(|_| ())
    }

    /// The object registered under an OID or alias.
    fn lookup(&self, id: &str) -> SchemaResult<Arc<T>>;

    /// The description of the object registered under an OID or alias.
    fn description(&self, id: &str) -> SchemaResult<Arc<SchemaObjectDescription>>;

    fn has(&self, id: &str) -> bool {
        self.lookup(id).is_ok()
    }

    /// The schema owning the object registered under an OID or alias.
    fn schema_name(&self, id: &str) -> SchemaResult<String>;

    /// Remove the object, if present. Returns whether anything was removed.
    fn unregister(&self, oid: &Oid) -> bool;

    /// Apply a remove and/or insert atomically.
    ///
    /// Fails without changing anything if the inserted OID is taken by an
    /// entry other than the one being removed, or if one of its names is
    /// bound to another OID. Returns whether anything changed.
    fn apply(&self, change: CatalogChange<T>) -> SchemaResult<bool>;

    /// Snapshot of every entry, in OID order.
    fn entries(&self) -> Vec<CatalogEntry<T>>;

    fn oids(&self) -> Vec<Oid> {
        self.entries().into_iter().map(|e| e.oid().clone()).collect()
    }

    /// Entries whose object references `oid` of `kind`.
    fn referencing(&self, kind: SchemaObjectType, oid: &Oid) -> Vec<CatalogEntry<T>> {
        self.entries()
            .into_iter()
            .filter(|e| {
                e.object
                    .references()
                    .iter()
                    .any(|r| r.kind == kind && r.oid == *oid)
            })
            .collect()
    }

    /// Remove every object owned by `schema_name`, returning their OIDs.
    fn unregister_schema_elements(&self, schema_name: &str) -> Vec<Oid>;

    /// Move every object owned by `from` to `to`; returns how many moved.
    fn rename_schema(&self, from: &str, to: &str) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content hash over owners and descriptions, independent of insertion order.
    fn fingerprint(&self) -> SchemaResult<String> {
        let mut entries = self.entries();
        entries.sort_by(|a, b| a.oid().cmp(b.oid()));
        let mut hasher = Sha256::new();
        for entry in &entries {
            hasher.update(entry.schema_name.as_bytes());
            hasher.update([0u8]);
            hasher.update(serde_json::to_vec(entry.description.as_ref())?);
            hasher.update([0u8]);
        }
        Ok(BASE64.encode(hasher.finalize()))
    }
}

/// The in-memory catalog used by default.
pub struct SchemaCatalog<T> {
    oid_registry: Arc<OidRegistry>,
    entries: RwLock<BTreeMap<Oid, CatalogEntry<T>>>,
}

impl<T: SchemaObject> SchemaCatalog<T> {
    pub fn new(oid_registry: Arc<OidRegistry>) -> Self {
        Self {
            oid_registry,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    fn resolve(&self, id: &str) -> SchemaResult<Oid> {
        match Oid::new(id.trim()) {
            Ok(oid) => Ok(oid),
            Err(_) => self
                .oid_registry
                .get_oid(id)
                .map_err(|_| SchemaError::not_found(T::KIND.to_string(), id)),
        }
    }

    // Names resolve under the catalog read lock: `apply` swaps the entry and
    // its bindings under the write lock, so a reader sees both or neither.
    fn with_entry<R>(&self, id: &str, f: impl FnOnce(&CatalogEntry<T>) -> R) -> SchemaResult<R> {
        let entries = self.entries.read();
        let oid = self.resolve(id)?;
        entries
            .get(&oid)
            .map(f)
            .ok_or_else(|| SchemaError::not_found(T::KIND.to_string(), id))
    }
}

impl<T> fmt::Debug for SchemaCatalog<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCatalog")
            .field("len", &self.entries.read().len())
            .finish()
    }
}

impl<T: SchemaObject> ObjectCatalog<T> for SchemaCatalog<T> {
    fn lookup(&self, id: &str) -> SchemaResult<Arc<T>> {
        self.with_entry(id, |e| Arc::clone(&e.object))
    }

    fn description(&self, id: &str) -> SchemaResult<Arc<SchemaObjectDescription>> {
        self.with_entry(id, |e| Arc::clone(&e.description))
    }

    fn schema_name(&self, id: &str) -> SchemaResult<String> {
        self.with_entry(id, |e| e.schema_name.clone())
    }

    fn unregister(&self, oid: &Oid) -> bool {
        let mut entries = self.entries.write();
        match entries.remove(oid) {
            Some(removed) => {
                self.oid_registry
                    .release_names(&removed.description.registered_names());
                trace!("Unregistered {} {}", T::KIND, oid);
                true
            }
            None => false,
        }
    }

    fn apply(&self, change: CatalogChange<T>) -> SchemaResult<bool> {
        let mut entries = self.entries.write();

        if let Some(new) = &change.insert {
            let oid = new.description.oid();
            if entries.contains_key(oid) && change.remove.as_ref() != Some(oid) {
                return Err(SchemaError::already_exists(T::KIND, oid.as_str()));
            }
        }

        let removed = change.remove.as_ref().and_then(|oid| entries.remove(oid));
        let released = removed
            .as_ref()
            .map(|e| e.description.registered_names())
            .unwrap_or_default();

        let Some(new) = change.insert else {
            self.oid_registry.release_names(&released);
            return Ok(removed.is_some());
        };

        let oid = new.description.oid().clone();
        if let Err(e) = self
            .oid_registry
            .exchange(&released, &new.description.registered_names(), &oid)
        {
            if let Some(previous) = removed {
                entries.insert(previous.oid().clone(), previous);
            }
            return Err(e);
        }

        debug!(
            "{} {} {} in schema '{}'",
            if removed.is_some() { "Replaced" } else { "Registered" },
            T::KIND,
            oid,
            new.schema_name
        );
        entries.insert(
            oid,
            CatalogEntry {
                object: Arc::new(new.object),
                description: Arc::new(new.description),
                schema_name: new.schema_name,
            },
        );
        Ok(true)
    }

    fn entries(&self) -> Vec<CatalogEntry<T>> {
        self.entries.read().values().cloned().collect()
    }

    fn unregister_schema_elements(&self, schema_name: &str) -> Vec<Oid> {
        let mut entries = self.entries.write();
        let owned: Vec<Oid> = entries
            .iter()
            .filter(|(_, e)| e.schema_name.eq_ignore_ascii_case(schema_name))
            .map(|(oid, _)| oid.clone())
            .collect();
        for oid in &owned {
            if let Some(removed) = entries.remove(oid) {
                self.oid_registry
                    .release_names(&removed.description.registered_names());
            }
        }
        owned
    }

    fn rename_schema(&self, from: &str, to: &str) -> usize {
        let mut entries = self.entries.write();
        let mut moved = 0;
        for entry in entries.values_mut() {
            if entry.schema_name.eq_ignore_ascii_case(from) {
                entry.schema_name = to.to_string();
                entry.description = Arc::new(entry.description.with_schema(to));
                moved += 1;
            }
        }
        moved
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

/// An object that still references something about to disappear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependent {
    pub kind: SchemaObjectType,
    pub oid: Oid,
    pub schema_name: String,
}

impl fmt::Display for Dependent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.oid)
    }
}

/// Finds live objects referencing a given OID.
pub trait DependencyProbe: Send + Sync {
    /// The kind of the objects this probe inspects.
    fn kind(&self) -> SchemaObjectType;

    fn dependents_of(&self, kind: SchemaObjectType, oid: &Oid) -> Vec<Dependent>;
}

/// A [`DependencyProbe`] over one catalog.
pub struct CatalogProbe<T: SchemaObject> {
    catalog: Arc<dyn ObjectCatalog<T>>,
}

impl<T: SchemaObject> CatalogProbe<T> {
    pub fn new(catalog: Arc<dyn ObjectCatalog<T>>) -> Self {
        Self { catalog }
    }
}

impl<T: SchemaObject> DependencyProbe for CatalogProbe<T> {
    fn kind(&self) -> SchemaObjectType {
        T::KIND
    }

    fn dependents_of(&self, kind: SchemaObjectType, oid: &Oid) -> Vec<Dependent> {
        self.catalog
            .referencing(kind, oid)
            .into_iter()
            .map(|entry| Dependent {
                kind: T::KIND,
                oid: entry.oid().clone(),
                schema_name: entry.schema_name,
            })
            .collect()
    }
}
