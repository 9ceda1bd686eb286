//! The generic meta-entity change handler.

use crate::constants::OU_AT_OID;
use crate::entry::Entry;
use crate::error::{SchemaError, SchemaResult};
use crate::handlers::{ChangeOutcome, SchemaChangeHandler};
use crate::naming::{Dn, Oid, Rdn};
use crate::objects::{SchemaEntityFactory, SchemaObject, SchemaObjectDescription, SchemaObjectType};
use crate::registry::{CatalogChange, NewEntry, ObjectCatalog, Registries};
use crate::schema::{Schema, SchemaLoader};
use log::{debug, info, warn};
use std::marker::PhantomData;
use std::sync::Arc;

/// Keeps the catalog of `T` in step with its meta-schema entries.
///
/// Expected locations look like
/// `m-oid=<oid>,ou=<container>,cn=<schema>,ou=schema`: the parent is three
/// components deep, named by `ou` with the kind's container label, and the
/// component right under the root names the owning schema.
pub struct MetaHandler<T: SchemaObject> {
    registries: Arc<Registries>,
    loader: Arc<dyn SchemaLoader>,
    factory: Arc<SchemaEntityFactory>,
    fallback_schema: String,
    _kind: PhantomData<fn() -> T>,
}

impl<T: SchemaObject> MetaHandler<T> {
    pub fn new(
        registries: Arc<Registries>,
        loader: Arc<dyn SchemaLoader>,
        factory: Arc<SchemaEntityFactory>,
        fallback_schema: impl Into<String>,
    ) -> Self {
        Self {
            registries,
            loader,
            factory,
            fallback_schema: fallback_schema.into(),
            _kind: PhantomData,
        }
    }

    fn catalog(&self) -> &Arc<dyn ObjectCatalog<T>> {
        T::catalog(&self.registries)
    }

    /// Refuse any parent other than `ou=<container>,cn=<schema>,ou=schema`.
    pub fn check_parent_shape(&self, parent: &Dn) -> SchemaResult<()> {
        let kind = T::KIND;
        if parent.size() != 3 {
            return Err(SchemaError::naming_violation(format!(
                "The parent DN of a {kind} must be exactly 3 name components long, '{parent}' has {}",
                parent.size()
            )));
        }
        let Some(rdn) = parent.rdn() else {
            return Err(SchemaError::naming_violation(format!(
                "The parent DN of a {kind} cannot be empty"
            )));
        };
        let is_ou = self
            .registries
            .oid_registry()
            .get_oid(rdn.norm_type())
            .is_ok_and(|oid| oid.as_str() == OU_AT_OID);
        if !is_ou {
            return Err(SchemaError::naming_violation(format!(
                "The parent entry of a {kind} must be an organizationalUnit, not '{}'",
                rdn.norm_type()
            )));
        }
        if !rdn.value().eq_ignore_ascii_case(kind.container_label()) {
            return Err(SchemaError::naming_violation(format!(
                "The parent entry of a {kind} must be named ou={}, not ou={}",
                kind.container_label(),
                rdn.value()
            )));
        }
        Ok(())
    }

    /// The schema named by the component right under the root of `dn`.
    fn schema_for(&self, dn: &Dn) -> SchemaResult<Schema> {
        let rdn = dn.rdn_from_root(1).ok_or_else(|| {
            SchemaError::naming_violation(format!("'{dn}' does not name a schema"))
        })?;
        self.loader.schema(rdn.value())
    }

    fn parent_of(dn: &Dn) -> SchemaResult<Dn> {
        dn.parent()
            .ok_or_else(|| SchemaError::naming_violation("The root entry has no parent"))
    }

    fn ensure_unique(&self, oid: &Oid) -> SchemaResult<()> {
        if self.catalog().has(oid.as_str()) {
            return Err(SchemaError::already_exists(T::KIND, oid.as_str()));
        }
        Ok(())
    }

    fn guard_dependents(&self, oid: &Oid, action: &'static str) -> SchemaResult<()> {
        let dependents = self.registries.dependents_of(T::KIND, oid);
        if dependents.is_empty() {
            return Ok(());
        }
        let dependents: Vec<String> = dependents.iter().map(ToString::to_string).collect();
        warn!(
            "Refusing to leave {:?} dangling: {} {} cannot be {}",
            dependents,
            T::KIND,
            oid,
            action
        );
        Err(SchemaError::PrecludedByDependents {
            kind: T::KIND,
            oid: oid.to_string(),
            action,
            dependents,
        })
    }

    fn note_cascade(&self, cascade: bool, oid: &Oid) {
        if cascade {
            debug!("Cascade requested for {} {}; dependents are refused, not cascaded", T::KIND, oid);
        }
    }

    fn build(
        &self,
        entry: &Entry,
        oid: Oid,
        schema_name: &str,
    ) -> SchemaResult<(SchemaObjectDescription, T)> {
        let description = self.factory.describe_as(T::KIND, entry, oid, schema_name)?;
        let object = T::build(&description, &self.factory)?;
        Ok((description, object))
    }

    fn outcome(changed: bool) -> ChangeOutcome {
        if changed {
            ChangeOutcome::Modified
        } else {
            ChangeOutcome::Unchanged
        }
    }

    fn delete_locked(&self, oid: &Oid, cascade: bool) -> SchemaResult<ChangeOutcome> {
        self.note_cascade(cascade, oid);
        self.guard_dependents(oid, "deleted")?;
        if !self.catalog().unregister(oid) {
            debug!("No live {} {}, nothing to delete", T::KIND, oid);
            return Ok(ChangeOutcome::Unchanged);
        }
        info!("Deleted {} {}", T::KIND, oid);
        Ok(ChangeOutcome::Modified)
    }

    fn relocate(
        &self,
        original: &Dn,
        new_parent: &Dn,
        old_oid: Oid,
        new_oid: Oid,
        entry: &Entry,
    ) -> SchemaResult<ChangeOutcome> {
        let old_schema = self.schema_for(original)?;
        let new_schema = self.schema_for(new_parent)?;
        let (description, object) = self.build(entry, new_oid.clone(), new_schema.name())?;

        let remove = old_schema.is_enabled().then(|| old_oid.clone());
        let insert = new_schema
            .is_enabled()
            .then(|| NewEntry::new(new_schema.name(), description, object));
        if remove.is_none() && insert.is_none() {
            debug!(
                "Both '{}' and '{}' are disabled, {} {} stays out of the registries",
                old_schema.name(),
                new_schema.name(),
                T::KIND,
                new_oid
            );
            return Ok(ChangeOutcome::Unchanged);
        }

        let changed = self.catalog().apply(CatalogChange::new(remove, insert))?;
        info!(
            "Moved {} {} from schema '{}' to {} in schema '{}'",
            T::KIND,
            old_oid,
            old_schema.name(),
            new_oid,
            new_schema.name()
        );
        Ok(Self::outcome(changed))
    }
}

impl<T: SchemaObject> SchemaChangeHandler for MetaHandler<T> {
    fn kind(&self) -> SchemaObjectType {
        T::KIND
    }

    fn add(&self, dn: &Dn, entry: &Entry) -> SchemaResult<ChangeOutcome> {
        let _writes = self.registries.lock_writes();
        self.check_parent_shape(&Self::parent_of(dn)?)?;

        let oid = self.factory.oid_of(entry)?;
        self.ensure_unique(&oid)?;
        let schema = self.schema_for(dn)?;
        let (description, object) = self.build(entry, oid.clone(), schema.name())?;

        if schema.is_disabled() {
            debug!(
                "Schema '{}' is disabled, {} {} is not registered",
                schema.name(),
                T::KIND,
                oid
            );
            return Ok(ChangeOutcome::Unchanged);
        }

        self.catalog().register(schema.name(), description, object)?;
        info!("Added {} {} to schema '{}'", T::KIND, oid, schema.name());
        Ok(ChangeOutcome::Modified)
    }

    fn add_description(&self, description: SchemaObjectDescription) -> SchemaResult<ChangeOutcome> {
        if description.kind() != T::KIND {
            return Err(SchemaError::unsupported(format!(
                "a {} handler cannot register a {} description",
                T::KIND,
                description.kind()
            )));
        }
        let _writes = self.registries.lock_writes();

        let schema_name = description
            .schema_name()
            .unwrap_or(&self.fallback_schema)
            .to_string();
        let schema = self.loader.schema(&schema_name)?;
        let description = description.with_schema(schema.name());
        let object = T::build(&description, &self.factory)?;

        if schema.is_disabled() {
            debug!(
                "Schema '{}' is disabled, {} {} is not registered",
                schema.name(),
                T::KIND,
                description.oid()
            );
            return Ok(ChangeOutcome::Unchanged);
        }

        let oid = description.oid().clone();
        self.catalog().register(schema.name(), description, object)?;
        info!("Added {} {} to schema '{}'", T::KIND, oid, schema.name());
        Ok(ChangeOutcome::Modified)
    }

    fn delete(&self, _dn: &Dn, entry: &Entry, cascade: bool) -> SchemaResult<ChangeOutcome> {
        let oid = self.factory.oid_of(entry)?;
        let _writes = self.registries.lock_writes();
        self.delete_locked(&oid, cascade)
    }

    fn delete_oid(&self, oid: &Oid, cascade: bool) -> SchemaResult<ChangeOutcome> {
        let _writes = self.registries.lock_writes();
        self.delete_locked(oid, cascade)
    }

    fn modify(
        &self,
        dn: &Dn,
        entry: &Entry,
        target: &Entry,
        cascade: bool,
    ) -> SchemaResult<ChangeOutcome> {
        let _writes = self.registries.lock_writes();
        let oid = self.factory.oid_of(entry)?;
        self.note_cascade(cascade, &oid);
        let schema = self.schema_for(dn)?;
        let (description, object) = self.build(target, oid.clone(), schema.name())?;

        if schema.is_disabled() {
            debug!("Schema '{}' is disabled, ignoring change to {} {}", schema.name(), T::KIND, oid);
            return Ok(ChangeOutcome::Unchanged);
        }

        let changed = self.catalog().apply(CatalogChange::replace(
            oid.clone(),
            NewEntry::new(schema.name(), description, object),
        ))?;
        info!("Replaced {} {} in schema '{}'", T::KIND, oid, schema.name());
        Ok(Self::outcome(changed))
    }

    fn rename(
        &self,
        dn: &Dn,
        entry: &Entry,
        new_rdn: &Rdn,
        cascade: bool,
    ) -> SchemaResult<ChangeOutcome> {
        let _writes = self.registries.lock_writes();
        let old_oid = self.factory.oid_of(entry)?;
        self.note_cascade(cascade, &old_oid);
        self.guard_dependents(&old_oid, "renamed")?;

        let new_oid = Oid::new(new_rdn.value())?;
        self.ensure_unique(&new_oid)?;
        let schema = self.schema_for(dn)?;

        if schema.is_disabled() {
            debug!(
                "Schema '{}' is disabled, rename of {} {} is not mirrored",
                schema.name(),
                T::KIND,
                old_oid
            );
            return Ok(ChangeOutcome::Unchanged);
        }

        let (description, object) = self.build(entry, new_oid.clone(), schema.name())?;
        let changed = self.catalog().apply(CatalogChange::replace(
            old_oid.clone(),
            NewEntry::new(schema.name(), description, object),
        ))?;
        info!("Renamed {} {} to {}", T::KIND, old_oid, new_oid);
        Ok(Self::outcome(changed))
    }

    fn move_and_rename(
        &self,
        original: &Dn,
        new_parent: &Dn,
        new_rdn: &Rdn,
        _delete_old_rdn: bool,
        entry: &Entry,
        cascade: bool,
    ) -> SchemaResult<ChangeOutcome> {
        let _writes = self.registries.lock_writes();
        self.check_parent_shape(new_parent)?;
        let old_oid = self.factory.oid_of(entry)?;
        self.note_cascade(cascade, &old_oid);
        self.guard_dependents(&old_oid, "moved")?;

        let new_oid = Oid::new(new_rdn.value())?;
        self.ensure_unique(&new_oid)?;
        self.relocate(original, new_parent, old_oid, new_oid, entry)
    }

    fn replace(
        &self,
        original: &Dn,
        new_parent: &Dn,
        entry: &Entry,
        cascade: bool,
    ) -> SchemaResult<ChangeOutcome> {
        let _writes = self.registries.lock_writes();
        self.check_parent_shape(new_parent)?;
        let oid = self.factory.oid_of(entry)?;
        self.note_cascade(cascade, &oid);
        self.guard_dependents(&oid, "moved to another schema")?;
        self.relocate(original, new_parent, oid.clone(), oid, entry)
    }
}
