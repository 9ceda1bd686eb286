//! The schema service: routes directory changes to the meta handlers.
//!
//! [`SchemaService`] owns the live [`Registries`], the schema loader, the
//! entity factory and one [`MetaHandler`] per schema entity kind. Changes
//! arrive as [`SchemaChangeRequest`]s naming the entry that changed; the
//! service picks the handler from the container the entry sits in
//! (`ou=comparators`, `ou=matchingRules`, ...) and keeps a
//! [`SchemaGeneration`] counter that moves on every effective change.
//!
//! Whole schemas are switched with [`SchemaService::disable_schema`] and
//! [`SchemaService::enable_schema`].

pub mod builder;


pub use builder::{SchemaServiceBuilder, SchemaServiceConfig};

use crate::entry::Entry;
use crate::error::{SchemaError, SchemaResult};
use crate::handlers::{ChangeOutcome, MetaHandler, SchemaChangeHandler};
use crate::naming::{Dn, Oid, Rdn};
use crate::objects::{
    Comparator, MatchingRule, NameForm, Normalizer, SchemaEntityFactory, SchemaObject,
    SchemaObjectDescription, SchemaObjectType, Syntax, SyntaxChecker,
};
use crate::registry::Registries;
use crate::registry::oid_registry::normalize;
use crate::schema::SchemaLoader;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A change the directory has applied to a meta-schema entry.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaChange {
    Add {
        entry: Entry,
    },
    Delete {
        entry: Entry,
        cascade: bool,
    },
    /// `entry` is the state before the modification, `target` after it.
    Modify {
        entry: Entry,
        target: Entry,
        cascade: bool,
    },
    Rename {
        entry: Entry,
        new_rdn: Rdn,
        cascade: bool,
    },
    /// Move under `new_parent`, renaming too when `new_rdn` is given.
    Move {
        entry: Entry,
        new_parent: Dn,
        new_rdn: Option<Rdn>,
        delete_old_rdn: bool,
        cascade: bool,
    },
}

impl SchemaChange {
    /// DN of the entry before the change.
    pub fn dn(&self) -> &Dn {
        match self {
            Self::Add { entry }
            | Self::Delete { entry, .. }
            | Self::Modify { entry, .. }
            | Self::Rename { entry, .. }
            | Self::Move { entry, .. } => entry.dn(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Delete { .. } => "delete",
            Self::Modify { .. } => "modify",
            Self::Rename { .. } => "rename",
            Self::Move { new_rdn: None, .. } => "move",
            Self::Move { .. } => "move and rename",
        }
    }
}

/// A change plus the id its log lines are tagged with.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaChangeRequest {
    pub change: SchemaChange,
    /// Generated when absent.
    pub request_id: Option<String>,
}

impl SchemaChangeRequest {
    pub fn new(change: SchemaChange) -> Self {
        Self {
            change,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

impl From<SchemaChange> for SchemaChangeRequest {
    fn from(change: SchemaChange) -> Self {
        Self::new(change)
    }
}

/// How many effective changes the live schema has seen, and when the last
/// one happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaGeneration {
    counter: u64,
    last_modified: DateTime<Utc>,
}

impl SchemaGeneration {
    fn new() -> Self {
        Self {
            counter: 0,
            last_modified: Utc::now(),
        }
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    fn advance(&mut self) {
        self.counter += 1;
        self.last_modified = Utc::now();
    }
}

type Registration<'a> = Box<dyn FnOnce() -> SchemaResult<()> + 'a>;

/// Front door for meta-schema changes.
///
/// ```rust
/// use meta_schema::entry::Entry;
/// use meta_schema::service::{SchemaChange, SchemaServiceBuilder};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = SchemaServiceBuilder::new().build()?;
/// let dn = "m-oid=1.3.6.1.4.1.18060.0.4.1.1.1,ou=comparators,cn=other,ou=schema".parse()?;
/// let entry = Entry::new(dn)
///     .with_attribute("m-oid", "1.3.6.1.4.1.18060.0.4.1.1.1")
///     .with_attribute("m-fqcn", "StringComparator");
///
/// let outcome = service.handle(SchemaChange::Add { entry }.into())?;
/// assert!(outcome.is_modified());
/// assert!(service.registries().comparators().has("1.3.6.1.4.1.18060.0.4.1.1.1"));
/// assert_eq!(service.generation().counter(), 1);
/// # Ok(())
/// # }
/// ```
pub struct SchemaService {
    config: SchemaServiceConfig,
    registries: Arc<Registries>,
    loader: Arc<dyn SchemaLoader>,
    factory: Arc<SchemaEntityFactory>,
    handlers: HashMap<SchemaObjectType, Arc<dyn SchemaChangeHandler>>,
    generation: RwLock<SchemaGeneration>,
}

impl SchemaService {
    pub fn builder() -> SchemaServiceBuilder {
        SchemaServiceBuilder::new()
    }

    pub(crate) fn assemble(
        config: SchemaServiceConfig,
        registries: Arc<Registries>,
        loader: Arc<dyn SchemaLoader>,
        factory: Arc<SchemaEntityFactory>,
    ) -> Self {
        fn handler<T: SchemaObject>(
            registries: &Arc<Registries>,
            loader: &Arc<dyn SchemaLoader>,
            factory: &Arc<SchemaEntityFactory>,
            fallback: &str,
        ) -> (SchemaObjectType, Arc<dyn SchemaChangeHandler>) {
            let handler = MetaHandler::<T>::new(
                Arc::clone(registries),
                Arc::clone(loader),
                Arc::clone(factory),
                fallback,
            );
            (T::KIND, Arc::new(handler))
        }

        let fallback = config.fallback_schema.as_str();
        let handlers = [
            handler::<Comparator>(&registries, &loader, &factory, fallback),
            handler::<Normalizer>(&registries, &loader, &factory, fallback),
            handler::<SyntaxChecker>(&registries, &loader, &factory, fallback),
            handler::<Syntax>(&registries, &loader, &factory, fallback),
            handler::<MatchingRule>(&registries, &loader, &factory, fallback),
            handler::<NameForm>(&registries, &loader, &factory, fallback),
        ]
        .into_iter()
        .collect();

        Self {
            config,
            registries,
            loader,
            factory,
            handlers,
            generation: RwLock::new(SchemaGeneration::new()),
        }
    }

    pub fn config(&self) -> &SchemaServiceConfig {
        &self.config
    }

    pub fn registries(&self) -> &Arc<Registries> {
        &self.registries
    }

    pub fn loader(&self) -> &Arc<dyn SchemaLoader> {
        &self.loader
    }

    pub fn factory(&self) -> &Arc<SchemaEntityFactory> {
        &self.factory
    }

    /// The handler for `kind`.
    pub fn handler(&self, kind: SchemaObjectType) -> SchemaResult<&Arc<dyn SchemaChangeHandler>> {
        self.handlers
            .get(&kind)
            .ok_or_else(|| SchemaError::unsupported(format!("no handler for {kind}")))
    }

    pub fn generation(&self) -> SchemaGeneration {
        *self.generation.read()
    }

    fn record(&self, outcome: ChangeOutcome) -> ChangeOutcome {
        if outcome.is_modified() {
            self.generation.write().advance();
        }
        outcome
    }

    /// The handler owning entries under `dn`'s container.
    fn route(&self, dn: &Dn) -> SchemaResult<&Arc<dyn SchemaChangeHandler>> {
        let parent = dn
            .parent()
            .ok_or_else(|| SchemaError::naming_violation("The root entry is not a schema entity"))?;
        let kind = parent
            .rdn()
            .and_then(|rdn| SchemaObjectType::from_container_label(rdn.value()))
            .ok_or_else(|| {
                SchemaError::unsupported(format!("no schema handler for entries under '{parent}'"))
            })?;
        debug!("Routing change of {} to the {} handler", dn, kind);
        self.handler(kind)
    }

    fn dispatch(
        handler: &dyn SchemaChangeHandler,
        change: &SchemaChange,
    ) -> SchemaResult<ChangeOutcome> {
        match change {
            SchemaChange::Add { entry } => handler.add(entry.dn(), entry),
            SchemaChange::Delete { entry, cascade } => handler.delete(entry.dn(), entry, *cascade),
            SchemaChange::Modify {
                entry,
                target,
                cascade,
            } => handler.modify(entry.dn(), entry, target, *cascade),
            SchemaChange::Rename {
                entry,
                new_rdn,
                cascade,
            } => handler.rename(entry.dn(), entry, new_rdn, *cascade),
            SchemaChange::Move {
                entry,
                new_parent,
                new_rdn: Some(new_rdn),
                delete_old_rdn,
                cascade,
            } => handler.move_and_rename(
                entry.dn(),
                new_parent,
                new_rdn,
                *delete_old_rdn,
                entry,
                *cascade,
            ),
            SchemaChange::Move {
                entry,
                new_parent,
                new_rdn: None,
                cascade,
                ..
            } => handler.replace(entry.dn(), new_parent, entry, *cascade),
        }
    }

    /// Mirror one directory change into the live registries.
    pub fn handle(&self, request: SchemaChangeRequest) -> SchemaResult<ChangeOutcome> {
        let request_id = request
            .request_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let change = &request.change;

        info!(
            "Schema service processing {} of {} (request: '{}')",
            change.name(),
            change.dn(),
            request_id
        );

        let result = self
            .route(change.dn())
            .and_then(|handler| Self::dispatch(handler.as_ref(), change));

        match &result {
            Ok(outcome) => {
                debug!(
                    "Schema service completed {} with {:?} (request: '{}')",
                    change.name(),
                    outcome,
                    request_id
                );
            }
            Err(e) => {
                warn!("Schema service failed: {} (request: '{}')", e, request_id);
            }
        }
        result.map(|outcome| self.record(outcome))
    }

    /// Register a description that has no directory entry, routed by kind.
    pub fn add_description(
        &self,
        description: SchemaObjectDescription,
    ) -> SchemaResult<ChangeOutcome> {
        let outcome = self.handler(description.kind())?.add_description(description)?;
        Ok(self.record(outcome))
    }

    /// Remove the live object of `kind` with `oid`, if any.
    pub fn delete_oid(&self, kind: SchemaObjectType, oid: &Oid) -> SchemaResult<ChangeOutcome> {
        let outcome = self.handler(kind)?.delete_oid(oid, false)?;
        Ok(self.record(outcome))
    }

    /// Disable a schema, withdrawing its objects from the registries.
    ///
    /// Refused with [`SchemaError::SchemaDependency`] while an enabled schema
    /// lists this one as a dependency, and with
    /// [`SchemaError::PrecludedByDependents`] while an object of another
    /// schema references one of this schema's objects.
    pub fn disable_schema(&self, name: &str) -> SchemaResult<ChangeOutcome> {
        let _writes = self.registries.lock_writes();
        let schema = self.loader.schema(name)?;
        if schema.is_disabled() {
            debug!("Schema '{}' is already disabled", schema.name());
            return Ok(ChangeOutcome::Unchanged);
        }

        if let Some(dependent) = self
            .loader
            .schemas()
            .into_iter()
            .find(|s| s.is_enabled() && s.depends_on(schema.name()))
        {
            warn!(
                "Refusing to disable schema '{}': schema '{}' depends on it",
                schema.name(),
                dependent.name()
            );
            return Err(SchemaError::schema_dependency(
                schema.name(),
                "disabled",
                format!("enabled schema '{}' depends on it", dependent.name()),
            ));
        }

        let external = self.registries.external_dependents(schema.name());
        if let Some((referenced, _)) = external.first() {
            let dependents: Vec<String> = external
                .iter()
                .filter(|(r, _)| r == referenced)
                .map(|(_, d)| d.to_string())
                .collect();
            warn!(
                "Refusing to disable schema '{}': {} {} is referenced by {:?}",
                schema.name(),
                referenced.kind,
                referenced.oid,
                dependents
            );
            return Err(SchemaError::PrecludedByDependents {
                kind: referenced.kind,
                oid: referenced.oid.to_string(),
                action: "disabled with its schema",
                dependents,
            });
        }

        self.loader.set_disabled(schema.name(), true)?;
        let removed = self.registries.purge_schema(schema.name());
        info!("Disabled schema '{}', {} objects withdrawn", schema.name(), removed);
        Ok(self.record(ChangeOutcome::Modified))
    }

    /// Enable a schema and register its object descriptions.
    ///
    /// Every dependency must be enabled. Every description is built and
    /// checked for OID and name collisions, against the live registries and
    /// within the batch, before anything is registered. Enabling an enabled
    /// schema does nothing.
    pub fn enable_schema(
        &self,
        name: &str,
        descriptions: impl IntoIterator<Item = SchemaObjectDescription>,
    ) -> SchemaResult<ChangeOutcome> {
        let _writes = self.registries.lock_writes();
        let schema = self.loader.schema(name)?;
        if schema.is_enabled() {
            debug!("Schema '{}' is already enabled", schema.name());
            return Ok(ChangeOutcome::Unchanged);
        }

        for dependency in schema.dependencies() {
            let enabled = self.loader.schema(dependency).map(|d| d.is_enabled());
            if !matches!(enabled, Ok(true)) {
                warn!(
                    "Refusing to enable schema '{}': dependency '{}' is not enabled",
                    schema.name(),
                    dependency
                );
                return Err(SchemaError::schema_dependency(
                    schema.name(),
                    "enabled",
                    format!("it depends on '{dependency}', which is not enabled"),
                ));
            }
        }

        let mut descriptions: Vec<SchemaObjectDescription> = descriptions
            .into_iter()
            .map(|d| d.with_schema(schema.name()))
            .collect();
        // Referenced kinds first.
        descriptions.sort_by_key(|d| {
            std::cmp::Reverse(SchemaObjectType::ALL.iter().position(|k| *k == d.kind()))
        });

        let mut seen = HashSet::new();
        let mut batch_names: HashMap<String, Oid> = HashMap::new();
        let mut staged = Vec::with_capacity(descriptions.len());
        for description in descriptions {
            if !seen.insert((description.kind(), description.oid().clone())) {
                return Err(SchemaError::already_exists(
                    description.kind(),
                    description.oid().as_str(),
                ));
            }
            for name in description.registered_names() {
                let bound = batch_names
                    .entry(normalize(&name))
                    .or_insert_with(|| description.oid().clone());
                if *bound != *description.oid() {
                    return Err(SchemaError::NameConflict {
                        name,
                        bound: bound.to_string(),
                        requested: description.oid().to_string(),
                    });
                }
            }
            staged.push(self.stage(schema.name(), description)?);
        }

        self.loader.set_disabled(schema.name(), false)?;
        let count = staged.len();
        for register in staged {
            if let Err(e) = register() {
                warn!(
                    "Enabling schema '{}' failed, withdrawing it again: {}",
                    schema.name(),
                    e
                );
                self.registries.purge_schema(schema.name());
                self.loader.set_disabled(schema.name(), true)?;
                return Err(e);
            }
        }
        info!("Enabled schema '{}' with {} objects", schema.name(), count);
        Ok(self.record(ChangeOutcome::Modified))
    }

    /// Build `description` and check it can be registered, returning the
    /// registration to run.
    fn stage(
        &self,
        schema_name: &str,
        description: SchemaObjectDescription,
    ) -> SchemaResult<Registration<'_>> {
        match description.kind() {
            SchemaObjectType::Comparator => self.stage_kind::<Comparator>(schema_name, description),
            SchemaObjectType::Normalizer => self.stage_kind::<Normalizer>(schema_name, description),
            SchemaObjectType::SyntaxChecker => {
                self.stage_kind::<SyntaxChecker>(schema_name, description)
            }
            SchemaObjectType::Syntax => self.stage_kind::<Syntax>(schema_name, description),
            SchemaObjectType::MatchingRule => {
                self.stage_kind::<MatchingRule>(schema_name, description)
            }
            SchemaObjectType::NameForm => self.stage_kind::<NameForm>(schema_name, description),
        }
    }

    fn stage_kind<T: SchemaObject>(
        &self,
        schema_name: &str,
        description: SchemaObjectDescription,
    ) -> SchemaResult<Registration<'_>> {
        let object = T::build(&description, &self.factory)?;
        let catalog = T::catalog(&self.registries);
        if catalog.has(description.oid().as_str()) {
            return Err(SchemaError::already_exists(T::KIND, description.oid().as_str()));
        }
        self.registries
            .oid_registry()
            .check_names(&description.registered_names(), description.oid())?;

        let schema_name = schema_name.to_string();
        Ok(Box::new(move || catalog.register(&schema_name, description, object)))
    }
}

impl std::fmt::Debug for SchemaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaService")
            .field("config", &self.config)
            .field("registries", &self.registries)
            .field("generation", &self.generation())
            .finish()
    }
}
