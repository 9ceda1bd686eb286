//! The bundle of catalogs a schema service works against.
//!
//! [`Registries`] owns the shared [`OidRegistry`], one catalog per
//! [`SchemaObjectType`] and the writer lock. Handlers take the writer lock
//! for the whole of a change, so a dependency check and the mutation it
//! guards can never interleave with another change. Readers never take it.
//!
//! Lock order: writer lock, then catalog locks one at a time, then the OID
//! registry (taken inside [`ObjectCatalog::apply`]).

use crate::error::SchemaResult;
use crate::naming::Oid;
use crate::objects::{
    Comparator, MatchingRule, NameForm, Normalizer, SchemaObject, SchemaObjectType,
    SchemaReference, Syntax, SyntaxChecker,
};
use crate::registry::{
    CatalogProbe, DependencyProbe, Dependent, ObjectCatalog, OidRegistry, SchemaCatalog,
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use log::info;
use parking_lot::{Mutex, MutexGuard};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Every catalog of the live schema, plus the OID registry they share.
pub struct Registries {
    oid_registry: Arc<OidRegistry>,
    comparators: Arc<dyn ObjectCatalog<Comparator>>,
    normalizers: Arc<dyn ObjectCatalog<Normalizer>>,
    syntax_checkers: Arc<dyn ObjectCatalog<SyntaxChecker>>,
    syntaxes: Arc<dyn ObjectCatalog<Syntax>>,
    matching_rules: Arc<dyn ObjectCatalog<MatchingRule>>,
    name_forms: Arc<dyn ObjectCatalog<NameForm>>,
    writes: Mutex<()>,
}

impl Default for Registries {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registries")
            .field("oid_names", &self.oid_registry.len())
            .field("comparators", &self.comparators.len())
            .field("normalizers", &self.normalizers.len())
            .field("syntax_checkers", &self.syntax_checkers.len())
            .field("syntaxes", &self.syntaxes.len())
            .field("matching_rules", &self.matching_rules.len())
            .field("name_forms", &self.name_forms.len())
            .finish()
    }
}

impl Registries {
    /// In-memory catalogs over a bootstrapped OID registry.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RegistriesBuilder {
        RegistriesBuilder::default()
    }

    pub fn oid_registry(&self) -> &Arc<OidRegistry> {
        &self.oid_registry
    }

    pub fn comparators(&self) -> &Arc<dyn ObjectCatalog<Comparator>> {
        &self.comparators
    }

    pub fn normalizers(&self) -> &Arc<dyn ObjectCatalog<Normalizer>> {
        &self.normalizers
    }

    pub fn syntax_checkers(&self) -> &Arc<dyn ObjectCatalog<SyntaxChecker>> {
        &self.syntax_checkers
    }

    pub fn syntaxes(&self) -> &Arc<dyn ObjectCatalog<Syntax>> {
        &self.syntaxes
    }

    pub fn matching_rules(&self) -> &Arc<dyn ObjectCatalog<MatchingRule>> {
        &self.matching_rules
    }

    pub fn name_forms(&self) -> &Arc<dyn ObjectCatalog<NameForm>> {
        &self.name_forms
    }

    /// Serialize schema changes. Held for the whole of a handler operation.
    pub fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writes.lock()
    }

    /// A probe over the catalog of `kind`.
    pub fn probe(&self, kind: SchemaObjectType) -> Box<dyn DependencyProbe> {
        fn boxed<T: SchemaObject>(catalog: &Arc<dyn ObjectCatalog<T>>) -> Box<dyn DependencyProbe> {
            Box::new(CatalogProbe::new(Arc::clone(catalog)))
        }
        match kind {
            SchemaObjectType::Comparator => boxed(&self.comparators),
            SchemaObjectType::Normalizer => boxed(&self.normalizers),
            SchemaObjectType::SyntaxChecker => boxed(&self.syntax_checkers),
            SchemaObjectType::Syntax => boxed(&self.syntaxes),
            SchemaObjectType::MatchingRule => boxed(&self.matching_rules),
            SchemaObjectType::NameForm => boxed(&self.name_forms),
        }
    }

    /// Live objects referencing the `kind` object identified by `oid`.
    pub fn dependents_of(&self, kind: SchemaObjectType, oid: &Oid) -> Vec<Dependent> {
        kind.referenced_by()
            .iter()
            .flat_map(|dependent_kind| self.probe(*dependent_kind).dependents_of(kind, oid))
            .collect()
    }

    /// OIDs of every `kind` object owned by `schema_name`.
    pub fn schema_elements(&self, kind: SchemaObjectType, schema_name: &str) -> Vec<Oid> {
        fn owned<T: SchemaObject>(catalog: &Arc<dyn ObjectCatalog<T>>, schema_name: &str) -> Vec<Oid> {
            catalog
                .entries()
                .into_iter()
                .filter(|e| e.schema_name.eq_ignore_ascii_case(schema_name))
                .map(|e| e.oid().clone())
                .collect()
        }
        match kind {
            SchemaObjectType::Comparator => owned(&self.comparators, schema_name),
            SchemaObjectType::Normalizer => owned(&self.normalizers, schema_name),
            SchemaObjectType::SyntaxChecker => owned(&self.syntax_checkers, schema_name),
            SchemaObjectType::Syntax => owned(&self.syntaxes, schema_name),
            SchemaObjectType::MatchingRule => owned(&self.matching_rules, schema_name),
            SchemaObjectType::NameForm => owned(&self.name_forms, schema_name),
        }
    }

    /// Objects outside `schema_name` referencing objects inside it, each
    /// paired with the object it references.
    pub fn external_dependents(&self, schema_name: &str) -> Vec<(SchemaReference, Dependent)> {
        let mut found = Vec::new();
        for kind in SchemaObjectType::ALL {
            for oid in self.schema_elements(kind, schema_name) {
                for dependent in self.dependents_of(kind, &oid) {
                    if !dependent.schema_name.eq_ignore_ascii_case(schema_name) {
                        found.push((SchemaReference::new(kind, oid.clone()), dependent));
                    }
                }
            }
        }
        found
    }

    /// Remove every object owned by `schema_name`, dependents first.
    pub fn unregister_schema_elements(&self, schema_name: &str) -> usize {
        let _writes = self.lock_writes();
        self.purge_schema(schema_name)
    }

    /// Like [`Registries::unregister_schema_elements`], for callers already
    /// holding the writer lock.
    pub(crate) fn purge_schema(&self, schema_name: &str) -> usize {
        let removed: usize = SchemaObjectType::ALL
            .into_iter()
            .map(|kind| match kind {
                SchemaObjectType::Comparator => self.comparators.unregister_schema_elements(schema_name),
                SchemaObjectType::Normalizer => self.normalizers.unregister_schema_elements(schema_name),
                SchemaObjectType::SyntaxChecker => {
                    self.syntax_checkers.unregister_schema_elements(schema_name)
                }
                SchemaObjectType::Syntax => self.syntaxes.unregister_schema_elements(schema_name),
                SchemaObjectType::MatchingRule => {
                    self.matching_rules.unregister_schema_elements(schema_name)
                }
                SchemaObjectType::NameForm => self.name_forms.unregister_schema_elements(schema_name),
            })
            .map(|oids| oids.len())
            .sum();
        info!("Removed {} objects of schema '{}'", removed, schema_name);
        removed
    }

    /// Reassign every object owned by `from` to `to`.
    pub fn rename_schema(&self, from: &str, to: &str) -> usize {
        let _writes = self.lock_writes();
        let moved = self.comparators.rename_schema(from, to)
            + self.normalizers.rename_schema(from, to)
            + self.syntax_checkers.rename_schema(from, to)
            + self.syntaxes.rename_schema(from, to)
            + self.matching_rules.rename_schema(from, to)
            + self.name_forms.rename_schema(from, to);
        info!("Renamed schema '{}' to '{}' on {} objects", from, to, moved);
        moved
    }

    /// The comparator a matching rule orders values with.
    pub fn comparator_for(&self, rule: &MatchingRule) -> SchemaResult<Arc<Comparator>> {
        self.comparators.lookup(rule.oid().as_str())
    }

    /// The normalizer a matching rule canonicalizes values with.
    pub fn normalizer_for(&self, rule: &MatchingRule) -> SchemaResult<Arc<Normalizer>> {
        self.normalizers.lookup(rule.oid().as_str())
    }

    /// The checker validating values of a syntax.
    pub fn syntax_checker_for(&self, syntax: &Syntax) -> SchemaResult<Arc<SyntaxChecker>> {
        self.syntax_checkers.lookup(syntax.oid().as_str())
    }

    /// Number of live objects across every catalog.
    pub fn len(&self) -> usize {
        self.comparators.len()
            + self.normalizers.len()
            + self.syntax_checkers.len()
            + self.syntaxes.len()
            + self.matching_rules.len()
            + self.name_forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content hash of every catalog.
    pub fn fingerprint(&self) -> SchemaResult<String> {
        let mut hasher = Sha256::new();
        for part in [
            self.comparators.fingerprint()?,
            self.normalizers.fingerprint()?,
            self.syntax_checkers.fingerprint()?,
            self.syntaxes.fingerprint()?,
            self.matching_rules.fingerprint()?,
            self.name_forms.fingerprint()?,
        ] {
            hasher.update(part.as_bytes());
        }
        Ok(BASE64.encode(hasher.finalize()))
    }
}

/// Assembles [`Registries`], defaulting to in-memory catalogs.
#[derive(Default)]
pub struct RegistriesBuilder {
    oid_registry: Option<Arc<OidRegistry>>,
    comparators: Option<Arc<dyn ObjectCatalog<Comparator>>>,
    normalizers: Option<Arc<dyn ObjectCatalog<Normalizer>>>,
    syntax_checkers: Option<Arc<dyn ObjectCatalog<SyntaxChecker>>>,
    syntaxes: Option<Arc<dyn ObjectCatalog<Syntax>>>,
    matching_rules: Option<Arc<dyn ObjectCatalog<MatchingRule>>>,
    name_forms: Option<Arc<dyn ObjectCatalog<NameForm>>>,
}

impl RegistriesBuilder {
    pub fn with_oid_registry(mut self, oid_registry: Arc<OidRegistry>) -> Self {
        self.oid_registry = Some(oid_registry);
        self
    }

    pub fn with_comparators(mut self, catalog: Arc<dyn ObjectCatalog<Comparator>>) -> Self {
        self.comparators = Some(catalog);
        self
    }

    pub fn with_normalizers(mut self, catalog: Arc<dyn ObjectCatalog<Normalizer>>) -> Self {
        self.normalizers = Some(catalog);
        self
    }

    pub fn with_syntax_checkers(mut self, catalog: Arc<dyn ObjectCatalog<SyntaxChecker>>) -> Self {
        self.syntax_checkers = Some(catalog);
        self
    }

    pub fn with_syntaxes(mut self, catalog: Arc<dyn ObjectCatalog<Syntax>>) -> Self {
        self.syntaxes = Some(catalog);
        self
    }

    pub fn with_matching_rules(mut self, catalog: Arc<dyn ObjectCatalog<MatchingRule>>) -> Self {
        self.matching_rules = Some(catalog);
        self
    }

    pub fn with_name_forms(mut self, catalog: Arc<dyn ObjectCatalog<NameForm>>) -> Self {
        self.name_forms = Some(catalog);
        self
    }

    pub fn build(self) -> Registries {
        let oid_registry = self
            .oid_registry
            .unwrap_or_else(|| Arc::new(OidRegistry::bootstrapped()));

        fn or_default<T: SchemaObject>(
            catalog: Option<Arc<dyn ObjectCatalog<T>>>,
            oid_registry: &Arc<OidRegistry>,
        ) -> Arc<dyn ObjectCatalog<T>> {
            catalog.unwrap_or_else(|| Arc::new(SchemaCatalog::<T>::new(Arc::clone(oid_registry))))
        }

        Registries {
            comparators: or_default(self.comparators, &oid_registry),
            normalizers: or_default(self.normalizers, &oid_registry),
            syntax_checkers: or_default(self.syntax_checkers, &oid_registry),
            syntaxes: or_default(self.syntaxes, &oid_registry),
            matching_rules: or_default(self.matching_rules, &oid_registry),
            name_forms: or_default(self.name_forms, &oid_registry),
            oid_registry,
            writes: Mutex::new(()),
        }
    }
}
