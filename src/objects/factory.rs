//! Building descriptions and runtime objects from directory entries.
//!
//! The factory is the only place that reads meta attributes (`m-oid`,
//! `m-fqcn`, `m-bytecode`, ...). It turns an [`Entry`] into a
//! [`SchemaObjectDescription`] and a description into a runtime object.
//!
//! Implementation names are resolved against compiled-in
//! [`ImplementationTable`]s: first by the full name, then by its last dotted
//! segment, so `org.example.StringComparator` and `StringComparator` select
//! the same implementation. Executable payloads (`m-bytecode`) are never run;
//! they are refused unless the factory was configured to accept them, in
//! which case they are kept as Base64 text on the description.

use crate::constants::{
    M_BYTECODE, M_DESCRIPTION, M_FQCN, M_HUMAN_READABLE, M_MAY, M_MUST, M_NAME, M_OBSOLETE, M_OC,
    M_OID, M_SYNTAX,
};
use crate::entry::{AttributeValue, Entry};
use crate::error::{SchemaError, SchemaResult, ValidationError};
use crate::naming::Oid;
use crate::objects::comparator::builtin_comparators;
use crate::objects::normalizer::builtin_normalizers;
use crate::objects::syntax_checker::builtin_syntax_checkers;
use crate::objects::{
    CheckSyntax, Compare, Comparator, MatchingRule, NameForm, Normalize, Normalizer, ObjectPayload,
    SchemaObject, SchemaObjectDescription, SchemaObjectType, Syntax, SyntaxChecker,
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use log::{debug, trace};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Implementations of one capability, keyed by lower-cased name.
pub struct ImplementationTable<I: ?Sized> {
    by_name: HashMap<String, Arc<I>>,
}

impl<I: ?Sized> ImplementationTable<I> {
    pub fn new() -> Self {
        Self {
            by_name: HashMap::new(),
        }
    }

    /// Register an implementation, replacing any previous one of that name.
    pub fn insert(&mut self, name: &str, implementation: Arc<I>) {
        self.by_name.insert(name.to_lowercase(), implementation);
    }

    /// Resolve by full name, then by the last dotted segment.
    pub fn resolve(&self, fqcn: &str) -> Option<Arc<I>> {
        let key = fqcn.trim().to_lowercase();
        if let Some(found) = self.by_name.get(&key) {
            return Some(Arc::clone(found));
        }
        let simple = key.rsplit('.').next()?;
        self.by_name.get(simple).map(Arc::clone)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl<I: ?Sized> Default for ImplementationTable<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ?Sized> fmt::Debug for ImplementationTable<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.by_name.keys().collect();
        names.sort();
        f.debug_struct("ImplementationTable")
            .field("names", &names)
            .finish()
    }
}

impl<I: ?Sized> FromIterator<(&'static str, Arc<I>)> for ImplementationTable<I> {
    fn from_iter<T: IntoIterator<Item = (&'static str, Arc<I>)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (name, implementation) in iter {
            table.insert(name, implementation);
        }
        table
    }
}

/// Builds schema descriptions and runtime objects.
#[derive(Debug)]
pub struct SchemaEntityFactory {
    comparators: ImplementationTable<dyn Compare>,
    normalizers: ImplementationTable<dyn Normalize>,
    syntax_checkers: ImplementationTable<dyn CheckSyntax>,
    accept_bytecode: bool,
}

impl Default for SchemaEntityFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaEntityFactory {
    /// A factory knowing every built-in implementation, refusing bytecode.
    pub fn new() -> Self {
        Self {
            comparators: builtin_comparators().into_iter().collect(),
            normalizers: builtin_normalizers().into_iter().collect(),
            syntax_checkers: builtin_syntax_checkers().into_iter().collect(),
            accept_bytecode: false,
        }
    }

    /// Keep `m-bytecode` payloads instead of refusing them.
    pub fn with_bytecode_accepted(mut self, accept: bool) -> Self {
        self.accept_bytecode = accept;
        self
    }

    pub fn accepts_bytecode(&self) -> bool {
        self.accept_bytecode
    }

    pub fn register_comparator(&mut self, name: &str, implementation: Arc<dyn Compare>) {
        self.comparators.insert(name, implementation);
    }

    pub fn register_normalizer(&mut self, name: &str, implementation: Arc<dyn Normalize>) {
        self.normalizers.insert(name, implementation);
    }

    pub fn register_syntax_checker(&mut self, name: &str, implementation: Arc<dyn CheckSyntax>) {
        self.syntax_checkers.insert(name, implementation);
    }

    /// The OID stored in the entry's `m-oid` attribute.
    pub fn oid_of(&self, entry: &Entry) -> SchemaResult<Oid> {
        Ok(Oid::new(entry.required_string(M_OID)?.trim())?)
    }

    /// Describe `entry` as a `kind` owned by `schema_name`.
    pub fn describe(
        &self,
        kind: SchemaObjectType,
        entry: &Entry,
        schema_name: &str,
    ) -> SchemaResult<SchemaObjectDescription> {
        let oid = self.oid_of(entry)?;
        self.describe_as(kind, entry, oid, schema_name)
    }

    /// Describe `entry` under an explicit OID, ignoring its `m-oid` value.
    pub fn describe_as(
        &self,
        kind: SchemaObjectType,
        entry: &Entry,
        oid: Oid,
        schema_name: &str,
    ) -> SchemaResult<SchemaObjectDescription> {
        let payload = self.payload_from_entry(kind, entry, &oid)?;
        let mut builder = SchemaObjectDescription::builder(kind, oid, payload)
            .names(entry.strings(M_NAME))
            .obsolete(is_true(entry.first_string(M_OBSOLETE)))
            .schema(schema_name);
        if let Some(description) = entry.first_string(M_DESCRIPTION) {
            builder = builder.description(description);
        }
        let description = builder.build()?;
        trace!(
            "Described {} {} for schema '{}'",
            kind,
            description.oid(),
            schema_name
        );
        Ok(description)
    }

    fn payload_from_entry(
        &self,
        kind: SchemaObjectType,
        entry: &Entry,
        oid: &Oid,
    ) -> SchemaResult<ObjectPayload> {
        match kind {
            SchemaObjectType::Comparator
            | SchemaObjectType::Normalizer
            | SchemaObjectType::SyntaxChecker => Ok(ObjectPayload::Implementation {
                fqcn: entry.required_string(M_FQCN)?.to_string(),
                bytecode: self.bytecode_from_entry(kind, entry, oid)?,
            }),
            SchemaObjectType::Syntax => Ok(ObjectPayload::Syntax {
                human_readable: entry
                    .first_string(M_HUMAN_READABLE)
                    .map(|v| v.eq_ignore_ascii_case("TRUE"))
                    .unwrap_or(true),
            }),
            SchemaObjectType::MatchingRule => Ok(ObjectPayload::MatchingRule {
                syntax: entry
                    .first_string(M_SYNTAX)
                    .map(|v| Oid::new(v.trim()))
                    .transpose()?,
            }),
            SchemaObjectType::NameForm => {
                let must: Vec<String> = entry.strings(M_MUST).into_iter().map(str::to_string).collect();
                if must.is_empty() {
                    return Err(SchemaError::missing_attribute(entry.dn().to_string(), M_MUST));
                }
                Ok(ObjectPayload::NameForm {
                    structural_object_class: entry.required_string(M_OC)?.to_string(),
                    must,
                    may: entry.strings(M_MAY).into_iter().map(str::to_string).collect(),
                })
            }
        }
    }

    fn bytecode_from_entry(
        &self,
        kind: SchemaObjectType,
        entry: &Entry,
        oid: &Oid,
    ) -> SchemaResult<Option<String>> {
        let Some(value) = entry.get(M_BYTECODE).and_then(|values| values.first()) else {
            return Ok(None);
        };
        if !self.accept_bytecode {
            return Err(SchemaError::BytecodeRejected {
                kind,
                oid: oid.to_string(),
            });
        }
        let encoded = match value {
            AttributeValue::Binary(bytes) => BASE64.encode(bytes),
            AttributeValue::Text(text) => {
                BASE64
                    .decode(text.trim())
                    .map_err(|e| ValidationError::InvalidBinaryData {
                        attribute: M_BYTECODE.to_string(),
                        details: e.to_string(),
                    })?;
                text.trim().to_string()
            }
        };
        debug!("Keeping {} bytes of encoded payload for {} {}", encoded.len(), kind, oid);
        Ok(Some(encoded))
    }

    fn implementation<I: ?Sized>(
        &self,
        table: &ImplementationTable<I>,
        description: &SchemaObjectDescription,
    ) -> SchemaResult<(String, Arc<I>)> {
        let kind = description.kind();
        let Some(fqcn) = description.fqcn() else {
            return Err(SchemaError::unsupported(format!(
                "description {} does not name a {} implementation",
                description.oid(),
                kind
            )));
        };
        if description.bytecode().is_some() && !self.accept_bytecode {
            return Err(SchemaError::BytecodeRejected {
                kind,
                oid: description.oid().to_string(),
            });
        }
        let implementation = table
            .resolve(fqcn)
            .ok_or_else(|| SchemaError::UnknownImplementation {
                kind,
                fqcn: fqcn.to_string(),
            })?;
        Ok((fqcn.to_string(), implementation))
    }

    fn expect_kind(
        description: &SchemaObjectDescription,
        kind: SchemaObjectType,
    ) -> SchemaResult<()> {
        if description.kind() == kind {
            Ok(())
        } else {
            Err(SchemaError::unsupported(format!(
                "cannot build a {} from a {} description",
                kind,
                description.kind()
            )))
        }
    }

    pub fn comparator(&self, description: &SchemaObjectDescription) -> SchemaResult<Comparator> {
        Self::expect_kind(description, SchemaObjectType::Comparator)?;
        let (fqcn, implementation) = self.implementation(&self.comparators, description)?;
        Ok(Comparator::new(description.oid().clone(), fqcn, implementation))
    }

    pub fn normalizer(&self, description: &SchemaObjectDescription) -> SchemaResult<Normalizer> {
        Self::expect_kind(description, SchemaObjectType::Normalizer)?;
        let (fqcn, implementation) = self.implementation(&self.normalizers, description)?;
        Ok(Normalizer::new(description.oid().clone(), fqcn, implementation))
    }

    pub fn syntax_checker(
        &self,
        description: &SchemaObjectDescription,
    ) -> SchemaResult<SyntaxChecker> {
        Self::expect_kind(description, SchemaObjectType::SyntaxChecker)?;
        let (fqcn, implementation) = self.implementation(&self.syntax_checkers, description)?;
        Ok(SyntaxChecker::new(description.oid().clone(), fqcn, implementation))
    }

    pub fn syntax(&self, description: &SchemaObjectDescription) -> SchemaResult<Syntax> {
        Self::expect_kind(description, SchemaObjectType::Syntax)?;
        Syntax::build(description, self)
    }

    pub fn matching_rule(
        &self,
        description: &SchemaObjectDescription,
    ) -> SchemaResult<MatchingRule> {
        Self::expect_kind(description, SchemaObjectType::MatchingRule)?;
        MatchingRule::build(description, self)
    }

    pub fn name_form(&self, description: &SchemaObjectDescription) -> SchemaResult<NameForm> {
        Self::expect_kind(description, SchemaObjectType::NameForm)?;
        NameForm::build(description, self)
    }
}

fn is_true(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("TRUE"))
}
