//! Matching rules.
//!
//! A matching rule is evaluated with the comparator and normalizer that share
//! its OID, and optionally constrains assertion values to a syntax.

use crate::error::{SchemaError, SchemaResult};
use crate::naming::Oid;
use crate::objects::{
    ObjectPayload, SchemaEntityFactory, SchemaObject, SchemaObjectDescription, SchemaObjectType,
    SchemaReference,
};
use crate::registry::{ObjectCatalog, Registries};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingRule {
    oid: Oid,
    names: Vec<String>,
    description: Option<String>,
    obsolete: bool,
    syntax: Option<Oid>,
}

impl MatchingRule {
    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_obsolete(&self) -> bool {
        self.obsolete
    }

    /// OID of the syntax assertion values must follow.
    pub fn syntax(&self) -> Option<&Oid> {
        self.syntax.as_ref()
    }
}

impl SchemaObject for MatchingRule {
    const KIND: SchemaObjectType = SchemaObjectType::MatchingRule;

    fn build(
        description: &SchemaObjectDescription,
        _factory: &SchemaEntityFactory,
    ) -> SchemaResult<Self> {
        let ObjectPayload::MatchingRule { syntax } = description.payload() else {
            return Err(SchemaError::unsupported(format!(
                "description {} is not a matching rule",
                description.oid()
            )));
        };
        Ok(Self {
            oid: description.oid().clone(),
            names: description.names().to_vec(),
            description: description.description().map(str::to_string),
            obsolete: description.is_obsolete(),
            syntax: syntax.clone(),
        })
    }

    fn references(&self) -> Vec<SchemaReference> {
        let mut references = vec![
            SchemaReference::new(SchemaObjectType::Comparator, self.oid.clone()),
            SchemaReference::new(SchemaObjectType::Normalizer, self.oid.clone()),
        ];
        if let Some(syntax) = &self.syntax {
            references.push(SchemaReference::new(SchemaObjectType::Syntax, syntax.clone()));
        }
        references
    }

    fn catalog(registries: &Registries) -> &Arc<dyn ObjectCatalog<Self>> {
        registries.matching_rules()
    }
}
