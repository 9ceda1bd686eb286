//! Schema entity kinds and their runtime representations.
//!
//! Every kind stored in the meta-schema has three faces:
//!
//! - a directory entry under `ou=<container>,cn=<schema>,ou=schema`;
//! - an immutable [`SchemaObjectDescription`] built from that entry;
//! - a runtime object (a [`Comparator`], a [`MatchingRule`], ...) built from
//!   the description by the [`SchemaEntityFactory`] and held by the kind's
//!   catalog.
//!
//! # Key Types
//!
//! - [`SchemaObjectType`] - the closed set of kinds, with their container labels
//! - [`SchemaObject`] - what a runtime object must provide to be catalogued
//! - [`SchemaReference`] - a typed edge from one catalogued object to another

pub mod comparator;
pub mod description;
pub mod factory;
pub mod matching_rule;
pub mod name_form;
pub mod normalizer;
pub mod syntax;
pub mod syntax_checker;

pub use comparator::{Compare, Comparator};
pub use description::{DescriptionBuilder, ObjectPayload, SchemaObjectDescription};
pub use factory::{ImplementationTable, SchemaEntityFactory};
pub use matching_rule::MatchingRule;
pub use name_form::NameForm;
pub use normalizer::{Normalize, Normalizer};
pub use syntax::Syntax;
pub use syntax_checker::{CheckSyntax, SyntaxChecker};

use crate::error::SchemaResult;
use crate::naming::Oid;
use crate::registry::{ObjectCatalog, Registries};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The kinds of schema entities held by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemaObjectType {
    Comparator,
    Normalizer,
    SyntaxChecker,
    Syntax,
    MatchingRule,
    NameForm,
}

impl SchemaObjectType {
    /// Every kind, dependents before the kinds they reference.
    pub const ALL: [SchemaObjectType; 6] = [
        Self::MatchingRule,
        Self::NameForm,
        Self::Syntax,
        Self::Comparator,
        Self::Normalizer,
        Self::SyntaxChecker,
    ];

    /// Value of the `ou` naming the container that holds this kind.
    pub fn container_label(self) -> &'static str {
        match self {
            Self::Comparator => "comparators",
            Self::Normalizer => "normalizers",
            Self::SyntaxChecker => "syntaxCheckers",
            Self::Syntax => "syntaxes",
            Self::MatchingRule => "matchingRules",
            Self::NameForm => "nameForms",
        }
    }

    /// The kind whose container carries `label`, compared case-insensitively.
    pub fn from_container_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.container_label().eq_ignore_ascii_case(label))
    }

    /// Kinds whose live objects may reference an object of this kind.
    pub fn referenced_by(self) -> &'static [SchemaObjectType] {
        match self {
            Self::Comparator | Self::Normalizer | Self::Syntax => &[Self::MatchingRule],
            Self::SyntaxChecker => &[Self::Syntax],
            Self::MatchingRule | Self::NameForm => &[],
        }
    }

    /// Whether descriptions of this kind carry an implementation name.
    pub fn is_implementation(self) -> bool {
        matches!(self, Self::Comparator | Self::Normalizer | Self::SyntaxChecker)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Comparator => "comparator",
            Self::Normalizer => "normalizer",
            Self::SyntaxChecker => "syntaxChecker",
            Self::Syntax => "syntax",
            Self::MatchingRule => "matchingRule",
            Self::NameForm => "nameForm",
        }
    }
}

impl fmt::Display for SchemaObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed reference from one catalogued object to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaReference {
    pub kind: SchemaObjectType,
    pub oid: Oid,
}

impl SchemaReference {
    pub fn new(kind: SchemaObjectType, oid: Oid) -> Self {
        Self { kind, oid }
    }
}

/// A runtime schema object that can live in a catalog.
///
/// Implementations are immutable: a change to the underlying entry always
/// produces a fresh object through [`SchemaObject::build`].
pub trait SchemaObject: fmt::Debug + Send + Sync + Sized + 'static {
    /// The kind this type represents.
    const KIND: SchemaObjectType;

    /// Build the runtime object from its description.
    fn build(
        description: &SchemaObjectDescription,
        factory: &SchemaEntityFactory,
    ) -> SchemaResult<Self>;

    /// The objects of other kinds this one depends on.
    fn references(&self) -> Vec<SchemaReference> {
        Vec::new()
    }

    /// The catalog holding objects of this kind.
    fn catalog(registries: &Registries) -> &Arc<dyn ObjectCatalog<Self>>;
}
