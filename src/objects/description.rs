//! Canonical descriptions of schema entities.
//!
//! A [`SchemaObjectDescription`] is the value-object form of one definition:
//! OID, aliases, free text, a kind-specific payload and an extension map that
//! carries the owning schema under [`X_SCHEMA`]. Descriptions are never
//! patched; every add, modify, rename or move builds a new one.

use crate::constants::X_SCHEMA;
use crate::error::{SchemaError, SchemaResult};
use crate::naming::Oid;
use crate::objects::SchemaObjectType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind-specific part of a description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ObjectPayload {
    /// Comparators, normalizers and syntax checkers: the implementation name
    /// plus an optional Base64 executable payload.
    #[serde(rename_all = "camelCase")]
    Implementation {
        fqcn: String,
        bytecode: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Syntax { human_readable: bool },
    #[serde(rename_all = "camelCase")]
    MatchingRule { syntax: Option<Oid> },
    #[serde(rename_all = "camelCase")]
    NameForm {
        structural_object_class: String,
        must: Vec<String>,
        may: Vec<String>,
    },
}

impl ObjectPayload {
    fn accepts(&self, kind: SchemaObjectType) -> bool {
        match self {
            Self::Implementation { .. } => kind.is_implementation(),
            Self::Syntax { .. } => kind == SchemaObjectType::Syntax,
            Self::MatchingRule { .. } => kind == SchemaObjectType::MatchingRule,
            Self::NameForm { .. } => kind == SchemaObjectType::NameForm,
        }
    }
}

/// Immutable description of one schema entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaObjectDescription {
    kind: SchemaObjectType,
    oid: Oid,
    names: Vec<String>,
    description: Option<String>,
    obsolete: bool,
    payload: ObjectPayload,
    extensions: BTreeMap<String, Vec<String>>,
}

impl SchemaObjectDescription {
    /// Start a description of `kind` identified by `oid`.
    pub fn builder(kind: SchemaObjectType, oid: Oid, payload: ObjectPayload) -> DescriptionBuilder {
        DescriptionBuilder {
            inner: Self {
                kind,
                oid,
                names: Vec::new(),
                description: None,
                obsolete: false,
                payload,
                extensions: BTreeMap::new(),
            },
        }
    }

    pub fn kind(&self) -> SchemaObjectType {
        self.kind
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// First alias, or the OID when the entity has no name.
    pub fn primary_name(&self) -> &str {
        self.names
            .first()
            .map(String::as_str)
            .unwrap_or(self.oid.as_str())
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_obsolete(&self) -> bool {
        self.obsolete
    }

    pub fn payload(&self) -> &ObjectPayload {
        &self.payload
    }

    pub fn extensions(&self) -> &BTreeMap<String, Vec<String>> {
        &self.extensions
    }

    pub fn extension(&self, key: &str) -> Option<&[String]> {
        self.extensions.get(key).map(Vec::as_slice)
    }

    /// The owning schema recorded under `X-SCHEMA`, if any.
    pub fn schema_name(&self) -> Option<&str> {
        self.extension(X_SCHEMA)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Implementation name, for comparators, normalizers and syntax checkers.
    pub fn fqcn(&self) -> Option<&str> {
        match &self.payload {
            ObjectPayload::Implementation { fqcn, .. } => Some(fqcn),
            _ => None,
        }
    }

    /// Base64 executable payload, if one was supplied.
    pub fn bytecode(&self) -> Option<&str> {
        match &self.payload {
            ObjectPayload::Implementation { bytecode, .. } => bytecode.as_deref(),
            _ => None,
        }
    }

    /// A copy identified by `oid`; everything else is unchanged.
    pub fn with_oid(&self, oid: Oid) -> Self {
        Self {
            oid,
            ..self.clone()
        }
    }

    /// A copy owned by `schema_name`.
    pub fn with_schema(&self, schema_name: &str) -> Self {
        let mut copy = self.clone();
        copy.extensions
            .insert(X_SCHEMA.to_string(), vec![schema_name.to_string()]);
        copy
    }

    /// Names to bind in the OID registry: the OID itself, then every alias.
    pub fn registered_names(&self) -> Vec<String> {
        std::iter::once(self.oid.to_string())
            .chain(self.names.iter().cloned())
            .collect()
    }
}

/// Builder for [`SchemaObjectDescription`].
#[derive(Debug, Clone)]
pub struct DescriptionBuilder {
    inner: SchemaObjectDescription,
}

impl DescriptionBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.names.push(name.into());
        self
    }

    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.inner.description = Some(description.into());
        self
    }

    pub fn obsolete(mut self, obsolete: bool) -> Self {
        self.inner.obsolete = obsolete;
        self
    }

    pub fn extension(mut self, key: impl Into<String>, values: Vec<String>) -> Self {
        self.inner.extensions.insert(key.into(), values);
        self
    }

    /// Record the owning schema under `X-SCHEMA`.
    pub fn schema(self, schema_name: impl Into<String>) -> Self {
        self.extension(X_SCHEMA, vec![schema_name.into()])
    }

    /// Finish, checking that the payload fits the kind.
    pub fn build(self) -> SchemaResult<SchemaObjectDescription> {
        if !self.inner.payload.accepts(self.inner.kind) {
            return Err(SchemaError::unsupported(format!(
                "a {} cannot carry a {:?} payload",
                self.inner.kind, self.inner.payload
            )));
        }
        Ok(self.inner)
    }
}
