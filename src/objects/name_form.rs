//! Name forms: which attributes may name entries of a structural class.

use crate::error::{SchemaError, SchemaResult};
use crate::naming::Oid;
use crate::objects::{
    ObjectPayload, SchemaEntityFactory, SchemaObject, SchemaObjectDescription, SchemaObjectType,
};
use crate::registry::{ObjectCatalog, Registries};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameForm {
    oid: Oid,
    names: Vec<String>,
    description: Option<String>,
    structural_object_class: String,
    must: Vec<String>,
    may: Vec<String>,
}

impl NameForm {
    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn structural_object_class(&self) -> &str {
        &self.structural_object_class
    }

    /// Attribute types that must appear in the RDN.
    pub fn must(&self) -> &[String] {
        &self.must
    }

    /// Attribute types that may appear in the RDN.
    pub fn may(&self) -> &[String] {
        &self.may
    }

    /// Whether an RDN built from `attribute_types` satisfies this form.
    pub fn permits(&self, attribute_types: &[&str]) -> bool {
        let allowed = |candidate: &str| {
            self.must
                .iter()
                .chain(self.may.iter())
                .any(|a| a.eq_ignore_ascii_case(candidate))
        };
        self.must
            .iter()
            .all(|m| attribute_types.iter().any(|a| a.eq_ignore_ascii_case(m)))
            && attribute_types.iter().all(|a| allowed(a))
    }
}

impl SchemaObject for NameForm {
    const KIND: SchemaObjectType = SchemaObjectType::NameForm;

    fn build(
        description: &SchemaObjectDescription,
        _factory: &SchemaEntityFactory,
    ) -> SchemaResult<Self> {
        let ObjectPayload::NameForm {
            structural_object_class,
            must,
            may,
        } = description.payload()
        else {
            return Err(SchemaError::unsupported(format!(
                "description {} is not a name form",
                description.oid()
            )));
        };
        Ok(Self {
            oid: description.oid().clone(),
            names: description.names().to_vec(),
            description: description.description().map(str::to_string),
            structural_object_class: structural_object_class.clone(),
            must: must.clone(),
            may: may.clone(),
        })
    }

    fn catalog(registries: &Registries) -> &Arc<dyn ObjectCatalog<Self>> {
        registries.name_forms()
    }
}
