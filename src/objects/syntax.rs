//! LDAP syntaxes.
//!
//! A syntax is checked by the syntax checker registered under the same OID,
//! so every live syntax holds a reference to that checker.

use crate::error::{SchemaError, SchemaResult};
use crate::naming::Oid;
use crate::objects::{
    ObjectPayload, SchemaEntityFactory, SchemaObject, SchemaObjectDescription, SchemaObjectType,
    SchemaReference,
};
use crate::registry::{ObjectCatalog, Registries};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax {
    oid: Oid,
    names: Vec<String>,
    description: Option<String>,
    human_readable: bool,
}

impl Syntax {
    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_human_readable(&self) -> bool {
        self.human_readable
    }
}

impl SchemaObject for Syntax {
    const KIND: SchemaObjectType = SchemaObjectType::Syntax;

    fn build(
        description: &SchemaObjectDescription,
        _factory: &SchemaEntityFactory,
    ) -> SchemaResult<Self> {
        let ObjectPayload::Syntax { human_readable } = description.payload() else {
            return Err(SchemaError::unsupported(format!(
                "description {} is not a syntax",
                description.oid()
            )));
        };
        Ok(Self {
            oid: description.oid().clone(),
            names: description.names().to_vec(),
            description: description.description().map(str::to_string),
            human_readable: *human_readable,
        })
    }

    fn references(&self) -> Vec<SchemaReference> {
        vec![SchemaReference::new(
            SchemaObjectType::SyntaxChecker,
            self.oid.clone(),
        )]
    }

    fn catalog(registries: &Registries) -> &Arc<dyn ObjectCatalog<Self>> {
        registries.syntaxes()
    }
}
