//! Fluent builders for meta-schema entries.

use meta_schema::entry::{AttributeValue, Entry};
use meta_schema::naming::Dn;
use meta_schema::objects::SchemaObjectType;

/// Container DN for `kind` entries of `schema`.
pub fn container_dn(kind: SchemaObjectType, schema: &str) -> Dn {
    format!("ou={},cn={},ou=schema", kind.container_label(), schema)
        .parse()
        .expect("valid container DN")
}

/// Builds the directory entry describing one schema entity.
#[derive(Debug, Clone)]
pub struct MetaEntryBuilder {
    kind: SchemaObjectType,
    schema: String,
    oid: String,
    attributes: Vec<(String, AttributeValue)>,
}

impl MetaEntryBuilder {
    pub fn new(kind: SchemaObjectType, schema: &str, oid: &str) -> Self {
        Self {
            kind,
            schema: schema.to_string(),
            oid: oid.to_string(),
            attributes: Vec::new(),
        }
    }

    pub fn comparator(schema: &str, oid: &str) -> Self {
        Self::new(SchemaObjectType::Comparator, schema, oid).with_fqcn("StringComparator")
    }

    pub fn normalizer(schema: &str, oid: &str) -> Self {
        Self::new(SchemaObjectType::Normalizer, schema, oid).with_fqcn("NoOpNormalizer")
    }

    pub fn syntax_checker(schema: &str, oid: &str) -> Self {
        Self::new(SchemaObjectType::SyntaxChecker, schema, oid)
            .with_fqcn("DirectoryStringSyntaxChecker")
    }

    pub fn syntax(schema: &str, oid: &str) -> Self {
        Self::new(SchemaObjectType::Syntax, schema, oid)
    }

    pub fn matching_rule(schema: &str, oid: &str) -> Self {
        Self::new(SchemaObjectType::MatchingRule, schema, oid)
    }

    pub fn name_form(schema: &str, oid: &str) -> Self {
        Self::new(SchemaObjectType::NameForm, schema, oid)
            .with_attribute("m-oc", "person")
            .with_attribute("m-must", "cn")
    }

    pub fn with_fqcn(self, fqcn: &str) -> Self {
        self.with_attribute("m-fqcn", fqcn)
    }

    pub fn with_name(self, name: &str) -> Self {
        self.with_attribute("m-name", name)
    }

    pub fn with_description(self, description: &str) -> Self {
        self.with_attribute("m-description", description)
    }

    pub fn with_syntax(self, oid: &str) -> Self {
        self.with_attribute("m-syntax", oid)
    }

    pub fn with_attribute(mut self, id: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.push((id.to_string(), value.into()));
        self
    }

    pub fn dn(&self) -> Dn {
        container_dn(self.kind, &self.schema)
            .child(meta_schema::naming::Rdn::new("m-oid", &self.oid).expect("valid RDN"))
    }

    pub fn build(self) -> Entry {
        let mut entry = Entry::new(self.dn()).with_attribute("m-oid", self.oid.as_str());
        for (id, value) in self.attributes {
            entry.add(&id, value);
        }
        entry
    }
}
