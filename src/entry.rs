//! Decoded directory entries as handed over by the operation dispatcher.
//!
//! An [`Entry`] is a DN plus a map of attribute ids to values. Attribute ids
//! are matched case-insensitively (they are stored lower-cased); values are
//! either text or raw bytes, mirroring what a decoded LDAP entry carries.

use crate::error::{SchemaError, SchemaResult};
use crate::naming::Dn;
use std::collections::BTreeMap;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Text(String),
    Binary(Vec<u8>),
}

impl AttributeValue {
    /// The text form, `None` for binary values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Binary(_) => None,
        }
    }

    /// The raw bytes (UTF-8 bytes for text values).
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::Binary(b) => b,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for AttributeValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

/// A directory entry: its name and attributes.
///
/// ```rust
/// use meta_schema::entry::Entry;
///
/// let dn = "m-oid=1.1.1,ou=comparators,cn=example,ou=schema".parse().unwrap();
/// let entry = Entry::new(dn)
///     .with_attribute("m-oid", "1.1.1")
///     .with_attribute("m-fqcn", "StringComparator");
///
/// assert_eq!(entry.first_string("M-OID"), Some("1.1.1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    dn: Dn,
    attributes: BTreeMap<String, Vec<AttributeValue>>,
}

impl Entry {
    /// Create an entry without attributes.
    pub fn new(dn: Dn) -> Self {
        Self {
            dn,
            attributes: BTreeMap::new(),
        }
    }

    pub fn dn(&self) -> &Dn {
        &self.dn
    }

    pub fn set_dn(&mut self, dn: Dn) {
        self.dn = dn;
    }

    /// Append a value, builder style.
    pub fn with_attribute(mut self, id: &str, value: impl Into<AttributeValue>) -> Self {
        self.add(id, value);
        self
    }

    /// Append several text values, builder style.
    pub fn with_values<I, S>(mut self, id: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.add(id, AttributeValue::Text(value.into()));
        }
        self
    }

    /// Append a value.
    pub fn add(&mut self, id: &str, value: impl Into<AttributeValue>) {
        self.attributes
            .entry(id.to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    /// Replace all values of an attribute.
    pub fn put(&mut self, id: &str, values: Vec<AttributeValue>) {
        self.attributes.insert(id.to_ascii_lowercase(), values);
    }

    /// Remove an attribute, returning its values.
    pub fn remove(&mut self, id: &str) -> Option<Vec<AttributeValue>> {
        self.attributes.remove(&id.to_ascii_lowercase())
    }

    /// All values of an attribute.
    pub fn get(&self, id: &str) -> Option<&[AttributeValue]> {
        self.attributes
            .get(&id.to_ascii_lowercase())
            .map(Vec::as_slice)
            .filter(|values| !values.is_empty())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// First text value of an attribute.
    pub fn first_string(&self, id: &str) -> Option<&str> {
        self.get(id)?.iter().find_map(AttributeValue::as_str)
    }

    /// All text values of an attribute, in insertion order.
    pub fn strings(&self, id: &str) -> Vec<&str> {
        self.get(id)
            .map(|values| values.iter().filter_map(AttributeValue::as_str).collect())
            .unwrap_or_default()
    }

    /// First value of an attribute as bytes.
    pub fn first_bytes(&self, id: &str) -> Option<&[u8]> {
        self.get(id)?.first().map(AttributeValue::as_bytes)
    }

    /// First text value, or [`SchemaError::MissingAttribute`].
    pub fn required_string(&self, id: &str) -> SchemaResult<&str> {
        self.first_string(id)
            .ok_or_else(|| SchemaError::missing_attribute(self.dn.to_string(), id))
    }

    /// Whether a text value is present, compared case-insensitively.
    pub fn has_value(&self, id: &str, value: &str) -> bool {
        self.strings(id)
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(value))
    }

    /// Attribute ids present on the entry (lower-cased).
    pub fn attribute_ids(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }
}
