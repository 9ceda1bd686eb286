//! Comparators: orderings over assertion values.
//!
//! Implementations are compiled in and selected by name through the
//! [`SchemaEntityFactory`](crate::objects::SchemaEntityFactory); the directory
//! entry only records which one to use.

use crate::error::SchemaResult;
use crate::naming::Oid;
use crate::objects::{SchemaEntityFactory, SchemaObject, SchemaObjectDescription, SchemaObjectType};
use crate::registry::{ObjectCatalog, Registries};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A total ordering over attribute values.
pub trait Compare: Send + Sync + fmt::Debug {
    fn compare(&self, left: &str, right: &str) -> Ordering;
}

/// A catalogued comparator.
#[derive(Debug, Clone)]
pub struct Comparator {
    oid: Oid,
    fqcn: String,
    implementation: Arc<dyn Compare>,
}

impl Comparator {
    pub fn new(oid: Oid, fqcn: impl Into<String>, implementation: Arc<dyn Compare>) -> Self {
        Self {
            oid,
            fqcn: fqcn.into(),
            implementation,
        }
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    /// The implementation name the comparator was built from.
    pub fn fqcn(&self) -> &str {
        &self.fqcn
    }

    pub fn compare(&self, left: &str, right: &str) -> Ordering {
        self.implementation.compare(left, right)
    }
}

impl SchemaObject for Comparator {
    const KIND: SchemaObjectType = SchemaObjectType::Comparator;

    fn build(
        description: &SchemaObjectDescription,
        factory: &SchemaEntityFactory,
    ) -> SchemaResult<Self> {
        factory.comparator(description)
    }

    fn catalog(registries: &Registries) -> &Arc<dyn ObjectCatalog<Self>> {
        registries.comparators()
    }
}

/// Byte-wise ordering of the raw values.
#[derive(Debug, Default)]
pub struct StringComparator;

impl Compare for StringComparator {
    fn compare(&self, left: &str, right: &str) -> Ordering {
        left.cmp(right)
    }
}

/// Ordering after collapsing whitespace runs and folding case.
#[derive(Debug, Default)]
pub struct DeepTrimToLowerComparator;

impl Compare for DeepTrimToLowerComparator {
    fn compare(&self, left: &str, right: &str) -> Ordering {
        deep_trim(left)
            .to_lowercase()
            .cmp(&deep_trim(right).to_lowercase())
    }
}

/// `FALSE` sorts before `TRUE`; anything else sorts after both.
#[derive(Debug, Default)]
pub struct BooleanComparator;

impl Compare for BooleanComparator {
    fn compare(&self, left: &str, right: &str) -> Ordering {
        fn rank(value: &str) -> u8 {
            match value.trim().to_ascii_uppercase().as_str() {
                "FALSE" => 0,
                "TRUE" => 1,
                _ => 2,
            }
        }
        rank(left).cmp(&rank(right))
    }
}

/// Numeric ordering; values that do not parse fall back to string order.
#[derive(Debug, Default)]
pub struct IntegerComparator;

impl Compare for IntegerComparator {
    fn compare(&self, left: &str, right: &str) -> Ordering {
        match (left.trim().parse::<i128>(), right.trim().parse::<i128>()) {
            (Ok(l), Ok(r)) => l.cmp(&r),
            _ => left.cmp(right),
        }
    }
}

/// Arc-by-arc numeric ordering of dotted OIDs, case-folded names otherwise.
#[derive(Debug, Default)]
pub struct ObjectIdentifierComparator;

impl Compare for ObjectIdentifierComparator {
    fn compare(&self, left: &str, right: &str) -> Ordering {
        let (left, right) = (left.trim(), right.trim());
        if Oid::is_valid(left) && Oid::is_valid(right) {
            let arcs = |s: &str| -> Vec<u128> { s.split('.').filter_map(|a| a.parse().ok()).collect() };
            arcs(left).cmp(&arcs(right))
        } else {
            left.to_lowercase().cmp(&right.to_lowercase())
        }
    }
}

/// Ordering that ignores spaces and hyphens.
#[derive(Debug, Default)]
pub struct TelephoneNumberComparator;

impl Compare for TelephoneNumberComparator {
    fn compare(&self, left: &str, right: &str) -> Ordering {
        let strip = |s: &str| -> String { s.chars().filter(|c| *c != ' ' && *c != '-').collect() };
        strip(left).cmp(&strip(right))
    }
}

pub(crate) fn deep_trim(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn builtin_comparators() -> Vec<(&'static str, Arc<dyn Compare>)> {
    let table: [(&'static str, Arc<dyn Compare>); 7] = [
        ("StringComparator", Arc::new(StringComparator)),
        ("ComparableComparator", Arc::new(StringComparator)),
        ("DeepTrimToLowerComparator", Arc::new(DeepTrimToLowerComparator)),
        ("BooleanComparator", Arc::new(BooleanComparator)),
        ("IntegerComparator", Arc::new(IntegerComparator)),
        ("ObjectIdentifierComparator", Arc::new(ObjectIdentifierComparator)),
        ("TelephoneNumberComparator", Arc::new(TelephoneNumberComparator)),
    ];
    table.into()
}
