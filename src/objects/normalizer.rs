//! Normalizers: canonical forms of assertion values.

use crate::error::SchemaResult;
use crate::naming::Oid;
use crate::objects::comparator::deep_trim;
use crate::objects::{SchemaEntityFactory, SchemaObject, SchemaObjectDescription, SchemaObjectType};
use crate::registry::{ObjectCatalog, Registries};
use std::fmt;
use std::sync::Arc;

/// Produces the canonical form of a value.
pub trait Normalize: Send + Sync + fmt::Debug {
    fn normalize(&self, value: &str) -> String;
}

/// A catalogued normalizer.
#[derive(Debug, Clone)]
pub struct Normalizer {
    oid: Oid,
    fqcn: String,
    implementation: Arc<dyn Normalize>,
}

impl Normalizer {
    pub fn new(oid: Oid, fqcn: impl Into<String>, implementation: Arc<dyn Normalize>) -> Self {
        Self {
            oid,
            fqcn: fqcn.into(),
            implementation,
        }
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn fqcn(&self) -> &str {
        &self.fqcn
    }

    pub fn normalize(&self, value: &str) -> String {
        self.implementation.normalize(value)
    }
}

impl SchemaObject for Normalizer {
    const KIND: SchemaObjectType = SchemaObjectType::Normalizer;

    fn build(
        description: &SchemaObjectDescription,
        factory: &SchemaEntityFactory,
    ) -> SchemaResult<Self> {
        factory.normalizer(description)
    }

    fn catalog(registries: &Registries) -> &Arc<dyn ObjectCatalog<Self>> {
        registries.normalizers()
    }
}

#[derive(Debug, Default)]
pub struct NoOpNormalizer;

impl Normalize for NoOpNormalizer {
    fn normalize(&self, value: &str) -> String {
        value.to_string()
    }
}

/// Collapses whitespace runs and trims both ends.
#[derive(Debug, Default)]
pub struct DeepTrimNormalizer;

impl Normalize for DeepTrimNormalizer {
    fn normalize(&self, value: &str) -> String {
        deep_trim(value)
    }
}

#[derive(Debug, Default)]
pub struct DeepTrimToLowerNormalizer;

impl Normalize for DeepTrimToLowerNormalizer {
    fn normalize(&self, value: &str) -> String {
        deep_trim(value).to_lowercase()
    }
}

#[derive(Debug, Default)]
pub struct ObjectIdentifierNormalizer;

impl Normalize for ObjectIdentifierNormalizer {
    fn normalize(&self, value: &str) -> String {
        value.trim().to_ascii_lowercase()
    }
}

/// Drops spaces and hyphens.
#[derive(Debug, Default)]
pub struct TelephoneNumberNormalizer;

impl Normalize for TelephoneNumberNormalizer {
    fn normalize(&self, value: &str) -> String {
        value.chars().filter(|c| *c != ' ' && *c != '-').collect()
    }
}

#[derive(Debug, Default)]
pub struct BooleanNormalizer;

impl Normalize for BooleanNormalizer {
    fn normalize(&self, value: &str) -> String {
        value.trim().to_ascii_uppercase()
    }
}

pub(crate) fn builtin_normalizers() -> Vec<(&'static str, Arc<dyn Normalize>)> {
    let table: [(&'static str, Arc<dyn Normalize>); 6] = [
        ("NoOpNormalizer", Arc::new(NoOpNormalizer)),
        ("DeepTrimNormalizer", Arc::new(DeepTrimNormalizer)),
        ("DeepTrimToLowerNormalizer", Arc::new(DeepTrimToLowerNormalizer)),
        ("ObjectIdentifierNormalizer", Arc::new(ObjectIdentifierNormalizer)),
        ("TelephoneNumberNormalizer", Arc::new(TelephoneNumberNormalizer)),
        ("BooleanNormalizer", Arc::new(BooleanNormalizer)),
    ];
    table.into()
}
