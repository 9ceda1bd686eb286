//! Syntax checkers: value validators bound to a syntax OID.

use crate::error::SchemaResult;
use crate::naming::Oid;
use crate::objects::{SchemaEntityFactory, SchemaObject, SchemaObjectDescription, SchemaObjectType};
use crate::registry::{ObjectCatalog, Registries};
use std::fmt;
use std::sync::Arc;

/// Decides whether a value conforms to a syntax.
pub trait CheckSyntax: Send + Sync + fmt::Debug {
    fn is_valid_syntax(&self, value: &str) -> bool;
}

/// A catalogued syntax checker. It shares its OID with the syntax it checks.
#[derive(Debug, Clone)]
pub struct SyntaxChecker {
    oid: Oid,
    fqcn: String,
    implementation: Arc<dyn CheckSyntax>,
}

impl SyntaxChecker {
    pub fn new(oid: Oid, fqcn: impl Into<String>, implementation: Arc<dyn CheckSyntax>) -> Self {
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

    pub fn is_valid_syntax(&self, value: &str) -> bool {
        self.implementation.is_valid_syntax(value)
    }
}

impl SchemaObject for SyntaxChecker {
    const KIND: SchemaObjectType = SchemaObjectType::SyntaxChecker;

    fn build(
        description: &SchemaObjectDescription,
        factory: &SchemaEntityFactory,
    ) -> SchemaResult<Self> {
        factory.syntax_checker(description)
    }

    fn catalog(registries: &Registries) -> &Arc<dyn ObjectCatalog<Self>> {
        registries.syntax_checkers()
    }
}

#[derive(Debug, Default)]
pub struct AcceptAllSyntaxChecker;

impl CheckSyntax for AcceptAllSyntaxChecker {
    fn is_valid_syntax(&self, _value: &str) -> bool {
        true
    }
}

#[derive(Debug, Default)]
pub struct BooleanSyntaxChecker;

impl CheckSyntax for BooleanSyntaxChecker {
    fn is_valid_syntax(&self, value: &str) -> bool {
        value == "TRUE" || value == "FALSE"
    }
}

/// Optional minus sign, then digits without a leading zero.
#[derive(Debug, Default)]
pub struct IntegerSyntaxChecker;

impl CheckSyntax for IntegerSyntaxChecker {
    fn is_valid_syntax(&self, value: &str) -> bool {
        let digits = value.strip_prefix('-').unwrap_or(value);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return false;
        }
        !(value.starts_with('-') && digits == "0")
    }
}

/// A numeric OID or a descriptor (`keystring`).
#[derive(Debug, Default)]
pub struct OidSyntaxChecker;

impl CheckSyntax for OidSyntaxChecker {
    fn is_valid_syntax(&self, value: &str) -> bool {
        if Oid::is_valid(value) {
            return true;
        }
        let mut chars = value.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
    }
}

#[derive(Debug, Default)]
pub struct DirectoryStringSyntaxChecker;

impl CheckSyntax for DirectoryStringSyntaxChecker {
    fn is_valid_syntax(&self, value: &str) -> bool {
        !value.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct Ia5StringSyntaxChecker;

impl CheckSyntax for Ia5StringSyntaxChecker {
    fn is_valid_syntax(&self, value: &str) -> bool {
        value.is_ascii()
    }
}

/// Printable telephone characters, at least one of them.
#[derive(Debug, Default)]
pub struct TelephoneNumberSyntaxChecker;

impl CheckSyntax for TelephoneNumberSyntaxChecker {
    fn is_valid_syntax(&self, value: &str) -> bool {
        !value.trim().is_empty()
            && value
                .chars()
                .all(|c| c.is_ascii_digit() || " +-().".contains(c))
    }
}

pub(crate) fn builtin_syntax_checkers() -> Vec<(&'static str, Arc<dyn CheckSyntax>)> {
    let table: [(&'static str, Arc<dyn CheckSyntax>); 7] = [
        ("AcceptAllSyntaxChecker", Arc::new(AcceptAllSyntaxChecker)),
        ("BooleanSyntaxChecker", Arc::new(BooleanSyntaxChecker)),
        ("IntegerSyntaxChecker", Arc::new(IntegerSyntaxChecker)),
        ("OidSyntaxChecker", Arc::new(OidSyntaxChecker)),
        ("DirectoryStringSyntaxChecker", Arc::new(DirectoryStringSyntaxChecker)),
        ("Ia5StringSyntaxChecker", Arc::new(Ia5StringSyntaxChecker)),
        ("TelephoneNumberSyntaxChecker", Arc::new(TelephoneNumberSyntaxChecker)),
    ];
    table.into()
}
