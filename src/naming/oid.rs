//! Oid value object for schema entity identifiers.
//!
//! Object identifiers are the canonical keys of every schema catalog. This
//! module provides a type-safe wrapper that only admits the dotted-numeric
//! form, so that a human-readable alias can never be mistaken for an OID once
//! it has been resolved.

use crate::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A validated dotted-numeric object identifier.
///
/// ## Validation Rules
///
/// - At least two arcs separated by `.`
/// - Every arc is a non-empty decimal number
/// - No leading zeros, except for the arc `0` itself
///
/// ## Examples
///
/// ```rust
/// use meta_schema::naming::Oid;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let oid = Oid::new("2.5.13.2")?;
///     assert_eq!(oid.arcs().count(), 4);
///
///     assert!(Oid::new("caseIgnoreMatch").is_err());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid(String);

impl Oid {
    /// Create a new Oid with validation.
    pub fn new(value: impl Into<String>) -> ValidationResult<Self> {
        let value = value.into();
        if Self::is_valid(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidOid { value })
        }
    }

    /// Create an Oid without validation, for compiled-in constants.
    pub(crate) fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Check whether a string is a dotted-numeric OID.
    pub fn is_valid(value: &str) -> bool {
        let mut arcs = 0;

        for arc in value.split('.') {
            if arc.is_empty() || !arc.bytes().all(|b| b.is_ascii_digit()) {
                return false;
            }
            if arc.len() > 1 && arc.starts_with('0') {
                return false;
            }
            arcs += 1;
        }

        arcs >= 2
    }

    /// Get the string representation of the Oid.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the owned string value of the Oid.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Iterate over the numeric arcs.
    pub fn arcs(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Oid {
    type Err = ValidationError;

    fn from_str(value: &str) -> ValidationResult<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for Oid {
    type Error = ValidationError;

    fn try_from(value: String) -> ValidationResult<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Oid {
    type Error = ValidationError;

    fn try_from(value: &str) -> ValidationResult<Self> {
        Self::new(value)
    }
}

impl Serialize for Oid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Oid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}
