//! Error types for schema registry operations.
//!
//! This module provides the error taxonomy shared by the OID registry, the
//! schema catalogs, the meta-entity change handlers and the subentry model.
//! Every handler performs its checks before mutating anything, so an error
//! returned from this crate always means "nothing changed".

use crate::objects::SchemaObjectType;

/// Main error type for schema registry operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The target location has the wrong shape (DN depth, container type or label)
    #[error("Naming violation: {message}")]
    NamingViolation { message: String },

    /// Another catalog still holds a live reference to the OID
    #[error(
        "The {kind} with OID {oid} is still referenced by {dependents:?} and cannot be {action}"
    )]
    PrecludedByDependents {
        kind: SchemaObjectType,
        oid: String,
        action: &'static str,
        dependents: Vec<String>,
    },

    /// OID collision on add, rename or move
    #[error("A {kind} with OID {oid} is already registered")]
    AlreadyExists { kind: SchemaObjectType, oid: String },

    /// Lookup against an identifier that must exist
    #[error("No {kind} registered for '{id}'")]
    NotFound { kind: String, id: String },

    /// Alias already bound to a different OID
    #[error("Name '{name}' is already bound to OID {bound}, cannot bind it to {requested}")]
    NameConflict {
        name: String,
        bound: String,
        requested: String,
    },

    /// Owning schema is unknown to the schema loader
    #[error("Schema not found: {schema}")]
    SchemaNotFound { schema: String },

    /// Enabling or disabling a schema would leave an enabled schema
    /// depending on a disabled one
    #[error("Schema '{schema}' cannot be {action}: {reason}")]
    SchemaDependency {
        schema: String,
        action: &'static str,
        reason: String,
    },

    /// Entry lacks an attribute the factory needs
    #[error("Entry {dn} is missing required attribute '{attribute}'")]
    MissingAttribute { dn: String, attribute: String },

    /// No compiled-in implementation matches the stored name
    #[error("No built-in {kind} implementation named '{fqcn}'")]
    UnknownImplementation { kind: SchemaObjectType, fqcn: String },

    /// Executable payloads are refused by configuration
    #[error("The {kind} {oid} carries an executable payload, which is not accepted")]
    BytecodeRejected { kind: SchemaObjectType, oid: String },

    /// The request cannot be routed to any handler
    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    /// Value object validation failure
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation errors raised while constructing value objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Not a dotted-numeric object identifier
    #[error("Invalid OID: '{value}'")]
    InvalidOid { value: String },

    /// Malformed distinguished name
    #[error("Invalid DN '{dn}': {reason}")]
    InvalidDn { dn: String, reason: String },

    /// Malformed relative distinguished name
    #[error("Invalid RDN '{rdn}'")]
    InvalidRdn { rdn: String },

    /// Malformed subtree specification
    #[error("Invalid subtree specification: {details}")]
    InvalidSubtreeSpecification { details: String },

    /// Subentry without any administrative role
    #[error("A subentry must carry at least one administrative role")]
    EmptyAdministrativeRoles,

    /// Unrecognized administrative role name
    #[error("Unknown administrative role '{name}'")]
    UnknownAdministrativeRole { name: String },

    /// Invalid Base64 payload
    #[error("Attribute '{attribute}' has invalid binary data: {details}")]
    InvalidBinaryData { attribute: String, details: String },
}

/// Errors that can occur while assembling a schema service.
///
/// These errors are typically programming errors and should be caught
/// during development rather than runtime.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Invalid configuration provided
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// A bootstrap schema could not be registered
    #[error("Failed to load schema: {schema}")]
    SchemaLoadError { schema: String },
}

// Convenience methods for creating common errors
impl SchemaError {
    /// Create a naming violation error
    pub fn naming_violation(message: impl Into<String>) -> Self {
        Self::NamingViolation {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Create an already exists error
    pub fn already_exists(kind: SchemaObjectType, oid: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            oid: oid.into(),
        }
    }

    /// Create a schema not found error
    pub fn schema_not_found(schema: impl Into<String>) -> Self {
        Self::SchemaNotFound {
            schema: schema.into(),
        }
    }

    /// Create a schema dependency error
    pub fn schema_dependency(
        schema: impl Into<String>,
        action: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::SchemaDependency {
            schema: schema.into(),
            action,
            reason: reason.into(),
        }
    }

    /// Create a missing attribute error
    pub fn missing_attribute(dn: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            dn: dn.into(),
            attribute: attribute.into(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Whether this error reports an OID collision.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Whether this error reports a referential-integrity rejection.
    pub fn is_precluded_by_dependents(&self) -> bool {
        matches!(self, Self::PrecludedByDependents { .. })
    }

    /// Whether this error reports a malformed location.
    pub fn is_naming_violation(&self) -> bool {
        matches!(self, Self::NamingViolation { .. })
    }

    /// Whether this error reports a missing catalog entry.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl ValidationError {
    /// Create an invalid DN error
    pub fn invalid_dn(dn: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDn {
            dn: dn.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid subtree specification error
    pub fn invalid_subtree(details: impl Into<String>) -> Self {
        Self::InvalidSubtreeSpecification {
            details: details.into(),
        }
    }
}

// Result type aliases for convenience
pub type SchemaResult<T> = Result<T, SchemaError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
pub type BuildResult<T> = Result<T, BuildError>;
