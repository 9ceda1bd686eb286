//! Fixed names of the meta-schema.
//!
//! The attribute and object class names below are defined by the directory's
//! own meta-schema and are consumed, never produced, by this crate. Attribute
//! ids are kept lower-cased because [`crate::entry::Entry`] stores them that way.

/// OID of the `organizationalUnitName` attribute type, the only type allowed
/// to name a schema entity container.
pub const OU_AT_OID: &str = "2.5.4.11";
/// OID of the `commonName` attribute type.
pub const CN_AT_OID: &str = "2.5.4.3";
/// OID of the `m-oid` meta attribute type.
pub const M_OID_AT_OID: &str = "1.3.6.1.4.1.18060.0.4.0.2.1";

/// Reserved extension key carrying the owning schema's name.
pub const X_SCHEMA: &str = "X-SCHEMA";

/// Schema assumed when a description names none.
pub const SCHEMA_OTHER: &str = "other";

pub const M_OID: &str = "m-oid";
pub const M_NAME: &str = "m-name";
pub const M_DESCRIPTION: &str = "m-description";
pub const M_OBSOLETE: &str = "m-obsolete";
pub const M_FQCN: &str = "m-fqcn";
pub const M_BYTECODE: &str = "m-bytecode";
pub const M_SYNTAX: &str = "m-syntax";
pub const M_HUMAN_READABLE: &str = "m-humanreadable";
pub const M_OC: &str = "m-oc";
pub const M_MUST: &str = "m-must";
pub const M_MAY: &str = "m-may";

pub const OBJECT_CLASS: &str = "objectclass";
pub const SUBTREE_SPECIFICATION: &str = "subtreespecification";

/// Object classes marking a subentry's administrative roles.
pub const COLLECTIVE_ATTRIBUTE_SUBENTRY_OC: &str = "collectiveAttributeSubentry";
pub const SUBSCHEMA_OC: &str = "subschema";
pub const ACCESS_CONTROL_SUBENTRY_OC: &str = "accessControlSubentry";
pub const TRIGGER_EXECUTION_SUBENTRY_OC: &str = "triggerExecutionSubentry";
