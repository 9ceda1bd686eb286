//! Subentries and administrative roles.
//!
//! A subentry sits directly below an administrative point and selects a
//! region of the tree through its subtree specification. The administrative
//! roles it carries say which aspects (collective attributes, subschema,
//! access control, triggers) it administers for that region.
//!
//! # Key Types
//!
//! - [`AdministrativeRole`] - the four aspects a subentry can administer
//! - [`Subentry`] - a subtree specification plus a non-empty set of roles
//! - [`SubtreeSpecification`] - the selected region, relative to the admin point
//! - [`SubentryCache`] - live subentries keyed by DN
//!
//! # Examples
//!
//! ```rust
//! use meta_schema::subentry::{AdministrativeRole, Subentry, SubtreeSpecification};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let spec: SubtreeSpecification = r#"{ base "ou=people", maximum 1 }"#.parse()?;
//! let subentry = Subentry::new(spec, [AdministrativeRole::AccessControl])?;
//!
//! assert!(subentry.is_access_control_admin_role());
//! assert!(!subentry.is_collective_admin_role());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod subtree;

pub use cache::SubentryCache;
pub use subtree::SubtreeSpecification;

use crate::constants::{
    ACCESS_CONTROL_SUBENTRY_OC, COLLECTIVE_ATTRIBUTE_SUBENTRY_OC, OBJECT_CLASS, SUBSCHEMA_OC,
    SUBTREE_SPECIFICATION, TRIGGER_EXECUTION_SUBENTRY_OC,
};
use crate::entry::Entry;
use crate::error::{SchemaResult, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// An aspect of the directory a subentry administers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdministrativeRole {
    Collective,
    SubSchema,
    AccessControl,
    Triggers,
}

impl AdministrativeRole {
    pub const ALL: [AdministrativeRole; 4] = [
        Self::Collective,
        Self::SubSchema,
        Self::AccessControl,
        Self::Triggers,
    ];

    /// The role a subentry object class stands for.
    pub fn from_subentry_object_class(object_class: &str) -> Option<Self> {
        let object_class = object_class.trim();
        [
            (COLLECTIVE_ATTRIBUTE_SUBENTRY_OC, Self::Collective),
            (SUBSCHEMA_OC, Self::SubSchema),
            (ACCESS_CONTROL_SUBENTRY_OC, Self::AccessControl),
            (TRIGGER_EXECUTION_SUBENTRY_OC, Self::Triggers),
        ]
        .into_iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(object_class))
        .map(|(_, role)| role)
    }

    /// The role named by an `administrativeRole` value, specific or inner area.
    pub fn from_name(name: &str) -> ValidationResult<Self> {
        let role = match name.trim().to_ascii_lowercase().as_str() {
            "collectiveattributespecificarea" | "collectiveattributeinnerarea" | "2.5.23.5"
            | "2.5.23.6" => Self::Collective,
            "subschemaadminspecificarea" | "2.5.23.4" => Self::SubSchema,
            "accesscontrolspecificarea" | "accesscontrolinnerarea" | "2.5.23.2" | "2.5.23.3" => {
                Self::AccessControl
            }
            "triggerexecutionspecificarea" | "triggerexecutioninnerarea" => Self::Triggers,
            _ => {
                return Err(ValidationError::UnknownAdministrativeRole {
                    name: name.to_string(),
                });
            }
        };
        Ok(role)
    }

    /// Object class a subentry carries for this role.
    pub fn object_class(self) -> &'static str {
        match self {
            Self::Collective => COLLECTIVE_ATTRIBUTE_SUBENTRY_OC,
            Self::SubSchema => SUBSCHEMA_OC,
            Self::AccessControl => ACCESS_CONTROL_SUBENTRY_OC,
            Self::Triggers => TRIGGER_EXECUTION_SUBENTRY_OC,
        }
    }
}

impl fmt::Display for AdministrativeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Collective => "collective",
            Self::SubSchema => "subschema",
            Self::AccessControl => "accessControl",
            Self::Triggers => "triggers",
        };
        f.write_str(name)
    }
}

/// A subentry: the region it selects and the roles it plays there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subentry {
    subtree_specification: SubtreeSpecification,
    administrative_roles: HashSet<AdministrativeRole>,
}

impl Subentry {
    /// A subentry with at least one role.
    pub fn new(
        subtree_specification: SubtreeSpecification,
        roles: impl IntoIterator<Item = AdministrativeRole>,
    ) -> ValidationResult<Self> {
        let mut subentry = Self {
            subtree_specification,
            administrative_roles: HashSet::new(),
        };
        subentry.set_administrative_roles(roles.into_iter().collect())?;
        Ok(subentry)
    }

    /// Read roles from `objectClass` and the region from `subtreeSpecification`.
    pub fn from_entry(entry: &Entry) -> SchemaResult<Self> {
        let roles: HashSet<AdministrativeRole> = entry
            .strings(OBJECT_CLASS)
            .into_iter()
            .filter_map(AdministrativeRole::from_subentry_object_class)
            .collect();
        let spec: SubtreeSpecification = entry.required_string(SUBTREE_SPECIFICATION)?.parse()?;
        Ok(Self::new(spec, roles)?)
    }

    pub fn subtree_specification(&self) -> &SubtreeSpecification {
        &self.subtree_specification
    }

    pub fn set_subtree_specification(&mut self, subtree_specification: SubtreeSpecification) {
        self.subtree_specification = subtree_specification;
    }

    pub fn administrative_roles(&self) -> &HashSet<AdministrativeRole> {
        &self.administrative_roles
    }

    /// Replace the role set; an empty set is refused and leaves it as it was.
    pub fn set_administrative_roles(
        &mut self,
        roles: HashSet<AdministrativeRole>,
    ) -> ValidationResult<()> {
        if roles.is_empty() {
            return Err(ValidationError::EmptyAdministrativeRoles);
        }
        self.administrative_roles = roles;
        Ok(())
    }

    pub fn has_role(&self, role: AdministrativeRole) -> bool {
        self.administrative_roles.contains(&role)
    }

    pub fn is_collective_admin_role(&self) -> bool {
        self.has_role(AdministrativeRole::Collective)
    }

    pub fn is_schema_admin_role(&self) -> bool {
        self.has_role(AdministrativeRole::SubSchema)
    }

    pub fn is_access_control_admin_role(&self) -> bool {
        self.has_role(AdministrativeRole::AccessControl)
    }

    pub fn is_triggers_admin_role(&self) -> bool {
        self.has_role(AdministrativeRole::Triggers)
    }
}
