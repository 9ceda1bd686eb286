//! Meta-schema change handlers.
//!
//! A change handler keeps one catalog in step with the directory entries
//! describing its kind. The directory has already validated and applied the
//! entry operation when a handler runs; the handler's job is to accept or
//! refuse it on schema grounds and mirror it into the live registries.
//!
//! Every operation checks everything it needs first (location shape, OID
//! uniqueness, live dependents, owning schema, buildability) and only then
//! mutates, so an error always leaves the registries untouched.
//!
//! # Key Types
//!
//! - [`SchemaChangeHandler`] - the object-safe operation set dispatched to
//! - [`MetaHandler`] - the handler for any [`SchemaObject`](crate::objects::SchemaObject) kind
//! - [`ChangeOutcome`] - whether the live registries changed

pub mod meta;


pub use meta::MetaHandler;

use crate::entry::Entry;
use crate::error::SchemaResult;
use crate::naming::{Dn, Oid, Rdn};
use crate::objects::{SchemaObjectDescription, SchemaObjectType};
use serde::{Deserialize, Serialize};

/// Effect of a change on the live registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeOutcome {
    /// A catalog entry was added, removed or replaced.
    Modified,
    /// The change was accepted but left the registries as they were, for
    /// example because the owning schema is disabled.
    Unchanged,
}

impl ChangeOutcome {
    pub fn is_modified(self) -> bool {
        self == Self::Modified
    }
}

/// Operations applied to the catalog of one schema entity kind.
///
/// The `cascade` flags are accepted for interface compatibility and ignored:
/// a change that would leave dependents behind is refused instead.
pub trait SchemaChangeHandler: Send + Sync {
    fn kind(&self) -> SchemaObjectType;

    /// An entry was added at `dn`.
    fn add(&self, dn: &Dn, entry: &Entry) -> SchemaResult<ChangeOutcome>;

    /// Register a description that did not come from a directory entry.
    fn add_description(&self, description: SchemaObjectDescription) -> SchemaResult<ChangeOutcome>;

    /// The entry at `dn` was deleted.
    fn delete(&self, dn: &Dn, entry: &Entry, cascade: bool) -> SchemaResult<ChangeOutcome>;

    /// Remove the live object with `oid`, if any.
    fn delete_oid(&self, oid: &Oid, cascade: bool) -> SchemaResult<ChangeOutcome>;

    /// The entry at `dn` was modified from `entry` to `target`.
    fn modify(
        &self,
        dn: &Dn,
        entry: &Entry,
        target: &Entry,
        cascade: bool,
    ) -> SchemaResult<ChangeOutcome>;

    /// The entry at `dn` was given a new RDN in place.
    fn rename(&self, dn: &Dn, entry: &Entry, new_rdn: &Rdn, cascade: bool)
    -> SchemaResult<ChangeOutcome>;

    /// The entry at `original` was moved under `new_parent` and renamed.
    fn move_and_rename(
        &self,
        original: &Dn,
        new_parent: &Dn,
        new_rdn: &Rdn,
        delete_old_rdn: bool,
        entry: &Entry,
        cascade: bool,
    ) -> SchemaResult<ChangeOutcome>;

    /// The entry at `original` was moved under `new_parent`, keeping its RDN.
    fn replace(
        &self,
        original: &Dn,
        new_parent: &Dn,
        entry: &Entry,
        cascade: bool,
    ) -> SchemaResult<ChangeOutcome>;
}
