//! Naming value objects: object identifiers and distinguished names.
//!
//! # Key Types
//!
//! - [`Oid`] - validated dotted-numeric identifier, the key of every catalog
//! - [`Dn`] / [`Rdn`] - normalized distinguished names, leaf first

pub mod dn;
pub mod oid;

pub use dn::{Dn, Rdn};
pub use oid::Oid;
