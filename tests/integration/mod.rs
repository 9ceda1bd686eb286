//! End-to-end scenarios driven through the schema service.

pub mod comparator_lifecycle;
pub mod concurrency;
pub mod cross_schema;
pub mod custom_catalogs;
pub mod referential_integrity;
pub mod subentries;
