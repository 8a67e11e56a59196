//! Record model for the product catalog
//!
//! # Entities
//!
//! - Product: owns tags through the ProductTag join, optionally references
//!   one Category and one Supplier
//! - Category: self-referential tree, parent stored as an optional id
//! - Supplier, Tag: leaf records
//!
//! # Invariants
//!
//! - A (productId, tagId) pair exists at most once
//! - Category parents never form a cycle; enforced when the snapshot is
//!   built and on every reparent
//! - Every non-null reference points at a record in the same snapshot

mod errors;
mod snapshot;
mod source;
mod types;

pub use errors::{CatalogError, CatalogResult};
pub use snapshot::{Catalog, CatalogBuilder};
pub use source::{CatalogDocument, JsonFileSource, MemorySource, SnapshotSource, SourceError};
pub use types::{Category, Product, ProductTag, Supplier, Tag};
