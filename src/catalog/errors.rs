//! Catalog errors
//!
//! Raised when a snapshot is assembled or mutated in a way that would break
//! a relationship invariant.

use thiserror::Error;
use uuid::Uuid;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog invariant violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Two records of the same kind share an id
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: Uuid },

    /// The same tag attached twice to one product
    #[error("Tag {tag_id} already attached to product {product_id}")]
    DuplicateProductTag { product_id: Uuid, tag_id: Uuid },

    /// A reference to a record that is not in the snapshot
    #[error("{kind} {id} referenced by {referrer} does not exist")]
    DanglingReference {
        kind: &'static str,
        id: Uuid,
        referrer: Uuid,
    },

    /// A parent assignment that would close a loop in the category tree
    #[error("Category {id} cannot take parent {parent}: cycle")]
    CategoryCycle { id: Uuid, parent: Uuid },

    /// A field value outside its allowed domain
    #[error("Invalid {field} on {id}: {reason}")]
    InvalidField {
        field: &'static str,
        id: Uuid,
        reason: String,
    },
}
