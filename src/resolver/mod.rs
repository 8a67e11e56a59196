//! Field path resolution
//!
//! Turns dotted paths such as `category.parent.name` or `tags.name` into
//! values for one product, traversing the catalog's relationships.

mod binder;
mod path;
mod value;

pub use binder::{FieldBinder, FieldRef};
pub use path::{CategoryField, FieldPath, ProductField, SupplierField, TagField};
pub use value::{decimal_from_json, decimal_to_json, FieldValue};
