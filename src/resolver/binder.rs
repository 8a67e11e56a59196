//! Binding request field names to registry paths

use crate::catalog::{Catalog, Product};
use crate::config::UnknownFieldPolicy;
use crate::request::{QueryError, QueryResult};

use super::path::FieldPath;
use super::value::FieldValue;

/// A request field name with its resolved path, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    name: String,
    path: Option<FieldPath>,
}

impl FieldRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<FieldPath> {
        self.path
    }

    pub fn is_known(&self) -> bool {
        self.path.is_some()
    }

    pub fn is_to_many(&self) -> bool {
        self.path.map(|p| p.is_to_many()).unwrap_or(false)
    }

    /// Unknown names tolerated under the ignore policy resolve to Absent
    pub fn resolve(&self, catalog: &Catalog, product: &Product) -> FieldValue {
        match self.path {
            Some(path) => path.resolve(catalog, product),
            None => FieldValue::Absent,
        }
    }
}

/// Applies the unknown-field policy while binding names
#[derive(Debug, Clone, Copy)]
pub struct FieldBinder {
    policy: UnknownFieldPolicy,
}

impl FieldBinder {
    pub fn new(policy: UnknownFieldPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> UnknownFieldPolicy {
        self.policy
    }

    pub fn bind(&self, name: &str) -> QueryResult<FieldRef> {
        let path = FieldPath::parse(name);
        if path.is_none() && self.policy == UnknownFieldPolicy::Reject {
            return Err(QueryError::unknown_field(name));
        }
        Ok(FieldRef {
            name: name.to_string(),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_policy() {
        let binder = FieldBinder::new(UnknownFieldPolicy::Reject);
        assert!(binder.bind("supplier.country").unwrap().is_known());
        let err = binder.bind("supplier.colour").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("supplier.colour"));
    }

    #[test]
    fn test_ignore_policy_resolves_absent() {
        let binder = FieldBinder::new(UnknownFieldPolicy::Ignore);
        let field = binder.bind("colour").unwrap();
        assert!(!field.is_known());

        let catalog = Catalog::builder().build().unwrap();
        let product = Product::new("Lamp", rust_decimal::Decimal::ONE, 1);
        assert!(field.resolve(&catalog, &product).is_absent());
    }
}
