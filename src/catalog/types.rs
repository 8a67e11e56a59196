//! Catalog entity records
//!
//! Relationship ends are stored as identifiers, never as embedded records.
//! The [`Catalog`](super::Catalog) arena resolves them.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// A product supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub country: String,
    /// Bounded 1.0 - 10.0
    pub reliability_score: Decimal,
}

impl Supplier {
    pub fn new(name: impl Into<String>, country: impl Into<String>, reliability_score: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            country: country.into(),
            reliability_score,
        }
    }
}

/// A node of the category tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub tax_rate: Option<Decimal>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

impl Category {
    /// Creates a root category
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            tax_rate: None,
            parent_id: None,
        }
    }

    /// Creates a category below `parent`
    pub fn child_of(name: impl Into<String>, parent: &Category) -> Self {
        Self {
            parent_id: Some(parent.id),
            ..Self::root(name)
        }
    }

    pub fn with_tax_rate(mut self, tax_rate: Decimal) -> Self {
        self.tax_rate = Some(tax_rate);
        self
    }
}

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub quantity: i64,
    pub launch_date: NaiveDate,
    /// Free-form in source data ("Active", "Discontinued", ...)
    pub status: String,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub supplier_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_is_active() -> bool {
    true
}

impl Product {
    /// Creates an active product launched and stamped at the Unix epoch
    pub fn new(name: impl Into<String>, price: Decimal, quantity: i64) -> Self {
        let epoch = DateTime::<Utc>::default();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            price,
            quantity,
            launch_date: epoch.date_naive(),
            status: "Active".to_string(),
            is_active: true,
            category_id: None,
            supplier_id: None,
            created_at: epoch,
            updated_at: epoch,
        }
    }

    pub fn with_launch_date(mut self, date: NaiveDate) -> Self {
        self.launch_date = date;
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_category(mut self, category: &Category) -> Self {
        self.category_id = Some(category.id);
        self
    }

    pub fn with_supplier(mut self, supplier: &Supplier) -> Self {
        self.supplier_id = Some(supplier.id);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// `price * quantity`, in decimal; None when the product overflows
    pub fn total_value(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// One Product <-> Tag association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTag {
    pub product_id: Uuid,
    pub tag_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_total_value_is_decimal() {
        let product = Product::new("Widget", dec("19.99"), 3);
        assert_eq!(product.total_value(), Some(dec("59.97")));
    }

    #[test]
    fn test_total_value_overflow_is_none() {
        let product = Product::new("Bulk", dec("100000000000"), 9_000_000_000_000_000_000);
        assert_eq!(product.total_value(), None);
    }

    #[test]
    fn test_product_deserializes_camel_case() {
        let json = serde_json::json!({
            "id": "7f0c4f0e-3f73-4c58-9a55-0d2c1a6f6a01",
            "name": "Desk Lamp",
            "price": 24.5,
            "quantity": 10,
            "launchDate": "2023-04-01",
            "status": "Pending",
            "createdAt": "2023-04-01T10:00:00Z",
            "updatedAt": "2023-04-02T10:00:00Z"
        });

        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.name, "Desk Lamp");
        assert!(product.is_active);
        assert_eq!(product.category_id, None);
        assert_eq!(product.total_value(), Some(dec("245")));
    }

    #[test]
    fn test_category_child_links_parent() {
        let root = Category::root("Electronics");
        let child = Category::child_of("Laptops", &root);
        assert_eq!(child.parent_id, Some(root.id));
    }
}
