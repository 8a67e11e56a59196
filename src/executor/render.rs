//! Product row rendering
//!
//! Only rows inside the returned window are rendered. Derived fields are
//! computed here from the current price, quantity and tag set.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::catalog::{Catalog, Category, Product};
use crate::resolver::decimal_to_json;

/// Renders product rows as response JSON
pub struct RowRenderer;

impl RowRenderer {
    pub fn render(catalog: &Catalog, product: &Product) -> Value {
        let tags: Vec<Value> = catalog
            .tags_of(product.id)
            .into_iter()
            .map(|tag| json!({"id": tag.id.to_string(), "name": tag.name}))
            .collect();

        let supplier = product
            .supplier_id
            .and_then(|id| catalog.supplier(id))
            .map(|s| {
                json!({
                    "id": s.id.to_string(),
                    "name": s.name,
                    "country": s.country,
                    "reliabilityScore": decimal_to_json(s.reliability_score),
                })
            })
            .unwrap_or(Value::Null);

        json!({
            "id": product.id.to_string(),
            "name": product.name,
            "price": decimal_to_json(product.price),
            "quantity": product.quantity,
            "launchDate": product.launch_date.format("%Y-%m-%d").to_string(),
            "status": product.status,
            "isActive": product.is_active,
            "createdAt": product.created_at.to_rfc3339(),
            "updatedAt": product.updated_at.to_rfc3339(),
            "tags": tags,
            "category": Self::category_chain(catalog, product.category_id),
            "supplier": supplier,
            "distinct_tag_count": catalog.distinct_tag_count(product.id),
            "total_value": product.total_value().map(decimal_to_json),
        })
    }

    /// Nested `{id, name, taxRate, parent}` objects up to the root
    fn category_chain(catalog: &Catalog, category_id: Option<Uuid>) -> Value {
        let Some(category) = category_id.and_then(|id| catalog.category(id)) else {
            return Value::Null;
        };
        let mut chain: Vec<&Category> = vec![category];
        chain.extend(catalog.ancestors(category.id));

        chain.iter().rev().fold(Value::Null, |parent, c| {
            json!({
                "id": c.id.to_string(),
                "name": c.name,
                "taxRate": c.tax_rate.map(decimal_to_json),
                "parent": parent,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Supplier, Tag};
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_render_full_row() {
        let home = Category::root("Home");
        let kitchen = Category::child_of("Kitchen", &home).with_tax_rate(dec("0.07"));
        let supplier = Supplier::new("Acme", "DE", dec("7.5"));
        let tag = Tag::new("premium");
        let product = Product::new("Kettle", dec("19.99"), 3)
            .with_category(&kitchen)
            .with_supplier(&supplier);

        let mut builder = Catalog::builder();
        builder.category(home).unwrap();
        builder.category(kitchen).unwrap();
        builder.supplier(supplier).unwrap();
        builder.tag(tag.clone()).unwrap();
        builder.product(product.clone()).unwrap();
        builder.link(product.id, tag.id).unwrap();
        let catalog = builder.build().unwrap();

        let row = RowRenderer::render(&catalog, &product);
        assert_eq!(row["name"], json!("Kettle"));
        assert_eq!(row["price"], json!(19.99));
        assert_eq!(row["launchDate"], json!("1970-01-01"));
        assert_eq!(row["total_value"], json!(59.97));
        assert_eq!(row["distinct_tag_count"], json!(1));
        assert_eq!(row["tags"][0]["name"], json!("premium"));
        assert_eq!(row["category"]["name"], json!("Kitchen"));
        assert_eq!(row["category"]["taxRate"], json!(0.07));
        assert_eq!(row["category"]["parent"]["name"], json!("Home"));
        assert_eq!(row["category"]["parent"]["parent"], Value::Null);
        assert_eq!(row["supplier"]["reliabilityScore"], json!(7.5));
    }

    #[test]
    fn test_render_without_relations() {
        let product = Product::new("Loose", Decimal::ONE, 0);
        let mut builder = Catalog::builder();
        builder.product(product.clone()).unwrap();
        let catalog = builder.build().unwrap();

        let row = RowRenderer::render(&catalog, &product);
        assert_eq!(row["category"], Value::Null);
        assert_eq!(row["supplier"], Value::Null);
        assert_eq!(row["tags"], json!([]));
        assert_eq!(row["total_value"], json!(0));
    }
}
