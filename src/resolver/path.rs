//! Field path registry
//!
//! Dotted paths are resolved against a closed set of entity fields, so a
//! typo in a request surfaces as an unknown field instead of silently
//! matching nothing.
//!
//! Accepted shapes:
//! - `<product field>` (including the derived `distinct_tag_count` and `total_value`)
//! - `category.<field>`, `category.parent.<field>`, `category.parent.parent.<field>`, ...
//! - `supplier.<field>`
//! - `tags.<field>` (to-many; bare `tags` reads tag names)

use std::fmt;

use rust_decimal::Decimal;

use crate::catalog::{Catalog, Category, Product, Supplier};

use super::value::FieldValue;

/// Scalar columns of a product, plus derived read-time fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Id,
    Name,
    Price,
    Quantity,
    LaunchDate,
    Status,
    IsActive,
    CreatedAt,
    UpdatedAt,
    /// Number of distinct tags linked to the product
    DistinctTagCount,
    /// price × quantity
    TotalValue,
}

impl ProductField {
    const ALL: [ProductField; 11] = [
        ProductField::Id,
        ProductField::Name,
        ProductField::Price,
        ProductField::Quantity,
        ProductField::LaunchDate,
        ProductField::Status,
        ProductField::IsActive,
        ProductField::CreatedAt,
        ProductField::UpdatedAt,
        ProductField::DistinctTagCount,
        ProductField::TotalValue,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProductField::Id => "id",
            ProductField::Name => "name",
            ProductField::Price => "price",
            ProductField::Quantity => "quantity",
            ProductField::LaunchDate => "launchDate",
            ProductField::Status => "status",
            ProductField::IsActive => "isActive",
            ProductField::CreatedAt => "createdAt",
            ProductField::UpdatedAt => "updatedAt",
            ProductField::DistinctTagCount => "distinct_tag_count",
            ProductField::TotalValue => "total_value",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// True for fields computed from other data at read time
    pub fn is_derived(&self) -> bool {
        matches!(self, ProductField::DistinctTagCount | ProductField::TotalValue)
    }

    fn resolve(&self, catalog: &Catalog, product: &Product) -> FieldValue {
        match self {
            ProductField::Id => FieldValue::Text(product.id.to_string()),
            ProductField::Name => FieldValue::Text(product.name.clone()),
            ProductField::Price => FieldValue::Number(product.price),
            ProductField::Quantity => FieldValue::Number(Decimal::from(product.quantity)),
            ProductField::LaunchDate => FieldValue::Date(product.launch_date),
            ProductField::Status => FieldValue::Text(product.status.clone()),
            ProductField::IsActive => FieldValue::Bool(product.is_active),
            ProductField::CreatedAt => FieldValue::DateTime(product.created_at),
            ProductField::UpdatedAt => FieldValue::DateTime(product.updated_at),
            ProductField::DistinctTagCount => {
                FieldValue::Number(Decimal::from(catalog.distinct_tag_count(product.id) as u64))
            }
            ProductField::TotalValue => product
                .total_value()
                .map(FieldValue::Number)
                .unwrap_or(FieldValue::Absent),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    Id,
    Name,
    TaxRate,
}

impl CategoryField {
    pub fn name(&self) -> &'static str {
        match self {
            CategoryField::Id => "id",
            CategoryField::Name => "name",
            CategoryField::TaxRate => "taxRate",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(CategoryField::Id),
            "name" => Some(CategoryField::Name),
            "taxRate" => Some(CategoryField::TaxRate),
            _ => None,
        }
    }

    fn resolve(&self, category: &Category) -> FieldValue {
        match self {
            CategoryField::Id => FieldValue::Text(category.id.to_string()),
            CategoryField::Name => FieldValue::Text(category.name.clone()),
            CategoryField::TaxRate => category
                .tax_rate
                .map(FieldValue::Number)
                .unwrap_or(FieldValue::Absent),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplierField {
    Id,
    Name,
    Country,
    ReliabilityScore,
}

impl SupplierField {
    pub fn name(&self) -> &'static str {
        match self {
            SupplierField::Id => "id",
            SupplierField::Name => "name",
            SupplierField::Country => "country",
            SupplierField::ReliabilityScore => "reliabilityScore",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(SupplierField::Id),
            "name" => Some(SupplierField::Name),
            "country" => Some(SupplierField::Country),
            "reliabilityScore" => Some(SupplierField::ReliabilityScore),
            _ => None,
        }
    }

    fn resolve(&self, supplier: &Supplier) -> FieldValue {
        match self {
            SupplierField::Id => FieldValue::Text(supplier.id.to_string()),
            SupplierField::Name => FieldValue::Text(supplier.name.clone()),
            SupplierField::Country => FieldValue::Text(supplier.country.clone()),
            SupplierField::ReliabilityScore => FieldValue::Number(supplier.reliability_score),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    Id,
    Name,
}

impl TagField {
    pub fn name(&self) -> &'static str {
        match self {
            TagField::Id => "id",
            TagField::Name => "name",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(TagField::Id),
            "name" => Some(TagField::Name),
            _ => None,
        }
    }
}

/// A validated path from a product to one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    Product(ProductField),
    /// `ancestors` counts `.parent` hops above the product's own category
    Category { ancestors: usize, field: CategoryField },
    Supplier(SupplierField),
    Tags(TagField),
}

impl FieldPath {
    /// Parses a dotted path; None if it names nothing in the registry
    pub fn parse(path: &str) -> Option<FieldPath> {
        let segments: Vec<&str> = path.split('.').collect();
        match segments.as_slice() {
            [] => None,
            [single] if *single == "tags" => Some(FieldPath::Tags(TagField::Name)),
            [single] => ProductField::from_name(single).map(FieldPath::Product),
            ["supplier", field] => SupplierField::from_name(field).map(FieldPath::Supplier),
            ["tags", field] => TagField::from_name(field).map(FieldPath::Tags),
            ["category", rest @ ..] => {
                let (field, hops) = rest.split_last()?;
                if hops.iter().any(|s| *s != "parent") {
                    return None;
                }
                let field = CategoryField::from_name(field)?;
                Some(FieldPath::Category {
                    ancestors: hops.len(),
                    field,
                })
            }
            _ => None,
        }
    }

    /// True if the path fans out through the product-tag join
    pub fn is_to_many(&self) -> bool {
        matches!(self, FieldPath::Tags(_))
    }

    /// Reads the field for one product. Broken or short reference chains
    /// resolve to Absent.
    pub fn resolve(&self, catalog: &Catalog, product: &Product) -> FieldValue {
        match self {
            FieldPath::Product(field) => field.resolve(catalog, product),
            FieldPath::Category { ancestors, field } => product
                .category_id
                .and_then(|id| catalog.ancestor_at(id, *ancestors))
                .map(|category| field.resolve(category))
                .unwrap_or(FieldValue::Absent),
            FieldPath::Supplier(field) => product
                .supplier_id
                .and_then(|id| catalog.supplier(id))
                .map(|supplier| field.resolve(supplier))
                .unwrap_or(FieldValue::Absent),
            FieldPath::Tags(field) => FieldValue::list(
                catalog
                    .tags_of(product.id)
                    .into_iter()
                    .map(|tag| match field {
                        TagField::Id => FieldValue::Text(tag.id.to_string()),
                        TagField::Name => FieldValue::Text(tag.name.clone()),
                    })
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Product(field) => write!(f, "{}", field.name()),
            FieldPath::Category { ancestors, field } => {
                write!(f, "category")?;
                for _ in 0..*ancestors {
                    write!(f, ".parent")?;
                }
                write!(f, ".{}", field.name())
            }
            FieldPath::Supplier(field) => write!(f, "supplier.{}", field.name()),
            FieldPath::Tags(field) => write!(f, "tags.{}", field.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, Supplier, Tag};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn fixture() -> (Catalog, Product, Product) {
        let electronics = Category::root("Electronics");
        let computers = Category::child_of("Computers", &electronics);
        let laptops = Category::child_of("Laptops", &computers).with_tax_rate(dec("0.2"));
        let supplier = Supplier::new("Acme", "DE", dec("8"));
        let premium = Tag::new("premium");
        let portable = Tag::new("portable");

        let laptop = Product::new("Laptop", dec("1000"), 3)
            .with_category(&laptops)
            .with_supplier(&supplier);
        let cable = Product::new("Cable", dec("5"), 10);

        let mut builder = Catalog::builder();
        builder.category(electronics).unwrap();
        builder.category(computers).unwrap();
        builder.category(laptops).unwrap();
        builder.supplier(supplier).unwrap();
        builder.tag(premium.clone()).unwrap();
        builder.tag(portable.clone()).unwrap();
        builder.product(laptop.clone()).unwrap();
        builder.product(cable.clone()).unwrap();
        builder.link(laptop.id, premium.id).unwrap();
        builder.link(laptop.id, portable.id).unwrap();
        (builder.build().unwrap(), laptop, cable)
    }

    #[test]
    fn test_parse_registry() {
        assert_eq!(
            FieldPath::parse("price"),
            Some(FieldPath::Product(ProductField::Price))
        );
        assert_eq!(
            FieldPath::parse("category.parent.parent.name"),
            Some(FieldPath::Category {
                ancestors: 2,
                field: CategoryField::Name
            })
        );
        assert_eq!(
            FieldPath::parse("tags"),
            Some(FieldPath::Tags(TagField::Name))
        );
        assert_eq!(FieldPath::parse("category.parent"), None);
        assert_eq!(FieldPath::parse("category.colour"), None);
        assert_eq!(FieldPath::parse("supplier.country.code"), None);
        assert_eq!(FieldPath::parse(""), None);
    }

    #[test]
    fn test_display_round_trips() {
        for path in ["category.parent.taxRate", "supplier.country", "tags.name", "total_value"] {
            assert_eq!(FieldPath::parse(path).unwrap().to_string(), path);
        }
    }

    #[test]
    fn test_resolve_category_chain() {
        let (catalog, laptop, cable) = fixture();
        let grandparent = FieldPath::parse("category.parent.parent.name").unwrap();
        assert_eq!(grandparent.resolve(&catalog, &laptop), "Electronics".into());
        assert_eq!(grandparent.resolve(&catalog, &cable), FieldValue::Absent);

        let too_far = FieldPath::parse("category.parent.parent.parent.name").unwrap();
        assert_eq!(too_far.resolve(&catalog, &laptop), FieldValue::Absent);

        let tax = FieldPath::parse("category.taxRate").unwrap();
        assert_eq!(tax.resolve(&catalog, &laptop), FieldValue::Number(dec("0.2")));
        let parent_tax = FieldPath::parse("category.parent.taxRate").unwrap();
        assert_eq!(parent_tax.resolve(&catalog, &laptop), FieldValue::Absent);
    }

    #[test]
    fn test_derived_fields_flagged() {
        assert!(ProductField::TotalValue.is_derived());
        assert!(ProductField::DistinctTagCount.is_derived());
        assert!(!ProductField::Price.is_derived());
    }

    #[test]
    fn test_resolve_derived_fields() {
        let (catalog, laptop, cable) = fixture();
        let total = FieldPath::Product(ProductField::TotalValue);
        assert_eq!(total.resolve(&catalog, &laptop), FieldValue::Number(dec("3000")));
        let overflowing = Product::new("Bulk", dec("100000000000"), i64::MAX);
        assert_eq!(total.resolve(&catalog, &overflowing), FieldValue::Absent);

        let tags = FieldPath::Product(ProductField::DistinctTagCount);
        assert_eq!(tags.resolve(&catalog, &laptop), FieldValue::Number(dec("2")));
        assert_eq!(tags.resolve(&catalog, &cable), FieldValue::Number(dec("0")));
    }

    #[test]
    fn test_resolve_tags_fan_out() {
        let (catalog, laptop, cable) = fixture();
        let names = FieldPath::parse("tags.name").unwrap();
        let value = names.resolve(&catalog, &laptop);
        assert_eq!(value.elements().len(), 2);
        assert_eq!(value.display().as_deref(), Some("premium, portable"));
        assert!(names.resolve(&catalog, &cable).is_absent());
        assert!(names.is_to_many());
    }
}
