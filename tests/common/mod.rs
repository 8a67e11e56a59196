//! Shared catalog fixture for integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use gridquery::catalog::{Catalog, Category, Product, Supplier, Tag};
use gridquery::config::EngineConfig;
use gridquery::executor::execute;
use gridquery::request::{GridRequest, GridResponse, QueryResult};
use rust_decimal::Decimal;
use serde_json::Value;

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Five products over a three-level category tree, three suppliers and three tags.
///
/// | name               | price | qty | country | category    | tags              |
/// |--------------------|-------|-----|---------|-------------|-------------------|
/// | Professional Drill | 10    | 2   | DE      | Kitchen     | premium, compact  |
/// | PRO-series Phone   | 5     | 3   | DE      | Android     | compact           |
/// | abc                | 50    | 1   | SE      | Smartphones |                   |
/// | Lamp               | 20    | 4   | -       | -           | sale              |
/// | Widget             | 15.5  | 0   | FR      | Electronics | premium, sale     |
pub struct Fixture {
    pub catalog: Catalog,
    pub electronics: Category,
    pub smartphones: Category,
    pub android: Category,
    pub home: Category,
    pub kitchen: Category,
}

pub fn fixture() -> Fixture {
    let electronics = Category::root("Electronics").with_tax_rate(dec("0.2"));
    let smartphones = Category::child_of("Smartphones", &electronics);
    let android = Category::child_of("Android", &smartphones);
    let home = Category::root("Home");
    let kitchen = Category::child_of("Kitchen", &home).with_tax_rate(dec("0.07"));

    let acme = Supplier::new("Acme", "DE", dec("8.5"));
    let nordic = Supplier::new("Nordic", "SE", dec("6"));
    let lumen = Supplier::new("Lumen", "FR", dec("9.1"));

    let premium = Tag::new("premium");
    let compact = Tag::new("compact");
    let sale = Tag::new("sale");

    let drill = Product::new("Professional Drill", dec("10"), 2)
        .with_launch_date(date(2024, 1, 15))
        .with_category(&kitchen)
        .with_supplier(&acme);
    let phone = Product::new("PRO-series Phone", dec("5"), 3)
        .with_launch_date(date(2024, 3, 1))
        .with_category(&android)
        .with_supplier(&acme);
    let abc = Product::new("abc", dec("50"), 1)
        .with_launch_date(date(2023, 12, 31))
        .with_status("Discontinued")
        .with_category(&smartphones)
        .with_supplier(&nordic)
        .inactive();
    let lamp = Product::new("Lamp", dec("20"), 4).with_launch_date(date(2024, 6, 10));
    let widget = Product::new("Widget", dec("15.5"), 0)
        .with_launch_date(date(2024, 1, 15))
        .with_category(&electronics)
        .with_supplier(&lumen);

    let mut builder = Catalog::builder();
    for category in [&electronics, &smartphones, &android, &home, &kitchen] {
        builder.category(category.clone()).unwrap();
    }
    for supplier in [acme, nordic, lumen] {
        builder.supplier(supplier).unwrap();
    }
    for tag in [&premium, &compact, &sale] {
        builder.tag(tag.clone()).unwrap();
    }
    for product in [&drill, &phone, &abc, &lamp, &widget] {
        builder.product(product.clone()).unwrap();
    }
    builder.link(drill.id, premium.id).unwrap();
    builder.link(drill.id, compact.id).unwrap();
    builder.link(phone.id, compact.id).unwrap();
    builder.link(lamp.id, sale.id).unwrap();
    builder.link(widget.id, premium.id).unwrap();
    builder.link(widget.id, sale.id).unwrap();

    Fixture {
        catalog: builder.build().unwrap(),
        electronics,
        smartphones,
        android,
        home,
        kitchen,
    }
}

pub fn run(catalog: &Catalog, request: &GridRequest) -> QueryResult<GridResponse> {
    execute(catalog, request, &EngineConfig::default())
}

pub fn run_ok(catalog: &Catalog, request: &GridRequest) -> GridResponse {
    run(catalog, request).unwrap()
}

/// Product names of a flat response, in order
pub fn names(response: &GridResponse) -> Vec<String> {
    response
        .row_data
        .iter()
        .map(|row| row["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

pub fn request(value: Value) -> GridRequest {
    GridRequest::from_value(value).unwrap()
}
