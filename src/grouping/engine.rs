//! Drill-down grouping and pivoting
//!
//! A request at level N (N = number of group keys) narrows the records to
//! the expanded group path, then either partitions them by the N-th group
//! column or, once every group column is expanded, hands back the member
//! records.

use std::collections::{BTreeSet, HashMap};

use serde_json::{json, Map, Value};

use crate::catalog::{Catalog, Product};
use crate::resolver::{FieldRef, FieldValue};
use crate::sort::{RowSorter, SortDirection};

use super::aggregate::{AggFunc, AggregateOverflow};

/// Label for records with no pivot value
pub const BLANK_PIVOT_KEY: &str = "(blank)";

/// A row-group or pivot column bound to its field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupColumn {
    pub id: String,
    pub field: FieldRef,
}

impl GroupColumn {
    /// Group key of one record: the display string, None when absent
    pub fn key_of(&self, catalog: &Catalog, product: &Product) -> Option<String> {
        self.field.resolve(catalog, product).display()
    }
}

/// A value column with its aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueColumn {
    pub id: String,
    pub field: FieldRef,
    pub func: AggFunc,
}

/// Sort-model entry applied to group rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSortKey {
    pub col_id: String,
    pub direction: SortDirection,
}

/// Validated grouping and pivot request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingPlan {
    pub row_groups: Vec<GroupColumn>,
    pub values: Vec<ValueColumn>,
    pub pivots: Vec<GroupColumn>,
    pub pivot_mode: bool,
    /// Expanded group path; None addresses the absent-value group
    pub group_keys: Vec<Option<String>>,
    pub group_sort: Vec<GroupSortKey>,
}

impl GroupingPlan {
    /// Depth of the requested level
    pub fn level(&self) -> usize {
        self.group_keys.len()
    }

    /// True when the level returns member records instead of group rows
    pub fn is_leaf_level(&self) -> bool {
        self.level() >= self.row_groups.len() && !(self.pivot_mode && self.row_groups.is_empty())
    }

    pub fn is_pivoting(&self) -> bool {
        self.pivot_mode && !self.pivots.is_empty()
    }

    /// JSON description for plan explanation
    pub fn describe(&self) -> Value {
        json!({
            "rowGroups": self.row_groups.iter().map(|c| c.field.name()).collect::<Vec<_>>(),
            "values": self
                .values
                .iter()
                .map(|v| json!({"id": v.id, "field": v.field.name(), "aggFunc": v.func.as_str()}))
                .collect::<Vec<_>>(),
            "pivots": self.pivots.iter().map(|c| c.field.name()).collect::<Vec<_>>(),
            "pivotMode": self.pivot_mode,
            "groupKeys": self.group_keys,
            "level": self.level(),
            "leafLevel": self.is_leaf_level(),
        })
    }
}

/// One aggregated row at a group level
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    /// Group key; None for the absent-value group and the pivot total row
    pub key: Option<String>,
    /// Number of member records
    pub child_count: usize,
    column: Option<GroupColumn>,
    /// Group value of the first member, used for ordering
    representative: FieldValue,
    cells: Vec<(String, FieldValue)>,
}

impl GroupRow {
    /// Value this row exposes under a column id
    pub fn value_of(&self, col_id: &str) -> Option<&FieldValue> {
        if let Some(column) = &self.column {
            if column.id == col_id || column.field.name() == col_id {
                return Some(&self.representative);
            }
        }
        self.cells
            .iter()
            .find(|(id, _)| id == col_id)
            .map(|(_, value)| value)
    }

    /// Renders the row: the group key at its (nested) field path, one entry
    /// per aggregate and pivot cell, and `childCount`.
    pub fn to_json(&self) -> Value {
        let mut row = Map::new();
        if let Some(column) = &self.column {
            let key = self.key.clone().map(Value::String).unwrap_or(Value::Null);
            insert_path(&mut row, column.field.name(), key.clone());
            if column.id != column.field.name() {
                row.insert(column.id.clone(), key);
            }
        }
        for (id, value) in &self.cells {
            row.insert(id.clone(), value.to_json());
        }
        row.insert("childCount".to_string(), json!(self.child_count));
        Value::Object(row)
    }
}

/// Rows produced for the requested level
#[derive(Debug)]
pub enum LevelRows<'a> {
    /// Member records, still unsorted
    Leaves(Vec<&'a Product>),
    Groups {
        rows: Vec<GroupRow>,
        pivot_result_fields: Option<Vec<String>>,
        /// Cell ids whose aggregate overflowed in at least one row
        overflowed: Vec<String>,
    },
}

/// Partitions and aggregates filtered records
pub struct GroupEngine;

impl GroupEngine {
    pub fn run<'a>(catalog: &Catalog, products: Vec<&'a Product>, plan: &GroupingPlan) -> LevelRows<'a> {
        let members = Self::narrow(catalog, products, plan);
        if plan.is_leaf_level() {
            return LevelRows::Leaves(members);
        }

        let pivot_keys = if plan.is_pivoting() {
            Self::pivot_keys(catalog, &members, &plan.pivots)
        } else {
            Vec::new()
        };

        let mut overflowed = BTreeSet::new();
        let rows = match plan.row_groups.get(plan.level()) {
            Some(column) => {
                let mut rows = Vec::new();
                for (key, group) in Self::partition(catalog, &members, column) {
                    rows.push(Self::group_row(
                        catalog,
                        key,
                        Some(column),
                        &group,
                        plan,
                        &pivot_keys,
                        &mut overflowed,
                    ));
                }
                rows
            }
            None => vec![Self::group_row(
                catalog,
                None,
                None,
                &members,
                plan,
                &pivot_keys,
                &mut overflowed,
            )],
        };

        let rows = Self::sort_groups(rows, &plan.group_sort);
        let pivot_result_fields = plan.is_pivoting().then(|| {
            pivot_keys
                .iter()
                .flat_map(|key| plan.values.iter().map(move |v| pivot_field_id(key, &v.id)))
                .collect()
        });

        LevelRows::Groups {
            rows,
            pivot_result_fields,
            overflowed: overflowed.into_iter().collect(),
        }
    }

    /// Keeps the records inside the expanded group path
    fn narrow<'a>(catalog: &Catalog, products: Vec<&'a Product>, plan: &GroupingPlan) -> Vec<&'a Product> {
        let path: Vec<(&GroupColumn, Option<&str>)> = plan
            .row_groups
            .iter()
            .zip(plan.group_keys.iter().map(Option::as_deref))
            .collect();
        if path.is_empty() {
            return products;
        }
        products
            .into_iter()
            .filter(|product| {
                path.iter().all(|(column, expected)| {
                    column.key_of(catalog, product).as_deref() == *expected
                })
            })
            .collect()
    }

    /// Groups records by key in first-seen order
    fn partition<'a>(
        catalog: &Catalog,
        members: &[&'a Product],
        column: &GroupColumn,
    ) -> Vec<(Option<String>, Vec<&'a Product>)> {
        let mut groups: Vec<(Option<String>, Vec<&'a Product>)> = Vec::new();
        let mut slots: HashMap<Option<String>, usize> = HashMap::new();
        for product in members {
            let key = column.key_of(catalog, product);
            match slots.get(&key) {
                Some(&slot) => groups[slot].1.push(*product),
                None => {
                    slots.insert(key.clone(), groups.len());
                    groups.push((key, vec![*product]));
                }
            }
        }
        groups
    }

    /// Distinct pivot keys of the level's records, sorted
    fn pivot_keys(catalog: &Catalog, members: &[&Product], pivots: &[GroupColumn]) -> Vec<String> {
        members
            .iter()
            .map(|product| pivot_key(catalog, product, pivots))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn group_row(
        catalog: &Catalog,
        key: Option<String>,
        column: Option<&GroupColumn>,
        members: &[&Product],
        plan: &GroupingPlan,
        pivot_keys: &[String],
        overflowed: &mut BTreeSet<String>,
    ) -> GroupRow {
        let representative = match (column, members.first()) {
            (Some(column), Some(first)) => column.field.resolve(catalog, first),
            _ => FieldValue::Absent,
        };

        let mut cells = Vec::with_capacity(plan.values.len() * (pivot_keys.len() + 1));
        for value in &plan.values {
            let cell = aggregate(catalog, members.iter().copied(), value, &value.id, overflowed);
            cells.push((value.id.clone(), cell));
        }

        if !pivot_keys.is_empty() {
            let keyed: Vec<(String, &Product)> = members
                .iter()
                .map(|product| (pivot_key(catalog, product, &plan.pivots), *product))
                .collect();
            for pivot in pivot_keys {
                let subset = keyed
                    .iter()
                    .filter(|(key, _)| key == pivot)
                    .map(|(_, product)| *product);
                for value in &plan.values {
                    let id = pivot_field_id(pivot, &value.id);
                    let cell = aggregate(catalog, subset.clone(), value, &id, overflowed);
                    cells.push((id, cell));
                }
            }
        }

        GroupRow {
            key,
            child_count: members.len(),
            column: column.cloned(),
            representative,
            cells,
        }
    }

    /// Orders group rows by the sort entries they expose; others are skipped
    fn sort_groups(rows: Vec<GroupRow>, keys: &[GroupSortKey]) -> Vec<GroupRow> {
        let applicable: Vec<&GroupSortKey> = keys
            .iter()
            .filter(|key| rows.iter().any(|row| row.value_of(&key.col_id).is_some()))
            .collect();
        if applicable.is_empty() {
            return rows;
        }

        let directions: Vec<SortDirection> = applicable.iter().map(|k| k.direction).collect();
        let decorated = rows
            .into_iter()
            .map(|row| {
                let values = applicable
                    .iter()
                    .map(|k| row.value_of(&k.col_id).cloned().unwrap_or(FieldValue::Absent))
                    .collect();
                (values, row)
            })
            .collect();
        RowSorter::sort_decorated(decorated, &directions)
    }
}

/// Aggregates one cell; an overflow leaves the cell null and records its id
fn aggregate<'a>(
    catalog: &Catalog,
    members: impl Iterator<Item = &'a Product>,
    column: &ValueColumn,
    cell_id: &str,
    overflowed: &mut BTreeSet<String>,
) -> FieldValue {
    let values: Vec<FieldValue> = members.map(|p| column.field.resolve(catalog, p)).collect();
    match column.func.apply(&values) {
        Ok(value) => value,
        Err(AggregateOverflow) => {
            overflowed.insert(cell_id.to_string());
            FieldValue::Absent
        }
    }
}

/// Pivot key of one record: each pivot column's escaped key, joined by `_`
fn pivot_key(catalog: &Catalog, product: &Product, pivots: &[GroupColumn]) -> String {
    pivots
        .iter()
        .map(|column| match column.key_of(catalog, product) {
            Some(key) => escape_pivot_part(&key),
            None => BLANK_PIVOT_KEY.to_string(),
        })
        .collect::<Vec<_>>()
        .join("_")
}

/// Escapes `\` and `_` so the joined key splits back unambiguously. A real
/// value spelled like the blank label is escaped too.
fn escape_pivot_part(key: &str) -> String {
    if key == BLANK_PIVOT_KEY {
        return format!("\\{}", key);
    }
    let mut escaped = String::with_capacity(key.len());
    for c in key.chars() {
        if c == '\\' || c == '_' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Synthetic column id of one pivot value × value column
pub fn pivot_field_id(pivot_key: &str, value_col_id: &str) -> String {
    format!("{}_{}", pivot_key, value_col_id)
}

/// Sets `value` at a dotted path, creating intermediate objects
fn insert_path(row: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            row.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = row
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                insert_path(map, rest, value);
            }
        }
    }
}
