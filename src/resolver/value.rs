//! Resolved field values
//!
//! Owned so that sort keys and group keys can be computed once and kept
//! alongside the rows they describe.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

/// The value a field path resolves to for one record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Missing reference, null column or unknown path
    Absent,
    Text(String),
    Number(Decimal),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    /// Fan-out through a to-many relationship, in relationship order
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Wraps a fan-out; an empty collection is absent
    pub fn list(items: Vec<FieldValue>) -> Self {
        if items.is_empty() {
            FieldValue::Absent
        } else {
            FieldValue::List(items)
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    /// Scalar values as a one-element slice, lists as their items, absent as empty
    pub fn elements(&self) -> &[FieldValue] {
        match self {
            FieldValue::Absent => &[],
            FieldValue::List(items) => items,
            scalar => std::slice::from_ref(scalar),
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Calendar and datetime values as a UTC instant; dates sit at midnight
    pub fn instant(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::Date(d) => d.and_hms_opt(0, 0, 0),
            FieldValue::DateTime(dt) => Some(dt.naive_utc()),
            _ => None,
        }
    }

    /// String form used for text filters, set membership, group keys and
    /// non-numeric sorting. Lists render their distinct items joined by ", ".
    pub fn display(&self) -> Option<String> {
        match self {
            FieldValue::Absent => None,
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(n.normalize().to_string()),
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            FieldValue::DateTime(dt) => Some(dt.to_rfc3339()),
            FieldValue::List(items) => {
                let mut seen = HashSet::new();
                let parts: Vec<String> = items
                    .iter()
                    .filter_map(FieldValue::display)
                    .filter(|s| seen.insert(s.clone()))
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(", "))
                }
            }
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Absent => Value::Null,
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(n) => decimal_to_json(*n),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Date(_) | FieldValue::DateTime(_) => {
                self.display().map(Value::String).unwrap_or(Value::Null)
            }
            FieldValue::List(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
        }
    }
}

impl From<Decimal> for FieldValue {
    fn from(n: Decimal) -> Self {
        FieldValue::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

/// Renders a decimal as a JSON number; integral values stay integers
pub fn decimal_to_json(n: Decimal) -> Value {
    let n = n.normalize();
    if n.scale() == 0 {
        if let Some(i) = n.to_i64() {
            return Value::from(i);
        }
    }
    n.to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Reads a decimal from a JSON number or numeric string
pub fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(Decimal::from(i));
            }
            parse_decimal(&n.to_string())
        }
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}
