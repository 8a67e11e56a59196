//! Predicate evaluation
//!
//! Absent values fail every text, number and date filter. To-many values
//! match when any element matches; negated text operators match when no
//! element matches the positive form.

use rust_decimal::Decimal;

use crate::catalog::{Catalog, Product};
use crate::resolver::FieldValue;

use super::model::{DateOp, FilterNode, FilterSpec, NumberOp, TextOp};

/// Evaluates compiled filter trees against products
pub struct FilterEvaluator;

impl FilterEvaluator {
    /// Checks if a product matches a filter tree
    pub fn matches(catalog: &Catalog, product: &Product, node: &FilterNode) -> bool {
        match node {
            FilterNode::All(children) => children
                .iter()
                .all(|child| Self::matches(catalog, product, child)),
            FilterNode::Any(children) => children
                .iter()
                .any(|child| Self::matches(catalog, product, child)),
            FilterNode::Condition { field, spec } => {
                if spec.is_unconstraining() {
                    return true;
                }
                Self::matches_value(&field.resolve(catalog, product), spec)
            }
            FilterNode::Unconstrained { .. } => true,
        }
    }

    /// Checks a single resolved value against one specification
    pub fn matches_value(value: &FieldValue, spec: &FilterSpec) -> bool {
        match spec {
            FilterSpec::Text { op, needle } => Self::text_match(value, *op, needle),
            FilterSpec::Number { op, value: lo, to: hi } => match lo {
                Some(lo) => Self::number_match(value, *op, *lo, *hi),
                None => true,
            },
            FilterSpec::Set { values } => Self::set_match(value, values),
            FilterSpec::Date { op, from, to } => value.elements().iter().any(|element| {
                element.instant().is_some_and(|instant| match op {
                    DateOp::Equals => instant.date() == from.date(),
                    DateOp::NotEqual => instant.date() != from.date(),
                    DateOp::LessThan => instant < *from,
                    DateOp::GreaterThan => instant > *from,
                    DateOp::InRange => instant >= *from && to.map_or(true, |to| instant <= to),
                })
            }),
            FilterSpec::Unsupported { .. } => true,
        }
    }

    fn text_match(value: &FieldValue, op: TextOp, needle: &str) -> bool {
        let texts: Vec<String> = value
            .elements()
            .iter()
            .filter_map(FieldValue::display)
            .map(|s| s.to_lowercase())
            .collect();
        if texts.is_empty() {
            return false;
        }

        match op {
            TextOp::Contains => texts.iter().any(|t| t.contains(needle)),
            TextOp::NotContains => !texts.iter().any(|t| t.contains(needle)),
            TextOp::Equals => texts.iter().any(|t| t == needle),
            TextOp::NotEqual => !texts.iter().any(|t| t == needle),
            TextOp::StartsWith => texts.iter().any(|t| t.starts_with(needle)),
            TextOp::EndsWith => texts.iter().any(|t| t.ends_with(needle)),
        }
    }

    fn number_match(
        value: &FieldValue,
        op: NumberOp,
        lo: Decimal,
        hi: Option<Decimal>,
    ) -> bool {
        value
            .elements()
            .iter()
            .filter_map(FieldValue::as_decimal)
            .any(|n| match op {
                NumberOp::Equals => n == lo,
                NumberOp::NotEqual => n != lo,
                NumberOp::LessThan => n < lo,
                NumberOp::LessThanOrEqual => n <= lo,
                NumberOp::GreaterThan => n > lo,
                NumberOp::GreaterThanOrEqual => n >= lo,
                NumberOp::InRange => hi.is_some_and(|hi| n >= lo && n <= hi),
            })
    }

    fn set_match(value: &FieldValue, values: &[Option<String>]) -> bool {
        let elements = value.elements();
        if elements.is_empty() {
            return values.iter().any(Option::is_none);
        }
        elements.iter().any(|element| {
            let display = element.display();
            values.iter().flatten().any(|candidate| match element {
                // "10.50" names the same price as 10.5
                FieldValue::Number(n) => candidate
                    .trim()
                    .parse::<Decimal>()
                    .map_or(display.as_deref() == Some(candidate.as_str()), |c| c == *n),
                _ => display.as_deref() == Some(candidate.as_str()),
            })
        })
    }
}
