//! Aggregate functions over a group's member values

use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::resolver::FieldValue;
use crate::sort::RowSorter;

/// Supported aggregation functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggFunc {
    #[default]
    Sum,
    Count,
    Avg,
    Min,
    Max,
}

/// The exact decimal result of an aggregate does not fit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOverflow;

impl AggFunc {
    /// Parses an aggFunc name; a missing name means sum
    pub fn parse(name: Option<&str>) -> Option<Self> {
        match name {
            None | Some("sum") => Some(AggFunc::Sum),
            Some("count") => Some(AggFunc::Count),
            Some("avg") => Some(AggFunc::Avg),
            Some("min") => Some(AggFunc::Min),
            Some("max") => Some(AggFunc::Max),
            Some(_) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AggFunc::Sum => "sum",
            AggFunc::Count => "count",
            AggFunc::Avg => "avg",
            AggFunc::Min => "min",
            AggFunc::Max => "max",
        }
    }

    /// Aggregates one resolved value per member record.
    ///
    /// `count` counts members. The numeric functions skip absent and
    /// non-numeric values and yield Absent when nothing numeric remains.
    /// `min`/`max` compare with the sort comparator, so they work on text
    /// and dates too. A sum that leaves the decimal range is an error, never
    /// an empty cell.
    pub fn apply(&self, values: &[FieldValue]) -> Result<FieldValue, AggregateOverflow> {
        let value = match self {
            AggFunc::Count => FieldValue::Number(Decimal::from(values.len() as u64)),
            AggFunc::Sum => match numeric_sum(values)? {
                Some((sum, _)) => FieldValue::Number(sum),
                None => FieldValue::Absent,
            },
            AggFunc::Avg => numeric_sum(values)?
                .and_then(|(sum, n)| sum.checked_div(Decimal::from(n as u64)))
                .map(|avg| FieldValue::Number(avg.normalize()))
                .unwrap_or(FieldValue::Absent),
            AggFunc::Min => extreme(values, Ordering::Less),
            AggFunc::Max => extreme(values, Ordering::Greater),
        };
        Ok(value)
    }
}

/// Sum and count of the numeric elements; None if there are none
fn numeric_sum(values: &[FieldValue]) -> Result<Option<(Decimal, usize)>, AggregateOverflow> {
    let numbers: Vec<Decimal> = values
        .iter()
        .flat_map(FieldValue::elements)
        .filter_map(FieldValue::as_decimal)
        .collect();
    if numbers.is_empty() {
        return Ok(None);
    }
    let sum = numbers
        .iter()
        .try_fold(Decimal::ZERO, |acc, n| acc.checked_add(*n))
        .ok_or(AggregateOverflow)?;
    Ok(Some((sum, numbers.len())))
}

fn extreme(values: &[FieldValue], wanted: Ordering) -> FieldValue {
    values
        .iter()
        .flat_map(FieldValue::elements)
        .filter(|v| !v.is_absent())
        .fold(None::<&FieldValue>, |best, candidate| match best {
            Some(current) if RowSorter::compare_values(candidate, current) != wanted => Some(current),
            _ => Some(candidate),
        })
        .cloned()
        .unwrap_or(FieldValue::Absent)
}
