//! Multi-key row sorting
//!
//! Keys are resolved once per row, then compared in sort-model order. The
//! first key that differs decides. Absent values go last in either
//! direction. Ties keep input order.

use std::cmp::Ordering;

use crate::catalog::{Catalog, Product};
use crate::resolver::{FieldRef, FieldValue};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(direction: &str) -> Option<Self> {
        match direction {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    /// Applies this direction to an ordering of two present values
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One validated sort-model entry over a product field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: FieldRef,
    pub direction: SortDirection,
}

/// Sorts rows by resolved keys
pub struct RowSorter;

impl RowSorter {
    /// Sorts products by the given keys.
    ///
    /// Sort is stable and deterministic.
    pub fn sort<'a>(catalog: &Catalog, products: Vec<&'a Product>, keys: &[SortKey]) -> Vec<&'a Product> {
        if keys.is_empty() {
            return products;
        }
        let directions: Vec<SortDirection> = keys.iter().map(|k| k.direction).collect();
        let decorated = products
            .into_iter()
            .map(|product| {
                let values = keys
                    .iter()
                    .map(|k| k.field.resolve(catalog, product))
                    .collect();
                (values, product)
            })
            .collect();
        Self::sort_decorated(decorated, &directions)
    }

    /// Sorts any rows carrying precomputed key values, one per direction
    pub fn sort_decorated<T>(mut rows: Vec<(Vec<FieldValue>, T)>, directions: &[SortDirection]) -> Vec<T> {
        rows.sort_by(|(a, _), (b, _)| Self::compare_keys(a, b, directions));
        rows.into_iter().map(|(_, row)| row).collect()
    }

    /// Compares two key tuples
    pub fn compare_keys(a: &[FieldValue], b: &[FieldValue], directions: &[SortDirection]) -> Ordering {
        for ((a_val, b_val), direction) in a.iter().zip(b).zip(directions) {
            let ordering = match (a_val.is_absent(), b_val.is_absent()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => direction.apply(Self::compare_values(a_val, b_val)),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Compares two present values.
    ///
    /// Numbers compare numerically, dates and datetimes by instant,
    /// everything else by display string in dictionary order.
    pub fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
        if let (Some(x), Some(y)) = (a.as_decimal(), b.as_decimal()) {
            return x.cmp(&y);
        }
        if let (Some(x), Some(y)) = (a.instant(), b.instant()) {
            return x.cmp(&y);
        }
        match (a.display(), b.display()) {
            (Some(x), Some(y)) => compare_text(&x, &y),
            (x, y) => x.cmp(&y),
        }
    }
}

/// Dictionary order: letters compare case-folded first; words equal up to
/// case put lowercase before uppercase at the first differing letter.
fn compare_text(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded
        .then_with(|| case_order(a, b))
        .then_with(|| a.cmp(b))
}

fn case_order(a: &str, b: &str) -> Ordering {
    a.chars()
        .zip(b.chars())
        .find(|(x, y)| x != y)
        .map(|(x, y)| match (x.is_lowercase(), y.is_lowercase()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => Ordering::Equal,
        })
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn num(n: i64) -> FieldValue {
        FieldValue::Number(Decimal::from(n))
    }

    fn rows(values: &[Option<i64>]) -> Vec<(Vec<FieldValue>, usize)> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (vec![v.map(num).unwrap_or(FieldValue::Absent)], i))
            .collect()
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(SortDirection::parse("asc"), Some(SortDirection::Asc));
        assert_eq!(SortDirection::parse("desc"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("DESC"), None);
        assert_eq!(SortDirection::parse("up"), None);
    }

    #[test]
    fn test_sort_ascending_numeric() {
        let sorted = RowSorter::sort_decorated(rows(&[Some(30), Some(5), Some(200)]), &[SortDirection::Asc]);
        assert_eq!(sorted, vec![1, 0, 2]);
    }

    #[test]
    fn test_nulls_last_both_directions() {
        let input = [None, Some(2), None, Some(1)];
        let asc = RowSorter::sort_decorated(rows(&input), &[SortDirection::Asc]);
        assert_eq!(asc, vec![3, 1, 0, 2]);
        let desc = RowSorter::sort_decorated(rows(&input), &[SortDirection::Desc]);
        assert_eq!(desc, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_sort_stable_on_ties() {
        let sorted = RowSorter::sort_decorated(rows(&[Some(1), Some(1), Some(1)]), &[SortDirection::Desc]);
        assert_eq!(sorted, vec![0, 1, 2]);
    }

    #[test]
    fn test_second_key_breaks_ties() {
        let input = vec![
            (vec!["DE".into(), num(5)], "a"),
            (vec!["AT".into(), num(1)], "b"),
            (vec!["DE".into(), num(9)], "c"),
        ];
        let sorted = RowSorter::sort_decorated(input, &[SortDirection::Asc, SortDirection::Desc]);
        assert_eq!(sorted, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_text_dictionary_order() {
        assert_eq!(
            RowSorter::compare_values(&"apple".into(), &"Zebra".into()),
            Ordering::Less
        );
        assert_eq!(compare_text("Lamp", "abc"), Ordering::Greater);
        assert_eq!(compare_text("PRO-series", "Professional"), Ordering::Less);
    }

    #[test]
    fn test_text_case_breaks_ties() {
        assert_eq!(compare_text("apple", "Apple"), Ordering::Less);
        assert_eq!(compare_text("Apple", "apple"), Ordering::Greater);
        assert_eq!(compare_text("aB", "ab"), Ordering::Greater);
        assert_eq!(compare_text("Apple", "Apple"), Ordering::Equal);
        assert_ne!(compare_text("apple", "APPLE"), Ordering::Equal);
    }

    #[test]
    fn test_dates_by_instant() {
        let early = FieldValue::Date(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        let late = FieldValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(RowSorter::compare_values(&early, &late), Ordering::Less);
    }
}
