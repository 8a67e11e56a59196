//! Filter model compilation
//!
//! Accepts three shapes:
//! - a column map `{ "<path>": { "filterType": ..., "type": ..., ... } }`
//! - per-column two-condition entries `{ "filterType", "operator": "AND"|"OR", "conditions": [c1, c2] }`
//! - a combinator tree `{ "filterType": "join", "type": "AND"|"OR", "conditions": [...] }`
//!   whose leaves carry `colId`
//!
//! Malformed shapes are validation errors. Unknown filter kinds and, under
//! the ignore policy, unknown fields compile to unconstrained nodes with a
//! degradation notice.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::request::{Degradation, QueryError, QueryResult};
use crate::resolver::{decimal_from_json, FieldBinder};

use super::model::{DateOp, FilterNode, FilterSpec, NumberOp, TextOp};

/// A compiled filter with the notices produced while compiling it
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    pub root: FilterNode,
    pub degraded: Vec<Degradation>,
}

impl CompiledFilter {
    pub fn match_all() -> Self {
        Self {
            root: FilterNode::match_all(),
            degraded: Vec::new(),
        }
    }
}

/// Compiles request filter models against the field registry
pub struct FilterCompiler {
    binder: FieldBinder,
}

impl FilterCompiler {
    pub fn new(binder: FieldBinder) -> Self {
        Self { binder }
    }

    /// Compiles a filter model; None and null mean unconstrained
    pub fn compile(&self, model: Option<&Value>) -> QueryResult<CompiledFilter> {
        let mut degraded = Vec::new();
        let root = match model {
            None | Some(Value::Null) => FilterNode::match_all(),
            Some(Value::Object(map)) if is_join(map) => self.compile_join(map, &mut degraded)?,
            Some(Value::Object(map)) => {
                let mut children = Vec::with_capacity(map.len());
                for (path, entry) in map {
                    children.push(self.compile_column(path, entry, &mut degraded)?);
                }
                FilterNode::All(children)
            }
            Some(_) => return Err(QueryError::invalid("filterModel must be an object")),
        };
        Ok(CompiledFilter { root, degraded })
    }

    fn compile_join(
        &self,
        map: &Map<String, Value>,
        degraded: &mut Vec<Degradation>,
    ) -> QueryResult<FilterNode> {
        let conditions = conditions_of(map, None)?;
        let mut children = Vec::with_capacity(conditions.len());
        for condition in conditions {
            let entry = condition
                .as_object()
                .ok_or_else(|| QueryError::invalid("join condition must be an object"))?;
            if is_join(entry) {
                children.push(self.compile_join(entry, degraded)?);
                continue;
            }
            let path = entry
                .get("colId")
                .and_then(Value::as_str)
                .ok_or_else(|| QueryError::invalid("join condition is missing colId"))?;
            children.push(self.compile_leaf(path, entry, degraded)?);
        }
        combine(map.get("type"), None, children)
    }

    fn compile_column(
        &self,
        path: &str,
        entry: &Value,
        degraded: &mut Vec<Degradation>,
    ) -> QueryResult<FilterNode> {
        let entry = entry
            .as_object()
            .ok_or_else(|| QueryError::invalid_field(path, "filter entry must be an object"))?;

        if entry.contains_key("conditions") {
            let conditions = conditions_of(entry, Some(path))?;
            let mut children = Vec::with_capacity(conditions.len());
            for condition in conditions {
                let condition = condition.as_object().ok_or_else(|| {
                    QueryError::invalid_field(path, "filter condition must be an object")
                })?;
                // Conditions inherit the column's kind when they omit it
                let mut merged = condition.clone();
                if let Some(kind) = entry.get("filterType") {
                    merged.entry("filterType").or_insert_with(|| kind.clone());
                }
                children.push(self.compile_leaf(path, &merged, degraded)?);
            }
            return combine(entry.get("operator"), Some(path), children);
        }

        self.compile_leaf(path, entry, degraded)
    }

    fn compile_leaf(
        &self,
        path: &str,
        entry: &Map<String, Value>,
        degraded: &mut Vec<Degradation>,
    ) -> QueryResult<FilterNode> {
        let field = self.binder.bind(path)?;
        let kind = entry
            .get("filterType")
            .and_then(Value::as_str)
            .ok_or_else(|| QueryError::invalid_field(path, "filter is missing filterType"))?;

        let spec = match kind {
            "text" => compile_text(path, entry)?,
            "number" => compile_number(path, entry)?,
            "set" => compile_set(path, entry)?,
            "date" => compile_date(path, entry)?,
            other => {
                degraded.push(Degradation::new(
                    Some(path),
                    format!("filterType '{}' is not supported; field not filtered", other),
                ));
                return Ok(FilterNode::Unconstrained {
                    field: Some(path.to_string()),
                });
            }
        };

        if !field.is_known() {
            degraded.push(Degradation::new(
                Some(path),
                "unknown field; field not filtered",
            ));
            return Ok(FilterNode::Unconstrained {
                field: Some(path.to_string()),
            });
        }

        Ok(FilterNode::Condition { field, spec })
    }
}

fn is_join(map: &Map<String, Value>) -> bool {
    map.get("filterType").and_then(Value::as_str) == Some("join")
}

fn conditions_of<'a>(map: &'a Map<String, Value>, path: Option<&str>) -> QueryResult<&'a Vec<Value>> {
    map.get("conditions").and_then(Value::as_array).ok_or_else(|| {
        let reason = "conditions must be an array";
        match path {
            Some(p) => QueryError::invalid_field(p, reason),
            None => QueryError::invalid(reason),
        }
    })
}

fn combine(operator: Option<&Value>, path: Option<&str>, children: Vec<FilterNode>) -> QueryResult<FilterNode> {
    let operator = operator.and_then(Value::as_str).unwrap_or("AND");
    match operator.to_ascii_uppercase().as_str() {
        "AND" => Ok(FilterNode::All(children)),
        "OR" => Ok(FilterNode::Any(children)),
        _ => {
            let reason = format!("unknown combinator '{}'", operator);
            Err(match path {
                Some(p) => QueryError::invalid_field(p, reason),
                None => QueryError::invalid(reason),
            })
        }
    }
}

fn operator<'a>(path: &str, entry: &'a Map<String, Value>, default: &'a str) -> QueryResult<&'a str> {
    match entry.get("type") {
        None | Some(Value::Null) => Ok(default),
        Some(Value::String(op)) => Ok(op),
        Some(_) => Err(QueryError::invalid_field(path, "filter type must be a string")),
    }
}

fn compile_text(path: &str, entry: &Map<String, Value>) -> QueryResult<FilterSpec> {
    let name = operator(path, entry, "contains")?;
    let op = TextOp::parse(name)
        .ok_or_else(|| QueryError::invalid_field(path, format!("unknown text operator '{}'", name)))?;
    let needle = match entry.get("filter") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.to_lowercase(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(_) => return Err(QueryError::invalid_field(path, "text filter value must be a string")),
    };
    Ok(FilterSpec::Text { op, needle })
}

fn compile_number(path: &str, entry: &Map<String, Value>) -> QueryResult<FilterSpec> {
    let name = operator(path, entry, "equals")?;
    let op = NumberOp::parse(name)
        .ok_or_else(|| QueryError::invalid_field(path, format!("unknown number operator '{}'", name)))?;
    let value = entry.get("filter").and_then(decimal_from_json);
    let to = entry.get("filterTo").and_then(decimal_from_json);
    Ok(FilterSpec::Number { op, value, to })
}

fn compile_set(path: &str, entry: &Map<String, Value>) -> QueryResult<FilterSpec> {
    let raw = entry
        .get("values")
        .and_then(Value::as_array)
        .ok_or_else(|| QueryError::invalid_field(path, "set filter values must be an array"))?;
    let mut values = Vec::with_capacity(raw.len());
    for value in raw {
        values.push(match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(_) => decimal_from_json(value).map(|d| d.normalize().to_string()),
            _ => {
                return Err(QueryError::invalid_field(
                    path,
                    "set filter values must be scalars",
                ))
            }
        });
    }
    Ok(FilterSpec::Set { values })
}

fn compile_date(path: &str, entry: &Map<String, Value>) -> QueryResult<FilterSpec> {
    let name = operator(path, entry, "equals")?;
    let op = DateOp::parse(name)
        .ok_or_else(|| QueryError::invalid_field(path, format!("unknown date operator '{}'", name)))?;
    let from = entry
        .get("dateFrom")
        .and_then(Value::as_str)
        .ok_or_else(|| QueryError::invalid_field(path, "date filter is missing dateFrom"))
        .and_then(|s| parse_date(path, s))?;
    let to = match op {
        DateOp::InRange => Some(
            entry
                .get("dateTo")
                .and_then(Value::as_str)
                .ok_or_else(|| QueryError::invalid_field(path, "inRange date filter is missing dateTo"))
                .and_then(|s| parse_date(path, s))?,
        ),
        _ => None,
    };
    Ok(FilterSpec::Date { op, from, to })
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and RFC 3339
fn parse_date(path: &str, text: &str) -> QueryResult<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.naive_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| QueryError::invalid_field(path, format!("unparseable date '{}'", text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnknownFieldPolicy;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn compiler() -> FilterCompiler {
        FilterCompiler::new(FieldBinder::new(UnknownFieldPolicy::Reject))
    }

    fn lenient() -> FilterCompiler {
        FilterCompiler::new(FieldBinder::new(UnknownFieldPolicy::Ignore))
    }

    #[test]
    fn test_absent_model_matches_all() {
        let compiled = compiler().compile(None).unwrap();
        assert!(compiled.root.is_trivial());
        assert!(compiler().compile(Some(&Value::Null)).unwrap().root.is_trivial());
    }

    #[test]
    fn test_column_map() {
        let model = json!({
            "name": {"filterType": "text", "type": "contains", "filter": "PRO"},
            "price": {"filterType": "number", "type": "inRange", "filter": 10, "filterTo": 20}
        });
        let compiled = compiler().compile(Some(&model)).unwrap();
        let FilterNode::All(children) = &compiled.root else {
            panic!("expected conjunction");
        };
        assert_eq!(children.len(), 2);
        assert_eq!(compiled.root.fields(), vec!["name", "price"]);
        match &children[0] {
            FilterNode::Condition {
                spec: FilterSpec::Text { needle, .. },
                ..
            } => assert_eq!(needle, "pro"),
            other => panic!("unexpected node {:?}", other),
        }
        match &children[1] {
            FilterNode::Condition {
                spec: FilterSpec::Number { value, to, .. },
                ..
            } => {
                assert_eq!(*value, Some(Decimal::from(10)));
                assert_eq!(*to, Some(Decimal::from(20)));
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind_degrades() {
        let model = json!({"name": {"filterType": "multi", "filterModels": []}});
        let compiled = compiler().compile(Some(&model)).unwrap();
        assert!(compiled.root.is_trivial());
        assert_eq!(compiled.degraded.len(), 1);
        assert_eq!(compiled.degraded[0].field.as_deref(), Some("name"));
    }

    #[test]
    fn test_unknown_field_policy() {
        let model = json!({"colour": {"filterType": "text", "filter": "red"}});
        let err = compiler().compile(Some(&model)).unwrap_err();
        assert!(err.is_validation());

        let compiled = lenient().compile(Some(&model)).unwrap();
        assert!(compiled.root.is_trivial());
        assert_eq!(compiled.degraded.len(), 1);
    }

    #[test]
    fn test_malformed_entries_rejected() {
        let cases = [
            json!([1, 2]),
            json!({"name": "pro"}),
            json!({"name": {"type": "contains"}}),
            json!({"name": {"filterType": "text", "type": "like", "filter": "x"}}),
            json!({"tags.name": {"filterType": "set", "values": "premium"}}),
            json!({"launchDate": {"filterType": "date", "dateFrom": "yesterday"}}),
            json!({"launchDate": {"filterType": "date", "type": "inRange", "dateFrom": "2024-01-01"}}),
        ];
        for model in cases {
            let err = compiler().compile(Some(&model)).unwrap_err();
            assert!(err.is_validation(), "expected rejection for {}", model);
        }
    }

    #[test]
    fn test_legacy_two_condition_entry() {
        let model = json!({
            "name": {
                "filterType": "text",
                "operator": "OR",
                "conditions": [
                    {"type": "startsWith", "filter": "lap"},
                    {"type": "endsWith", "filter": "top"}
                ]
            }
        });
        let compiled = compiler().compile(Some(&model)).unwrap();
        let FilterNode::All(children) = &compiled.root else {
            panic!("expected conjunction");
        };
        assert!(matches!(&children[0], FilterNode::Any(inner) if inner.len() == 2));
    }

    #[test]
    fn test_join_tree() {
        let model = json!({
            "filterType": "join",
            "type": "OR",
            "conditions": [
                {"colId": "supplier.country", "filterType": "text", "type": "equals", "filter": "DE"},
                {
                    "filterType": "join",
                    "type": "AND",
                    "conditions": [
                        {"colId": "price", "filterType": "number", "type": "lessThan", "filter": 10}
                    ]
                }
            ]
        });
        let compiled = compiler().compile(Some(&model)).unwrap();
        assert!(matches!(&compiled.root, FilterNode::Any(children) if children.len() == 2));
        assert_eq!(compiled.root.fields(), vec!["supplier.country", "price"]);

        let missing = json!({"filterType": "join", "type": "AND", "conditions": [{"filterType": "text"}]});
        assert!(compiler().compile(Some(&missing)).is_err());

        let bad_type = json!({"filterType": "join", "type": "XOR", "conditions": []});
        assert!(compiler().compile(Some(&bad_type)).is_err());
    }

    #[test]
    fn test_date_formats() {
        for text in ["2024-03-01", "2024-03-01 00:00:00", "2024-03-01T00:00:00Z"] {
            let parsed = parse_date("launchDate", text).unwrap();
            assert_eq!(parsed.to_string(), "2024-03-01 00:00:00");
        }
    }
}
