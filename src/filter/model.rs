//! Compiled filter model
//!
//! Each filter kind is a closed variant with its operands already parsed.
//! Text needles are lowercased once, numbers are decimals, dates are UTC
//! instants.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::resolver::FieldRef;

/// Text filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOp {
    Contains,
    NotContains,
    Equals,
    NotEqual,
    StartsWith,
    EndsWith,
}

impl TextOp {
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "contains" => Some(TextOp::Contains),
            "notContains" => Some(TextOp::NotContains),
            "equals" => Some(TextOp::Equals),
            "notEqual" => Some(TextOp::NotEqual),
            "startsWith" => Some(TextOp::StartsWith),
            "endsWith" => Some(TextOp::EndsWith),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextOp::Contains => "contains",
            TextOp::NotContains => "notContains",
            TextOp::Equals => "equals",
            TextOp::NotEqual => "notEqual",
            TextOp::StartsWith => "startsWith",
            TextOp::EndsWith => "endsWith",
        }
    }
}

/// Number filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberOp {
    Equals,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    /// Inclusive on both ends
    InRange,
}

impl NumberOp {
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "equals" => Some(NumberOp::Equals),
            "notEqual" => Some(NumberOp::NotEqual),
            "lessThan" => Some(NumberOp::LessThan),
            "lessThanOrEqual" => Some(NumberOp::LessThanOrEqual),
            "greaterThan" => Some(NumberOp::GreaterThan),
            "greaterThanOrEqual" => Some(NumberOp::GreaterThanOrEqual),
            "inRange" => Some(NumberOp::InRange),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NumberOp::Equals => "equals",
            NumberOp::NotEqual => "notEqual",
            NumberOp::LessThan => "lessThan",
            NumberOp::LessThanOrEqual => "lessThanOrEqual",
            NumberOp::GreaterThan => "greaterThan",
            NumberOp::GreaterThanOrEqual => "greaterThanOrEqual",
            NumberOp::InRange => "inRange",
        }
    }
}

/// Date filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOp {
    /// Same calendar day
    Equals,
    /// Different calendar day
    NotEqual,
    LessThan,
    GreaterThan,
    /// Inclusive on both ends
    InRange,
}

impl DateOp {
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "equals" => Some(DateOp::Equals),
            "notEqual" => Some(DateOp::NotEqual),
            "lessThan" => Some(DateOp::LessThan),
            "greaterThan" => Some(DateOp::GreaterThan),
            "inRange" => Some(DateOp::InRange),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateOp::Equals => "equals",
            DateOp::NotEqual => "notEqual",
            DateOp::LessThan => "lessThan",
            DateOp::GreaterThan => "greaterThan",
            DateOp::InRange => "inRange",
        }
    }
}

/// One per-field filter specification
#[derive(Debug, Clone, PartialEq)]
pub enum FilterSpec {
    Text {
        op: TextOp,
        /// Lowercased
        needle: String,
    },
    /// `value` (and `to` for inRange) is None when the filter's own operand is
    /// not numeric; such a filter constrains nothing.
    Number {
        op: NumberOp,
        value: Option<Decimal>,
        to: Option<Decimal>,
    },
    /// None entries match absent values
    Set { values: Vec<Option<String>> },
    Date {
        op: DateOp,
        from: NaiveDateTime,
        to: Option<NaiveDateTime>,
    },
    /// A filter kind the engine does not evaluate
    Unsupported { kind: String },
}

impl FilterSpec {
    pub fn kind(&self) -> &str {
        match self {
            FilterSpec::Text { .. } => "text",
            FilterSpec::Number { .. } => "number",
            FilterSpec::Set { .. } => "set",
            FilterSpec::Date { .. } => "date",
            FilterSpec::Unsupported { kind } => kind,
        }
    }

    /// True if the spec matches every record.
    ///
    /// Only a missing lower bound unconstrains a number filter; `inRange`
    /// without a numeric upper bound matches nothing.
    pub fn is_unconstraining(&self) -> bool {
        match self {
            FilterSpec::Number { value, .. } => value.is_none(),
            FilterSpec::Unsupported { .. } => true,
            _ => false,
        }
    }

    fn describe(&self) -> Value {
        match self {
            FilterSpec::Text { op, needle } => {
                json!({"filterType": "text", "type": op.as_str(), "filter": needle})
            }
            FilterSpec::Number { op, value, to } => json!({
                "filterType": "number",
                "type": op.as_str(),
                "filter": value.map(|v| v.to_string()),
                "filterTo": to.map(|v| v.to_string()),
            }),
            FilterSpec::Set { values } => json!({"filterType": "set", "values": values}),
            FilterSpec::Date { op, from, to } => json!({
                "filterType": "date",
                "type": op.as_str(),
                "dateFrom": from.to_string(),
                "dateTo": to.map(|t| t.to_string()),
            }),
            FilterSpec::Unsupported { kind } => json!({"filterType": kind, "unconstrained": true}),
        }
    }
}

/// Compiled predicate tree
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// Conjunction; empty matches everything
    All(Vec<FilterNode>),
    /// Disjunction; empty matches nothing
    Any(Vec<FilterNode>),
    Condition { field: FieldRef, spec: FilterSpec },
    /// An axis the engine could not constrain
    Unconstrained { field: Option<String> },
}

impl FilterNode {
    pub fn match_all() -> Self {
        FilterNode::All(Vec::new())
    }

    /// True if the node matches every record
    pub fn is_trivial(&self) -> bool {
        match self {
            FilterNode::All(children) => children.iter().all(FilterNode::is_trivial),
            FilterNode::Any(children) => children.iter().any(FilterNode::is_trivial),
            FilterNode::Condition { spec, .. } => spec.is_unconstraining(),
            FilterNode::Unconstrained { .. } => true,
        }
    }

    /// Field paths read by this node, in tree order
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            FilterNode::All(children) | FilterNode::Any(children) => {
                for child in children {
                    child.collect_fields(out);
                }
            }
            FilterNode::Condition { field, .. } => out.push(field.name()),
            FilterNode::Unconstrained { .. } => {}
        }
    }

    /// JSON description for plan explanation
    pub fn describe(&self) -> Value {
        match self {
            FilterNode::All(children) => {
                json!({"and": children.iter().map(FilterNode::describe).collect::<Vec<_>>()})
            }
            FilterNode::Any(children) => {
                json!({"or": children.iter().map(FilterNode::describe).collect::<Vec<_>>()})
            }
            FilterNode::Condition { field, spec } => {
                let mut value = spec.describe();
                value["field"] = json!(field.name());
                value
            }
            FilterNode::Unconstrained { field } => json!({"unconstrained": field}),
        }
    }
}
