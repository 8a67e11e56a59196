//! Explain plan output
//!
//! Produces deterministic, human-readable explain output, and the same
//! content as JSON for the CLI.

use std::fmt;

use serde_json::{json, Value};

use crate::request::{Degradation, QueryError};

use super::planner::QueryPlan;

/// Explain plan output
#[derive(Debug, Clone)]
pub struct ExplainPlan {
    /// Whether planning succeeded
    pub accepted: bool,
    /// Row window `[start, end)`
    pub window: Option<(usize, usize)>,
    /// Compiled filter tree
    pub filter: Option<Value>,
    /// Leaf sort keys, "<field> <dir>"
    pub sort: Vec<String>,
    /// Grouping and pivot description
    pub grouping: Option<Value>,
    /// Axes served unconstrained
    pub degraded: Vec<Degradation>,
    /// Rejection reason (if rejected)
    pub rejection_reason: Option<String>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
}

impl ExplainPlan {
    /// Creates an explain plan from a successful query plan
    pub fn from_plan(plan: &QueryPlan) -> Self {
        Self {
            accepted: true,
            window: Some((plan.window.start, plan.window.end)),
            filter: Some(plan.filter.describe()),
            sort: plan
                .sort
                .iter()
                .map(|key| format!("{} {}", key.field.name(), key.direction.as_str()))
                .collect(),
            grouping: plan.grouping.as_ref().map(|g| g.describe()),
            degraded: plan.degraded.clone(),
            rejection_reason: None,
            rejection_code: None,
        }
    }

    /// Creates an explain plan from a planning error
    pub fn from_error(err: &QueryError) -> Self {
        Self {
            accepted: false,
            window: None,
            filter: None,
            sort: Vec::new(),
            grouping: None,
            degraded: Vec::new(),
            rejection_reason: Some(err.message().to_string()),
            rejection_code: Some(err.code().code().to_string()),
        }
    }

    pub fn to_value(&self) -> Value {
        if !self.accepted {
            return json!({
                "accepted": false,
                "code": self.rejection_code,
                "reason": self.rejection_reason,
            });
        }
        json!({
            "accepted": true,
            "window": self.window.map(|(start, end)| json!({"startRow": start, "endRow": end})),
            "filter": self.filter,
            "sort": self.sort,
            "grouping": self.grouping,
            "degraded": self.degraded,
        })
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;

        if self.accepted {
            writeln!(f, "Status: ACCEPTED")?;
            if let Some((start, end)) = self.window {
                writeln!(f, "Window: [{}, {})", start, end)?;
            }
            if let Some(filter) = &self.filter {
                writeln!(f, "Filter: {}", filter)?;
            }
            if !self.sort.is_empty() {
                writeln!(f, "Sort:")?;
                for key in &self.sort {
                    writeln!(f, "  - {}", key)?;
                }
            }
            if let Some(grouping) = &self.grouping {
                writeln!(f, "Grouping: {}", grouping)?;
            }
            for notice in &self.degraded {
                writeln!(
                    f,
                    "Degraded: {} ({})",
                    notice.message,
                    notice.field.as_deref().unwrap_or("-")
                )?;
            }
        } else {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
        }

        Ok(())
    }
}
