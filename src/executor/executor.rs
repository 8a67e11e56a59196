//! Query executor
//!
//! Executes plans against one catalog snapshot.
//!
//! Execution flow (strict order):
//! 1. Filter every record
//! 2. Group and aggregate at the requested level, or sort the filtered records
//! 3. Count rows at that level
//! 4. Slice the row window
//! 5. Render only the rows in the window

use serde_json::Value;

use crate::catalog::{Catalog, Product};
use crate::config::EngineConfig;
use crate::filter::FilterEvaluator;
use crate::grouping::{GroupEngine, LevelRows};
use crate::planner::{QueryPlan, QueryPlanner, RowWindow};
use crate::request::{Degradation, GridRequest, GridResponse, QueryResult};
use crate::sort::RowSorter;

use super::render::RowRenderer;
use super::result::ExecutionResult;

/// Plans and executes a request in one call
pub fn execute(catalog: &Catalog, request: &GridRequest, config: &EngineConfig) -> QueryResult<GridResponse> {
    let plan = QueryPlanner::new(config).plan(request)?;
    Ok(QueryExecutor::new(catalog).execute(&plan).response)
}

/// Query executor over a catalog snapshot
pub struct QueryExecutor<'a> {
    catalog: &'a Catalog,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Executes a validated plan.
    ///
    /// Same plan + same snapshot = same response.
    pub fn execute(&self, plan: &QueryPlan) -> ExecutionResult {
        let products = self.catalog.products();
        let scanned_count = products.len();

        // Step 1: Filter
        let matched: Vec<&Product> = products
            .iter()
            .filter(|product| FilterEvaluator::matches(self.catalog, product, &plan.filter))
            .collect();
        let matched_count = matched.len();

        // Steps 2-5
        let level = match &plan.grouping {
            Some(grouping) => GroupEngine::run(self.catalog, matched, grouping),
            None => LevelRows::Leaves(matched),
        };
        let mut degraded = plan.degraded.clone();
        let (row_data, row_count, pivot_result_fields) = match level {
            LevelRows::Leaves(members) => {
                let sorted = RowSorter::sort(self.catalog, members, &plan.sort);
                let total = sorted.len();
                let rows: Vec<Value> = window(&sorted, plan.window)
                    .iter()
                    .map(|product| RowRenderer::render(self.catalog, product))
                    .collect();
                (rows, total, None)
            }
            LevelRows::Groups {
                rows,
                pivot_result_fields,
                overflowed,
            } => {
                degraded.extend(overflowed.iter().map(|id| Degradation::aggregate_overflow(id)));
                let total = rows.len();
                let rows: Vec<Value> = window(&rows, plan.window).iter().map(|row| row.to_json()).collect();
                (rows, total, pivot_result_fields)
            }
        };

        let returned_count = row_data.len();
        ExecutionResult {
            response: GridResponse {
                row_data,
                row_count: Some(row_count),
                pivot_result_fields,
                degraded,
            },
            scanned_count,
            matched_count,
            returned_count,
        }
    }
}

fn window<T>(rows: &[T], window: RowWindow) -> &[T] {
    &rows[window.slice(rows.len())]
}
