//! Query planner
//!
//! Validates a request completely before any record is read and produces
//! an immutable plan.
//!
//! Planning order:
//! 1. Row window
//! 2. Sort model (directions, then field binding)
//! 3. Row-group, value and pivot columns, group path depth
//! 4. Filter model

use crate::config::EngineConfig;
use crate::filter::{FilterCompiler, FilterNode};
use crate::grouping::{AggFunc, GroupColumn, GroupSortKey, GroupingPlan, ValueColumn};
use crate::request::{ColumnVO, Degradation, GridRequest, QueryError, QueryResult};
use crate::resolver::{FieldBinder, FieldPath, FieldRef};
use crate::sort::{SortDirection, SortKey};

use super::window::RowWindow;

/// Immutable query plan (no runtime state)
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub window: RowWindow,
    pub filter: FilterNode,
    /// Sort keys over product fields
    pub sort: Vec<SortKey>,
    /// Present when the request groups or pivots
    pub grouping: Option<GroupingPlan>,
    /// Axes that will be served unconstrained
    pub degraded: Vec<Degradation>,
}

impl QueryPlan {
    pub fn is_grouped(&self) -> bool {
        self.grouping.is_some()
    }
}

/// Query planner that produces deterministic plans
pub struct QueryPlanner<'a> {
    config: &'a EngineConfig,
    binder: FieldBinder,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
            binder: FieldBinder::new(config.unknown_field_policy),
        }
    }

    /// Plans a request, returning an immutable plan or a validation error.
    ///
    /// Same inputs give the same plan.
    pub fn plan(&self, request: &GridRequest) -> QueryResult<QueryPlan> {
        let mut degraded = Vec::new();

        let window = RowWindow::from_bounds(request.start_row, request.end_row, self.config)?;
        let (sort, group_sort) = self.plan_sort(request, &mut degraded)?;
        let grouping = self.plan_grouping(request, group_sort, &mut degraded)?;

        let compiled = FilterCompiler::new(self.binder).compile(request.filter_model.as_ref())?;
        degraded.extend(compiled.degraded);

        Ok(QueryPlan {
            window,
            filter: compiled.root,
            sort,
            grouping,
            degraded,
        })
    }

    fn plan_sort(
        &self,
        request: &GridRequest,
        degraded: &mut Vec<Degradation>,
    ) -> QueryResult<(Vec<SortKey>, Vec<GroupSortKey>)> {
        let mut leaf = Vec::new();
        let mut group = Vec::with_capacity(request.sort_model.len());

        for item in &request.sort_model {
            let direction = SortDirection::parse(&item.sort).ok_or_else(|| {
                QueryError::invalid_field(
                    &item.col_id,
                    format!("unknown sort direction '{}'", item.sort),
                )
            })?;

            // Column ids of the request may alias a different field path
            let column = request
                .row_group_cols
                .iter()
                .chain(&request.value_cols)
                .chain(&request.pivot_cols)
                .find(|c| c.id == item.col_id);
            let path = column.map(ColumnVO::field_path).unwrap_or(item.col_id.as_str());
            let targets_group_rows =
                column.is_some() || (request.pivot_mode && !request.pivot_cols.is_empty());

            if FieldPath::parse(path).is_some() || !targets_group_rows {
                let field = self.bind(path, degraded, "sort key ignored")?;
                leaf.push(SortKey { field, direction });
            }
            group.push(GroupSortKey {
                col_id: item.col_id.clone(),
                direction,
            });
        }

        Ok((leaf, group))
    }

    fn plan_grouping(
        &self,
        request: &GridRequest,
        group_sort: Vec<GroupSortKey>,
        degraded: &mut Vec<Degradation>,
    ) -> QueryResult<Option<GroupingPlan>> {
        if !request.is_grouped() {
            return Ok(None);
        }

        let row_groups = self.group_columns(&request.row_group_cols, degraded)?;
        let pivots = self.group_columns(&request.pivot_cols, degraded)?;

        let mut values = Vec::with_capacity(request.value_cols.len());
        for column in &request.value_cols {
            let func = AggFunc::parse(column.agg_func.as_deref()).ok_or_else(|| {
                QueryError::invalid_field(
                    &column.id,
                    format!(
                        "unknown aggFunc '{}'",
                        column.agg_func.as_deref().unwrap_or_default()
                    ),
                )
            })?;
            values.push(ValueColumn {
                id: column.id.clone(),
                field: self.bind(column.field_path(), degraded, "aggregates over no values")?,
                func,
            });
        }

        if request.group_keys.len() > row_groups.len() {
            return Err(QueryError::invalid_field(
                "groupKeys",
                format!(
                    "{} group keys for {} row group columns",
                    request.group_keys.len(),
                    row_groups.len()
                ),
            ));
        }

        Ok(Some(GroupingPlan {
            row_groups,
            values,
            pivots,
            pivot_mode: request.pivot_mode,
            group_keys: request.group_keys.clone(),
            group_sort,
        }))
    }

    fn group_columns(
        &self,
        columns: &[ColumnVO],
        degraded: &mut Vec<Degradation>,
    ) -> QueryResult<Vec<GroupColumn>> {
        columns
            .iter()
            .map(|column| {
                Ok(GroupColumn {
                    id: column.id.clone(),
                    field: self.bind(column.field_path(), degraded, "every record falls in the blank group")?,
                })
            })
            .collect()
    }

    /// Binds a field; unknown names tolerated by the policy are reported
    fn bind(&self, path: &str, degraded: &mut Vec<Degradation>, effect: &str) -> QueryResult<FieldRef> {
        let field = self.binder.bind(path)?;
        if !field.is_known() {
            degraded.push(Degradation::new(Some(path), format!("unknown field; {}", effect)));
        }
        Ok(field)
    }
}
