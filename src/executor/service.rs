//! Get-rows service
//!
//! Wraps planning and execution with snapshot access, structured logging
//! and counters. Each request loads one snapshot and runs entirely against it.

use crate::catalog::{SnapshotSource, SourceError};
use crate::config::EngineConfig;
use crate::observability::{Event, Logger, MetricsRegistry};
use crate::planner::{ExplainPlan, QueryPlanner};
use crate::request::{GridRequest, GridResponse, QueryError, QueryResult};

use super::executor::QueryExecutor;

/// Answers get-rows requests against snapshots from `S`
pub struct GridQueryService<S: SnapshotSource> {
    source: S,
    config: EngineConfig,
    metrics: MetricsRegistry,
}

impl<S: SnapshotSource> GridQueryService<S> {
    pub fn new(source: S, config: EngineConfig) -> Self {
        Self {
            source,
            config,
            metrics: MetricsRegistry::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Validates, plans and executes one request.
    ///
    /// Validation runs before the snapshot is touched, so a malformed
    /// request never reaches the data source.
    pub fn query(&self, request: &GridRequest) -> QueryResult<GridResponse> {
        let window = format!("{:?}..{:?}", request.start_row, request.end_row);
        self.log(Event::QueryReceived, &[("window", window.as_str())]);

        let plan = match QueryPlanner::new(&self.config).plan(request) {
            Ok(plan) => plan,
            Err(err) => {
                self.metrics.increment_queries_rejected();
                self.log(
                    Event::QueryRejected,
                    &[("code", err.code().code()), ("reason", err.message())],
                );
                return Err(err);
            }
        };

        let grouped = plan.is_grouped().to_string();
        self.log(Event::QueryPlanned, &[("grouped", grouped.as_str())]);
        for degradation in &plan.degraded {
            self.log(
                Event::FeatureDegraded,
                &[
                    ("field", degradation.field.as_deref().unwrap_or("")),
                    ("reason", degradation.message.as_str()),
                ],
            );
        }

        let catalog = match self.source.load() {
            Ok(catalog) => catalog,
            Err(err) => {
                self.metrics.increment_data_access_failures();
                let event = match err {
                    SourceError::Inconsistent(_) => Event::CatalogRejected,
                    _ => Event::SnapshotFailed,
                };
                let reason = err.to_string();
                self.log(event, &[("reason", reason.as_str())]);
                return Err(QueryError::from(err));
            }
        };
        let products = catalog.products().len().to_string();
        self.log(Event::SnapshotLoaded, &[("products", products.as_str())]);

        let result = QueryExecutor::new(&catalog).execute(&plan);

        self.metrics.increment_queries_executed();
        self.metrics.add_rows_scanned(result.scanned_count as u64);
        self.metrics.add_rows_returned(result.returned_count as u64);
        self.metrics.add_degradations(result.response.degraded.len() as u64);

        let matched = result.matched_count.to_string();
        let returned = result.returned_count.to_string();
        let row_count = result.row_count().to_string();
        self.log(
            Event::QueryExecuted,
            &[
                ("rows_matched", matched.as_str()),
                ("rows_returned", returned.as_str()),
                ("row_count", row_count.as_str()),
            ],
        );

        Ok(result.response)
    }

    /// Describes how a request would run, without loading a snapshot
    pub fn explain(&self, request: &GridRequest) -> ExplainPlan {
        match QueryPlanner::new(&self.config).plan(request) {
            Ok(plan) => ExplainPlan::from_plan(&plan),
            Err(err) => ExplainPlan::from_error(&err),
        }
    }

    fn log(&self, event: Event, fields: &[(&str, &str)]) {
        if self.config.log_queries {
            Logger::event(event, fields);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, MemorySource, Product};
    use crate::request::{QueryErrorCode, SortModelItem};
    use rust_decimal::Decimal;

    struct FailingSource;

    impl SnapshotSource for FailingSource {
        fn load(&self) -> Result<std::sync::Arc<Catalog>, SourceError> {
            Err(SourceError::Unavailable("connection refused".into()))
        }
    }

    fn service() -> GridQueryService<MemorySource> {
        let mut builder = Catalog::builder();
        builder.product(Product::new("A", Decimal::ONE, 1)).unwrap();
        builder.product(Product::new("B", Decimal::TEN, 2)).unwrap();
        GridQueryService::new(MemorySource::new(builder.build().unwrap()), EngineConfig::default().quiet())
    }

    #[test]
    fn test_query_updates_metrics() {
        let service = service();
        let response = service
            .query(&GridRequest::window(0, 1).with_sort(SortModelItem::desc("price")))
            .unwrap();
        assert_eq!(response.row_data.len(), 1);
        assert_eq!(response.row_count, Some(2));

        let metrics = service.metrics().snapshot();
        assert_eq!(metrics.queries_executed, 1);
        assert_eq!(metrics.rows_scanned, 2);
        assert_eq!(metrics.rows_returned, 1);
    }

    #[test]
    fn test_rejected_request_counts() {
        let service = service();
        let err = service.query(&GridRequest::window(-1, 5)).unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::GridRequestInvalid);
        assert_eq!(service.metrics().snapshot().queries_rejected, 1);
        assert_eq!(service.metrics().snapshot().queries_executed, 0);
    }

    #[test]
    fn test_source_failure_is_data_access() {
        let service = GridQueryService::new(FailingSource, EngineConfig::default().quiet());
        let err = service.query(&GridRequest::window(0, 10)).unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::GridDataAccess);
        assert_eq!(service.metrics().snapshot().data_access_failures, 1);
    }

    #[test]
    fn test_invalid_request_never_touches_source() {
        let service = GridQueryService::new(FailingSource, EngineConfig::default().quiet());
        let err = service.query(&GridRequest::window(5, 1)).unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::GridRequestInvalid);
        assert_eq!(service.metrics().snapshot().data_access_failures, 0);
    }

    #[test]
    fn test_explain_rejection() {
        let explain = service().explain(&GridRequest::window(5, 1));
        assert!(!explain.accepted);
    }
}
