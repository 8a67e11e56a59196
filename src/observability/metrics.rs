//! Query metrics registry
//!
//! - Counters only, monotonic
//! - Owned by a service instance, no process-global state
//! - Thread-safe with Relaxed atomics

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for one query service
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Requests that returned rows
    queries_executed: AtomicU64,
    /// Requests rejected by validation
    queries_rejected: AtomicU64,
    /// Records examined by the filter stage
    rows_scanned: AtomicU64,
    /// Rows placed in responses
    rows_returned: AtomicU64,
    /// Degradation notices issued
    degradations: AtomicU64,
    /// Snapshots that could not be loaded
    data_access_failures: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rows_scanned(&self, rows: u64) {
        self.rows_scanned.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn add_rows_returned(&self, rows: u64) {
        self.rows_returned.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn add_degradations(&self, count: u64) {
        self.degradations.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_data_access_failures(&self) {
        self.data_access_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            rows_scanned: self.rows_scanned.load(Ordering::Relaxed),
            rows_returned: self.rows_returned.load(Ordering::Relaxed),
            degradations: self.degradations.load(Ordering::Relaxed),
            data_access_failures: self.data_access_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub rows_scanned: u64,
    pub rows_returned: u64,
    pub degradations: u64,
    pub data_access_failures: u64,
}

impl MetricsSnapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
