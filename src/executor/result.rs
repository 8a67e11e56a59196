//! Result types for query execution

use crate::request::GridResponse;

/// Result of executing one plan
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Response handed back to the caller
    pub response: GridResponse,
    /// Records examined by the filter stage
    pub scanned_count: usize,
    /// Records that passed the filter
    pub matched_count: usize,
    /// Rows in the returned window
    pub returned_count: usize,
}

impl ExecutionResult {
    /// Total rows available at the requested level
    pub fn row_count(&self) -> usize {
        self.response.row_count.unwrap_or(self.returned_count)
    }
}
