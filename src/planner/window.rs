//! Row window validation
//!
//! A window is accepted only if:
//! - both bounds are non-negative
//! - endRow >= startRow
//! - its width does not exceed the configured maximum
//!
//! Nothing is clamped. A missing endRow means one default block.

use std::ops::Range;

use crate::config::EngineConfig;
use crate::request::{QueryError, QueryResult};

/// Validated `[start, end)` row window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    pub start: usize,
    pub end: usize,
}

impl RowWindow {
    /// Validates request bounds against the engine configuration
    pub fn from_bounds(start_row: Option<i64>, end_row: Option<i64>, config: &EngineConfig) -> QueryResult<Self> {
        let start = start_row.unwrap_or(0);
        if start < 0 {
            return Err(QueryError::invalid_field("startRow", format!("must be >= 0, got {}", start)));
        }
        let start = start as usize;

        let end = match end_row {
            Some(end) if end < 0 => {
                return Err(QueryError::invalid_field("endRow", format!("must be >= 0, got {}", end)))
            }
            Some(end) => end as usize,
            None => start.saturating_add(config.default_block_size),
        };
        if end < start {
            return Err(QueryError::invalid_field(
                "endRow",
                format!("endRow {} is before startRow {}", end, start),
            ));
        }
        if end - start > config.max_window_rows {
            return Err(QueryError::invalid_field(
                "endRow",
                format!(
                    "window of {} rows exceeds the maximum of {}",
                    end - start,
                    config.max_window_rows
                ),
            ));
        }

        Ok(Self { start, end })
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Index range of this window over `total` rows; empty past the end
    pub fn slice(&self, total: usize) -> Range<usize> {
        self.start.min(total)..self.end.min(total)
    }
}
