//! Observable engine events

use std::fmt;

use super::logger::LogLevel;

/// Observable events in the query path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Query lifecycle
    /// Request accepted for planning
    QueryReceived,
    /// Plan built
    QueryPlanned,
    /// Request failed validation
    QueryRejected,
    /// Rows returned
    QueryExecuted,
    /// An axis of the request was served unconstrained
    FeatureDegraded,

    // Snapshot access
    SnapshotLoaded,
    SnapshotFailed,
    /// Snapshot violated a catalog invariant
    CatalogRejected,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::QueryReceived => "GRID_QUERY_BEGIN",
            Event::QueryPlanned => "GRID_QUERY_PLANNED",
            Event::QueryRejected => "GRID_QUERY_REJECTED",
            Event::QueryExecuted => "GRID_QUERY_COMPLETE",
            Event::FeatureDegraded => "GRID_FEATURE_DEGRADED",
            Event::SnapshotLoaded => "SNAPSHOT_LOADED",
            Event::SnapshotFailed => "SNAPSHOT_FAILED",
            Event::CatalogRejected => "CATALOG_REJECTED",
        }
    }

    pub fn level(&self) -> LogLevel {
        match self {
            Event::QueryReceived | Event::QueryPlanned => LogLevel::Debug,
            Event::QueryExecuted | Event::SnapshotLoaded => LogLevel::Info,
            Event::QueryRejected | Event::FeatureDegraded => LogLevel::Warn,
            Event::SnapshotFailed | Event::CatalogRejected => LogLevel::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::QueryReceived,
            Event::QueryPlanned,
            Event::QueryRejected,
            Event::QueryExecuted,
            Event::FeatureDegraded,
            Event::SnapshotLoaded,
            Event::SnapshotFailed,
            Event::CatalogRejected,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_failures_log_as_errors() {
        assert_eq!(Event::SnapshotFailed.level(), LogLevel::Error);
        assert_eq!(Event::QueryRejected.level(), LogLevel::Warn);
    }
}
