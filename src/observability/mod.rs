//! Observability subsystem
//!
//! Provides:
//! - Structured logging (JSON lines)
//! - Typed query and snapshot events
//! - Per-service counters
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on query results
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use gridquery::observability::{Event, Logger, MetricsRegistry};
//!
//! Logger::event(Event::QueryExecuted, &[("rows_returned", "42")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_queries_executed();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{LogLevel, Logger};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
