//! Query executor subsystem
//!
//! Consumes validated plans and produces deterministic row windows.
//!
//! # Execution Flow (strict order)
//!
//! 1. Filter every record of the snapshot
//! 2. Narrow to the drilled-down group, if any
//! 3. Group and aggregate, or sort leaf records
//! 4. Count rows at the requested level
//! 5. Slice the window
//! 6. Render the rows in the window
//!
//! # Invariants
//!
//! - Same request + same snapshot = same response
//! - The window never exceeds the row count
//! - Derived fields are computed from the snapshot, never stored

mod executor;
mod render;
mod result;
mod service;

pub use executor::{execute, QueryExecutor};
pub use render::RowRenderer;
pub use result::ExecutionResult;
pub use service::GridQueryService;
