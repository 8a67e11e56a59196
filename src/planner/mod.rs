//! Query planner subsystem
//!
//! The planner turns a request into a deterministic, validated plan before
//! any record is read.
//!
//! # Design Principles
//!
//! - Fail fast: malformed windows, sort directions, filter shapes, group
//!   paths and aggregation names are rejected here, never clamped
//! - Explicit degradation: axes that cannot be constrained are listed on
//!   the plan and reported with the response
//! - Storage-agnostic: a plan names field paths, not storage access paths,
//!   so its filter and sort stages can be pushed down to an indexed store

mod explain;
mod planner;
mod window;

pub use explain::ExplainPlan;
pub use planner::{QueryPlan, QueryPlanner};
pub use window::RowWindow;
