//! Filter evaluation
//!
//! Per-field filters are combined with AND. Combinator trees may nest AND
//! and OR over per-field conditions.

mod compile;
mod evaluator;
mod model;

pub use compile::{CompiledFilter, FilterCompiler};
pub use evaluator::FilterEvaluator;
pub use model::{DateOp, FilterNode, FilterSpec, NumberOp, TextOp};
