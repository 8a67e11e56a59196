//! Grouping, aggregation and pivoting

mod aggregate;
mod engine;

pub use aggregate::AggFunc;
pub use engine::{
    pivot_field_id, GroupColumn, GroupEngine, GroupRow, GroupSortKey, GroupingPlan, LevelRows,
    ValueColumn, BLANK_PIVOT_KEY,
};
