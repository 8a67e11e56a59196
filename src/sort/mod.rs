//! Sort engine

mod sorter;

pub use sorter::{RowSorter, SortDirection, SortKey};
