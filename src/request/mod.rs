//! Request and response contract
//!
//! Only field paths and values cross this boundary; catalog types and
//! storage identifiers stay behind it.

mod errors;
mod request;
mod response;

pub use errors::{QueryError, QueryErrorCode, QueryResult, Severity};
pub use request::{ColumnVO, GridRequest, SortModelItem};
pub use response::{Degradation, GridResponse};
