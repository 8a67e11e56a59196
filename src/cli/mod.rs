//! CLI module for gridquery
//!
//! Provides command-line interface for:
//! - query: One-shot get-rows request against a snapshot file
//! - explain: One-shot plan description
//! - check: Snapshot validation

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, explain, query, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};
