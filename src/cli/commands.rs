//! CLI command implementations
//!
//! Commands are one-shot: read inputs, answer, print one JSON line, exit.

use std::path::Path;

use serde_json::{json, Value};

use crate::catalog::{Catalog, JsonFileSource, SnapshotSource};
use crate::config::EngineConfig;
use crate::executor::GridQueryService;
use crate::planner::{ExplainPlan, QueryPlanner};
use crate::request::GridRequest;

use super::args::Command;
use super::errors::{CliErrorCode, CliResult};
use super::io::{read_request, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Query {
            snapshot,
            request,
            config,
            verbose,
        } => query(&snapshot, &request, config.as_deref(), verbose),
        Command::Explain { request, config } => explain(&request, config.as_deref()),
        Command::Check { snapshot } => check(&snapshot),
    }
}

/// Answer one get-rows request against a snapshot file
///
/// Engine rejections are printed as an error envelope and also returned,
/// so the process exits non-zero.
pub fn query(snapshot: &Path, request_path: &Path, config_path: Option<&Path>, verbose: bool) -> CliResult<()> {
    let mut config = load_config(config_path)?;
    if !verbose {
        // stdout carries the response envelope
        config = config.quiet();
    }

    let request = match GridRequest::from_json(&read_request(request_path)?) {
        Ok(request) => request,
        Err(err) => {
            write_error(err.code().code(), err.message())?;
            return Err(err.into());
        }
    };

    let service = GridQueryService::new(JsonFileSource::new(snapshot), config);
    match service.query(&request) {
        Ok(response) => write_response(response.to_value()),
        Err(err) => {
            write_error(err.code().code(), err.message())?;
            Err(err.into())
        }
    }
}

/// Print the plan for a request without loading any snapshot
pub fn explain(request_path: &Path, config_path: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let request = GridRequest::from_json(&read_request(request_path)?)?;

    let explain = match QueryPlanner::new(&config).plan(&request) {
        Ok(plan) => ExplainPlan::from_plan(&plan),
        Err(err) => ExplainPlan::from_error(&err),
    };
    write_response(explain.to_value())
}

/// Load and validate a snapshot, then print entity counts
pub fn check(snapshot: &Path) -> CliResult<()> {
    let catalog = match JsonFileSource::new(snapshot).load() {
        Ok(catalog) => catalog,
        Err(err) => {
            write_error(CliErrorCode::SnapshotError.code(), &err.to_string())?;
            return Err(err.into());
        }
    };
    write_response(entity_counts(&catalog))
}

fn load_config(path: Option<&Path>) -> CliResult<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::load(path)?),
        None => Ok(EngineConfig::default()),
    }
}

fn entity_counts(catalog: &Catalog) -> Value {
    let roots = catalog.categories().iter().filter(|c| c.parent_id.is_none()).count();
    json!({
        "products": catalog.products().len(),
        "tags": catalog.tags().len(),
        "suppliers": catalog.suppliers().len(),
        "categories": catalog.categories().len(),
        "rootCategories": roots,
        "productTags": catalog.product_tags().len(),
    })
}
