//! CLI argument definitions using clap
//!
//! Commands:
//! - gridquery query --snapshot <path> --request <path> [--config <path>] [--verbose]
//! - gridquery explain --request <path> [--config <path>]
//! - gridquery check --snapshot <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gridquery - server-side row model over a product catalog
#[derive(Parser, Debug)]
#[command(name = "gridquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer one get-rows request and exit
    Query {
        /// Catalog snapshot (JSON document)
        #[arg(long)]
        snapshot: PathBuf,

        /// Get-rows request (JSON); "-" reads stdin
        #[arg(long, default_value = "-")]
        request: PathBuf,

        /// Engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Emit the structured query log
        #[arg(long)]
        verbose: bool,
    },

    /// Show how a request would be planned, without loading data
    Explain {
        /// Get-rows request (JSON); "-" reads stdin
        #[arg(long, default_value = "-")]
        request: PathBuf,

        /// Engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Load and validate a snapshot, then print entity counts
    Check {
        /// Catalog snapshot (JSON document)
        #[arg(long)]
        snapshot: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let cli = Cli::try_parse_from([
            "gridquery",
            "query",
            "--snapshot",
            "catalog.json",
            "--request",
            "req.json",
            "--verbose",
        ])
        .unwrap();
        match cli.command {
            Command::Query {
                snapshot,
                request,
                config,
                verbose,
            } => {
                assert_eq!(snapshot, PathBuf::from("catalog.json"));
                assert_eq!(request, PathBuf::from("req.json"));
                assert!(config.is_none());
                assert!(verbose);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_request_defaults_to_stdin() {
        let cli = Cli::try_parse_from(["gridquery", "explain"]).unwrap();
        match cli.command {
            Command::Explain { request, .. } => assert_eq!(request, PathBuf::from("-")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_check_requires_snapshot() {
        assert!(Cli::try_parse_from(["gridquery", "check"]).is_err());
    }
}
