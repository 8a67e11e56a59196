//! gridquery - server-side row model over a product catalog
//!
//! Answers get-rows requests (window, filter, sort, grouping, pivot) against
//! a consistent catalog snapshot. The pipeline is pure: the same request and
//! snapshot always produce the same response.
//!
//! ```ignore
//! use gridquery::catalog::MemorySource;
//! use gridquery::config::EngineConfig;
//! use gridquery::executor::GridQueryService;
//! use gridquery::request::GridRequest;
//!
//! let service = GridQueryService::new(MemorySource::new(catalog), EngineConfig::default());
//! let response = service.query(&GridRequest::window(0, 100))?;
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod executor;
pub mod filter;
pub mod grouping;
pub mod observability;
pub mod planner;
pub mod request;
pub mod resolver;
pub mod sort;
