//! Engine configuration
//!
//! Controls the default row window, the widest window a caller may request,
//! and how unknown field paths are treated.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What to do with a field path that is not in the field registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Unknown paths are a validation error
    #[default]
    Reject,
    /// Unknown paths resolve to an absent value; filters on them are unconstraining
    Ignore,
}

impl UnknownFieldPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnknownFieldPolicy::Reject => "reject",
            UnknownFieldPolicy::Ignore => "ignore",
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Query engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Rows returned when the request has no endRow (default: 100)
    #[serde(default = "default_block_size")]
    pub default_block_size: usize,

    /// Widest window a request may ask for (default: 10000)
    #[serde(default = "default_max_window_rows")]
    pub max_window_rows: usize,

    /// Unknown field handling (default: reject)
    #[serde(default)]
    pub unknown_field_policy: UnknownFieldPolicy,

    /// Emit structured query logs (default: true)
    #[serde(default = "default_log_queries")]
    pub log_queries: bool,
}

fn default_block_size() -> usize {
    100
}

fn default_max_window_rows() -> usize {
    10_000
}

fn default_log_queries() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_block_size: default_block_size(),
            max_window_rows: default_max_window_rows(),
            unknown_field_policy: UnknownFieldPolicy::default(),
            log_queries: default_log_queries(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Permissive variant: unknown fields never reject a request
    pub fn permissive() -> Self {
        Self {
            unknown_field_policy: UnknownFieldPolicy::Ignore,
            ..Self::default()
        }
    }

    /// Silence query logging (tests, embedding hosts with their own logs)
    pub fn quiet(mut self) -> Self {
        self.log_queries = false;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_block_size == 0 {
            return Err(ConfigError::Invalid(
                "default_block_size must be > 0".into(),
            ));
        }
        if self.max_window_rows < self.default_block_size {
            return Err(ConfigError::Invalid(format!(
                "max_window_rows ({}) must be >= default_block_size ({})",
                self.max_window_rows, self.default_block_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.default_block_size, 100);
        assert_eq!(config.max_window_rows, 10_000);
        assert_eq!(config.unknown_field_policy, UnknownFieldPolicy::Reject);
        assert!(config.log_queries);
    }

    #[test]
    fn test_load_applies_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gridquery.json");
        fs::write(&path, json!({"unknown_field_policy": "ignore"}).to_string()).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.unknown_field_policy, UnknownFieldPolicy::Ignore);
        assert_eq!(config.default_block_size, 100);
    }

    #[test]
    fn test_load_rejects_zero_block() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gridquery.json");
        fs::write(&path, json!({"default_block_size": 0}).to_string()).unwrap();

        let result = EngineConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_rejects_narrow_max_window() {
        let config = EngineConfig {
            max_window_rows: 10,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = EngineConfig::load(Path::new("/nonexistent/gridquery.json"));
        assert!(matches!(result, Err(ConfigError::Read(_))));
    }
}
