//! Get-rows response

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{QueryError, QueryErrorCode};

/// An axis of the request that was served unconstrained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degradation {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl Degradation {
    pub fn new(field: Option<&str>, message: impl Into<String>) -> Self {
        Self::from_error(&QueryError::unsupported(field, message))
    }

    /// A value cell whose aggregate left the decimal range and is served as null
    pub fn aggregate_overflow(cell_id: &str) -> Self {
        Self {
            code: QueryErrorCode::GridDataAccess.code().to_string(),
            field: Some(cell_id.to_string()),
            message: format!("aggregate for '{}' overflows the decimal range", cell_id),
        }
    }

    pub fn from_error(err: &QueryError) -> Self {
        Self {
            code: err.code().code().to_string(),
            field: err.field().map(str::to_string),
            message: err.message().to_string(),
        }
    }
}

/// Rows for one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridResponse {
    pub row_data: Vec<Value>,
    /// Exact number of rows at the requested level; absent means "probe for more"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    /// Synthetic column ids produced by pivoting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot_result_fields: Option<Vec<String>>,
    /// Unconstrained axes, reported alongside the best-effort rows
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<Degradation>,
}

impl GridResponse {
    pub fn empty() -> Self {
        Self {
            row_data: Vec::new(),
            row_count: Some(0),
            pivot_result_fields: None,
            degraded: Vec::new(),
        }
    }

    /// Convert to JSON value
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_shape() {
        let response = GridResponse {
            row_data: vec![json!({"name": "Lamp"})],
            row_count: Some(1),
            pivot_result_fields: None,
            degraded: Vec::new(),
        };

        let value = response.to_value();
        assert_eq!(value["rowCount"], json!(1));
        assert_eq!(value["rowData"][0]["name"], json!("Lamp"));
        assert!(value.get("pivotResultFields").is_none());
        assert!(value.get("degraded").is_none());
    }

    #[test]
    fn test_degradation_carries_code() {
        let notice = Degradation::new(Some("name"), "filterType 'multi' is not supported");
        assert_eq!(notice.code, "GRID_FEATURE_UNSUPPORTED");
        assert_eq!(notice.field.as_deref(), Some("name"));
    }
}
