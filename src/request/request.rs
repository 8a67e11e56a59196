//! Server-side row request
//!
//! Transport-agnostic shape of a "get rows" call: a window, row-group /
//! value / pivot column descriptors, the expanded group path, a filter
//! model and a sort model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{QueryError, QueryResult};

/// Column descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnVO {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub agg_func: Option<String>,
}

impl ColumnVO {
    /// Descriptor whose id doubles as its field path
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            field: None,
            agg_func: None,
        }
    }

    pub fn with_agg(mut self, agg_func: impl Into<String>) -> Self {
        self.agg_func = Some(agg_func.into());
        self
    }

    /// Field path this column reads (falls back to the id)
    pub fn field_path(&self) -> &str {
        self.field.as_deref().unwrap_or(&self.id)
    }
}

/// One entry of the sort model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortModelItem {
    pub col_id: String,
    /// "asc" or "desc"; anything else is rejected by the planner
    pub sort: String,
}

impl SortModelItem {
    pub fn asc(col_id: impl Into<String>) -> Self {
        Self {
            col_id: col_id.into(),
            sort: "asc".to_string(),
        }
    }

    pub fn desc(col_id: impl Into<String>) -> Self {
        Self {
            col_id: col_id.into(),
            sort: "desc".to_string(),
        }
    }
}

/// A get-rows request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRequest {
    #[serde(default)]
    pub start_row: Option<i64>,
    #[serde(default)]
    pub end_row: Option<i64>,
    #[serde(default)]
    pub row_group_cols: Vec<ColumnVO>,
    #[serde(default)]
    pub value_cols: Vec<ColumnVO>,
    #[serde(default)]
    pub pivot_cols: Vec<ColumnVO>,
    #[serde(default)]
    pub pivot_mode: bool,
    /// Expanded group path; null addresses the group of records with no value
    #[serde(default)]
    pub group_keys: Vec<Option<String>>,
    /// Column-keyed filter map or a combinator tree; null means unconstrained
    #[serde(default)]
    pub filter_model: Option<Value>,
    #[serde(default)]
    pub sort_model: Vec<SortModelItem>,
}

impl GridRequest {
    /// Parses a request from JSON text
    pub fn from_json(json: &str) -> QueryResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| QueryError::invalid(format!("Invalid request JSON: {}", e)))
    }

    /// Parses a request from a JSON value
    pub fn from_value(value: Value) -> QueryResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| QueryError::invalid(format!("Invalid request: {}", e)))
    }

    pub fn window(start_row: i64, end_row: i64) -> Self {
        Self {
            start_row: Some(start_row),
            end_row: Some(end_row),
            ..Self::default()
        }
    }

    pub fn with_sort(mut self, item: SortModelItem) -> Self {
        self.sort_model.push(item);
        self
    }

    pub fn with_filter(mut self, model: Value) -> Self {
        self.filter_model = Some(model);
        self
    }

    pub fn with_row_group(mut self, column: ColumnVO) -> Self {
        self.row_group_cols.push(column);
        self
    }

    pub fn with_value(mut self, column: ColumnVO) -> Self {
        self.value_cols.push(column);
        self
    }

    pub fn with_pivot(mut self, column: ColumnVO) -> Self {
        self.pivot_mode = true;
        self.pivot_cols.push(column);
        self
    }

    pub fn with_group_key(mut self, key: impl Into<String>) -> Self {
        self.group_keys.push(Some(key.into()));
        self
    }

    /// Expands the group of records with no value at the next level
    pub fn with_blank_group_key(mut self) -> Self {
        self.group_keys.push(None);
        self
    }

    /// True if the caller asked for any grouping or pivot view
    pub fn is_grouped(&self) -> bool {
        !self.row_group_cols.is_empty() || self.pivot_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_request() {
        let request = GridRequest::from_json(
            r#"{
                "startRow": 0,
                "endRow": 50,
                "rowGroupCols": [{"id": "supplier.country", "displayName": "Supplier Country", "field": "supplier.country"}],
                "valueCols": [{"id": "total_value", "displayName": "Total Value", "aggFunc": "sum"}],
                "pivotCols": [],
                "pivotMode": false,
                "groupKeys": [],
                "filterModel": {"name": {"filterType": "text", "type": "contains", "filter": "pro"}},
                "sortModel": [{"colId": "price", "sort": "desc"}]
            }"#,
        )
        .unwrap();

        assert_eq!(request.end_row, Some(50));
        assert_eq!(request.row_group_cols[0].field_path(), "supplier.country");
        assert_eq!(request.value_cols[0].agg_func.as_deref(), Some("sum"));
        assert_eq!(request.sort_model[0], SortModelItem::desc("price"));
        assert!(request.is_grouped());
    }

    #[test]
    fn test_parse_minimal_request() {
        let request = GridRequest::from_json("{}").unwrap();
        assert_eq!(request.start_row, None);
        assert!(request.filter_model.is_none());
        assert!(!request.is_grouped());
    }

    #[test]
    fn test_parse_rejects_bad_json() {
        let err = GridRequest::from_json("{\"startRow\": \"zero\"}").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_field_path_falls_back_to_id() {
        let column = ColumnVO::new("price");
        assert_eq!(column.field_path(), "price");
    }
}
