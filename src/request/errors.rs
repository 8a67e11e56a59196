//! Query error types
//!
//! Error codes:
//! - GRID_REQUEST_INVALID (REJECT)
//! - GRID_FEATURE_UNSUPPORTED (DEGRADE)
//! - GRID_DATA_ACCESS (ERROR)

use std::fmt;

use crate::catalog::SourceError;

/// Severity levels for query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Request rejected before any record was read
    Reject,
    /// Request served with one axis left unconstrained
    Degrade,
    /// Request failed after validation
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Degrade => write!(f, "DEGRADE"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Query error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// Malformed request: window bounds, sort direction, filter shape, unknown field
    GridRequestInvalid,
    /// A requested capability the engine does not provide
    GridFeatureUnsupported,
    /// Record snapshot could not be obtained
    GridDataAccess,
}

impl QueryErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::GridRequestInvalid => "GRID_REQUEST_INVALID",
            QueryErrorCode::GridFeatureUnsupported => "GRID_FEATURE_UNSUPPORTED",
            QueryErrorCode::GridDataAccess => "GRID_DATA_ACCESS",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            QueryErrorCode::GridRequestInvalid => Severity::Reject,
            QueryErrorCode::GridFeatureUnsupported => Severity::Degrade,
            QueryErrorCode::GridDataAccess => Severity::Error,
        }
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query error with full context
#[derive(Debug, Clone, PartialEq)]
pub struct QueryError {
    code: QueryErrorCode,
    message: String,
    field: Option<String>,
}

impl QueryError {
    /// Create a request validation error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::GridRequestInvalid,
            message: reason.into(),
            field: None,
        }
    }

    /// Create a validation error tied to one field
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: QueryErrorCode::GridRequestInvalid,
            message: format!("{}: {}", f, reason.into()),
            field: Some(f),
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(field: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: QueryErrorCode::GridRequestInvalid,
            message: format!("Unknown field '{}'", f),
            field: Some(f),
        }
    }

    /// Create an unsupported feature error
    pub fn unsupported(field: Option<&str>, reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::GridFeatureUnsupported,
            message: reason.into(),
            field: field.map(str::to_string),
        }
    }

    /// Create a data access error
    pub fn data_access(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::GridDataAccess,
            message: reason.into(),
            field: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the field name if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns whether this error rejected the request before scanning
    pub fn is_validation(&self) -> bool {
        self.code == QueryErrorCode::GridRequestInvalid
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for QueryError {}

impl From<SourceError> for QueryError {
    fn from(e: SourceError) -> Self {
        QueryError::data_access(e.to_string())
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
