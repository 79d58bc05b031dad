//! # Error Taxonomy
//!
//! Three layers of failure, kept apart so callers can tell them apart:
//!
//! 1. `ClientError`: anything the external table client reports. The row
//!    accessor never rewrites these; they pass through as `RowError::Client`.
//! 2. `RowError`: the two conditions the accessor synthesizes itself
//!    (`NotExist`, `DataCorrupt`) plus the passthrough.
//! 3. `ConfigError`: configuration parsing and logger installation.

use thiserror::Error;

/// Result type for table client calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type for row accessor operations.
pub type RowOutcome<T> = Result<T, RowError>;

/// Result type for configuration helpers.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors surfaced by a table client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Request could not be built or was rejected before execution.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Target table is unknown to the store.
    #[error("table not found: {table}")]
    TableNotFound { table: String },

    /// Call scope deadline elapsed before the store answered.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Call scope was released before the request ran.
    #[error("call cancelled")]
    Cancelled,

    /// Store is unreachable or refused the request.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

impl ClientError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        ClientError::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub fn table_not_found(table: &[u8]) -> Self {
        ClientError::TableNotFound {
            table: String::from_utf8_lossy(table).into_owned(),
        }
    }
}

/// Errors returned by row accessor operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// Row has no cells, or the client returned no result at all.
    #[error("item not exist")]
    NotExist,

    /// Row exists but the requested column is missing from it.
    #[error("data corruption: column {column} missing from row")]
    DataCorrupt { column: String },

    /// Failure reported by the table client, unchanged.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl RowError {
    /// Returns true for the synthesized "row does not exist" condition.
    pub fn is_not_exist(&self) -> bool {
        matches!(self, RowError::NotExist)
    }

    /// Returns true when the row exists but the column does not.
    pub fn is_data_corrupt(&self) -> bool {
        matches!(self, RowError::DataCorrupt { .. })
    }

    /// Returns the underlying client error, if this is a passthrough.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            RowError::Client(err) => Some(err),
            _ => None,
        }
    }
}

/// Configuration and logger setup failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid log level directive: {level}")]
    InvalidLevel { level: String },

    #[error("default timeout must be greater than zero")]
    InvalidTimeout,

    #[error("a global logger is already installed")]
    LoggerInstalled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_pass_through_unchanged() {
        let err: RowError = ClientError::DeadlineExceeded.into();
        assert_eq!(err.client_error(), Some(&ClientError::DeadlineExceeded));
        assert_eq!(err.to_string(), "deadline exceeded");
        assert!(!err.is_not_exist());
    }

    #[test]
    fn synthesized_errors_are_distinct() {
        let missing = RowError::NotExist;
        let corrupt = RowError::DataCorrupt {
            column: "age".to_string(),
        };
        assert!(missing.is_not_exist());
        assert!(corrupt.is_data_corrupt());
        assert!(!corrupt.is_not_exist());
        assert_eq!(corrupt.client_error(), None);
    }

    #[test]
    fn table_not_found_renders_lossy_name() {
        let err = ClientError::table_not_found(b"users");
        assert_eq!(err.to_string(), "table not found: users");
    }
}
