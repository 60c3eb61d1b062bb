//! Error types for tabrecon operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReconError>;

#[derive(Error, Debug)]
pub enum ReconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("Column '{token}' not found in {table}")]
    ColumnNotFound { token: String, table: String },

    #[error("Key column '{column}' is missing from {table}")]
    KeyColumnMissing { column: String, table: String },

    #[error("Tables {left} and {right} have no columns in common")]
    NoSharedColumns { left: String, right: String },

    #[error("No key columns selected")]
    EmptyKeySelection,

    #[error("Invalid tolerance {value}: must be a finite number >= 0")]
    InvalidTolerance { value: f64 },

    #[error("Invalid similarity threshold {value}: must be between 0 and 1")]
    InvalidThreshold { value: f64 },

    #[error("Duplicate column '{column}' in {table}")]
    DuplicateColumn { column: String, table: String },

    #[error("Row {row} of {table} has {actual} values, expected {expected}")]
    RowWidth {
        table: String,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Data processing error: {message}")]
    DataProcessing { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl ReconError {
    pub fn column_not_found(token: impl Into<String>, table: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            token: token.into(),
            table: table.into(),
        }
    }

    pub fn key_column_missing(column: impl Into<String>, table: impl Into<String>) -> Self {
        Self::KeyColumnMissing {
            column: column.into(),
            table: table.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn data_processing(msg: impl Into<String>) -> Self {
        Self::DataProcessing {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// True for the conditions a caller can fix by changing the comparison
    /// request (as opposed to IO or file-format failures).
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::ColumnNotFound { .. }
                | Self::KeyColumnMissing { .. }
                | Self::NoSharedColumns { .. }
                | Self::EmptyKeySelection
                | Self::InvalidTolerance { .. }
                | Self::InvalidThreshold { .. }
        )
    }
}
