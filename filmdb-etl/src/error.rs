//! Error types for filmdb-etl
//!
//! Provider and parse failures never reach this type: they are absorbed
//! into placeholder records and absent fields. What remains is fatal.

use thiserror::Error;

/// ETL error type
#[derive(Debug, Error)]
pub enum EtlError {
    /// Input file lacks required columns (raised before any write)
    #[error("{file} must contain {} columns", quoted(.missing))]
    MissingColumns { file: String, missing: Vec<String> },

    /// CSV reader error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON (cache file) error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// filmdb-common error
    #[error("Common error: {0}")]
    Common(#[from] filmdb_common::Error),
}

fn quoted(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("'{}'", c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for ETL operations
pub type EtlResult<T> = Result<T, EtlError>;
