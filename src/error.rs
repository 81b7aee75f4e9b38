//! Error types for ledger operations and reading ingestion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`crate::ledger::CarbonLedger`] operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("unit not found: {0}")]
    UnitNotFound(String),

    #[error("tenant not found: {0}")]
    TenantNotFound(String),

    /// Rejected edit or reading. The payload names the offending field.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("ingestion failed: {0}")]
    Ingest(#[from] IngestError),
}

/// Errors raised while loading readings from CSV.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot read \"{path}\": {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("line {line}: invalid date \"{value}\" (expected RFC 3339 or YYYY-MM-DD)")]
    Date { line: u64, value: String },

    #[error("line {line}: {field} must be a finite non-negative number, got {value}")]
    OutOfRange {
        line: u64,
        field: &'static str,
        value: f64,
    },
}

/// Convenience alias for ledger results.
pub type Result<T> = std::result::Result<T, LedgerError>;
