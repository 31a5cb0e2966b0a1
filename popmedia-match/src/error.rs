//! Error types for popmedia-match
//!
//! Per-asset failures are recorded and the run continues. Catalog schema
//! mismatches degrade to warnings. An unreadable media root, an unreachable
//! catalog or an unwritable report ends the run.

use std::path::PathBuf;
use thiserror::Error;

use crate::services::file_scanner::ScanError;

/// Catalog lookup problems
///
/// Schema mismatches are non-fatal: they are collected as warnings on the
/// listing while the source falls back to positional columns.
#[derive(Debug, Error)]
pub enum DataSourceError {
    /// Expected column absent, positional fallback used
    #[error("Table {table} has no column {expected}, falling back to column {fallback}")]
    ColumnFallback {
        table: String,
        expected: String,
        fallback: String,
    },

    /// Not enough columns to apply the positional fallback
    #[error("Table {table} has too few columns for lookup ({found} found)")]
    TooFewColumns { table: String, found: usize },

    /// Name list could not be read
    #[error("Name list {0} could not be read: {1}")]
    NameList(PathBuf, String),

    /// Catalog database error
    #[error("Catalog error: {0}")]
    Catalog(#[from] popmedia_common::Error),
}

impl From<sqlx::Error> for DataSourceError {
    fn from(err: sqlx::Error) -> Self {
        DataSourceError::Catalog(popmedia_common::Error::Database(err))
    }
}

/// Filesystem failure isolated to one action
#[derive(Debug, Error)]
pub enum FileSystemError {
    /// Source vanished between planning and execution
    #[error("Source missing: {0}")]
    SourceMissing(PathBuf),

    /// Underlying I/O failure
    #[error("{operation} {path} failed: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileSystemError {
    pub(crate) fn io(
        operation: &'static str,
        path: &std::path::Path,
        source: std::io::Error,
    ) -> Self {
        FileSystemError::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Failure to produce the audit report (fatal)
#[derive(Debug, Error)]
pub enum ReportWriteError {
    /// Previous report could not be removed
    #[error("Could not remove previous report {0}: {1}")]
    RemovePrevious(PathBuf, #[source] std::io::Error),

    /// Report could not be written
    #[error("Could not write report {0}: {1}")]
    Write(PathBuf, #[source] std::io::Error),

    /// Embedded summary could not be serialized
    #[error("Could not serialize report summary: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Run-level error
///
/// Catalog and report failures surface from their own stages; a pipeline
/// run can only fail while enumerating.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Media root could not be enumerated
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Result type for run-level operations
pub type MatchResult<T> = Result<T, MatchError>;
