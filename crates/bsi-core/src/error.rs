//! Error types for bsi-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in bsi-core
///
/// Only fatal conditions live here. Per-row anomalies (a worked-days row that
/// matches nobody, an amount that does not parse) are absorbed where they
/// happen and surface as counters in the run summary.
#[derive(Debug, Error)]
pub enum Error {
    /// The path does not point at a readable file
    #[error("file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The spreadsheet could not be opened or has no readable sheet
    #[error("unreadable spreadsheet '{path}': {message}")]
    UnreadableFormat { path: PathBuf, message: String },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required header keyword never appeared in the compensation ledger
    #[error("header anchor '{anchor}' not found in '{path}'")]
    MissingHeaderAnchor { anchor: String, path: PathBuf },

    /// The compensation ledger produced no employees
    #[error("no employees detected in the provided files")]
    EmptySource,

    /// The description collection was empty
    #[error("no employee description file was provided")]
    NoDescriptionSources,

    /// Vocabulary file could not be parsed
    #[error("invalid vocabulary '{path}': {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
