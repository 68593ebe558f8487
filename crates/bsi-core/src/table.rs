//! Raw table type shared by every source kind

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A loaded table: rows of string cells exactly as they appear on disk.
///
/// No header row is assumed. Sources put their headers on different rows and
/// the extractors locate them by keyword.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    /// Row data, in file order
    pub rows: Vec<Vec<String>>,
    /// Source file path
    pub source_path: PathBuf,
}

impl Table {
    /// Create a new empty table
    pub fn new(source_path: PathBuf) -> Self {
        Self {
            rows: Vec::new(),
            source_path,
        }
    }

    /// Build a table from in-memory rows
    pub fn from_rows<R, C>(source_path: impl Into<PathBuf>, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
            source_path: source_path.into(),
        }
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a row by index
    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Get a cell, treating anything past the end of a short row as empty
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Cell lookup on a single row, treating missing trailing cells as empty
pub fn cell_at(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}
