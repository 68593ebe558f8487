//! Keyword-based header discovery
//!
//! None of the sources keep their columns in a stable position, so every
//! extractor starts by searching the leading rows for known header words.

use crate::config::{ColumnRule, LedgerLayout};
use crate::error::{Error, Result};
use crate::normalize::{contains_words, normalize};
use crate::table::Table;
use tracing::debug;

/// Column positions in the compensation ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerColumns {
    pub code: usize,
    pub label: usize,
    pub value_start: usize,
}

/// Find the first column whose normalized text contains each anchor.
///
/// Cells are scanned row by row, left to right, and the scan stops as soon
/// as every anchor has a position. A missing anchor is fatal.
pub fn locate_anchors(table: &Table, anchors: &[&str]) -> Result<Vec<usize>> {
    let needles: Vec<String> = anchors.iter().map(|a| normalize(a)).collect();
    let mut found: Vec<Option<usize>> = vec![None; anchors.len()];

    'rows: for row in &table.rows {
        for (col, cell) in row.iter().enumerate() {
            let text = normalize(cell);
            if text.is_empty() {
                continue;
            }
            for (slot, needle) in found.iter_mut().zip(&needles) {
                if slot.is_none() && !needle.is_empty() && text.contains(needle.as_str()) {
                    *slot = Some(col);
                }
            }
            if found.iter().all(Option::is_some) {
                break 'rows;
            }
        }
    }

    found
        .into_iter()
        .zip(anchors)
        .map(|(slot, anchor)| {
            slot.ok_or_else(|| Error::MissingHeaderAnchor {
                anchor: anchor.to_string(),
                path: table.source_path.clone(),
            })
        })
        .collect()
}

/// Locate the code, label and value-block columns of the compensation ledger
pub fn locate_ledger_columns(table: &Table, layout: &LedgerLayout) -> Result<LedgerColumns> {
    let found = locate_anchors(
        table,
        &[
            layout.code_anchor.as_str(),
            layout.label_anchor.as_str(),
            layout.value_start_anchor.as_str(),
        ],
    )?;

    let columns = LedgerColumns {
        code: found[0],
        label: found[1],
        value_start: found[2],
    };
    debug!(?columns, path = %table.source_path.display(), "located ledger anchors");
    Ok(columns)
}

/// Result of a best-effort column search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedColumns {
    /// Row holding the headers, if one was recognized
    pub header_row: Option<usize>,
    /// One entry per rule, in rule order
    pub columns: Vec<Option<usize>>,
}

impl LocatedColumns {
    /// First row holding data
    pub fn data_start(&self) -> usize {
        self.header_row.map_or(0, |row| row + 1)
    }

    pub fn get(&self, index: usize) -> Option<usize> {
        self.columns.get(index).copied().flatten()
    }
}

/// Resolve each rule against a single header row.
///
/// The header row is the first of the leading `scan_rows` rows in which every
/// one of the first `required` rules finds a keyword. All rules are then
/// resolved within that row only: keywords are tried in order and the first
/// cell containing the keyword as whole words wins. Rules with no hit fall
/// back to their fixed position unless a hit already claimed that column.
/// Without a header row every rule uses its fallback and data starts at the
/// top. Word matching keeps "Nom" from hitting "Prénom".
pub fn locate_columns(
    table: &Table,
    scan_rows: usize,
    rules: &[&ColumnRule],
    required: usize,
) -> LocatedColumns {
    let required = &rules[..required.min(rules.len())];

    let header = table
        .rows
        .iter()
        .take(scan_rows)
        .enumerate()
        .map(|(row_idx, row)| (row_idx, row.iter().map(|c| normalize(c)).collect::<Vec<_>>()))
        .find(|(_, cells)| {
            required
                .iter()
                .all(|rule| find_keyword(cells, &rule.keywords).is_some())
        });

    let (header_row, hits): (Option<usize>, Vec<Option<usize>>) = match &header {
        Some((row_idx, cells)) => (
            Some(*row_idx),
            rules
                .iter()
                .map(|rule| find_keyword(cells, &rule.keywords))
                .collect(),
        ),
        None => (None, vec![None; rules.len()]),
    };

    let claimed: Vec<usize> = hits.iter().flatten().copied().collect();
    let columns = rules
        .iter()
        .zip(&hits)
        .map(|(rule, hit)| match hit {
            Some(col) => Some(*col),
            None => rule.fallback.filter(|col| !claimed.contains(col)),
        })
        .collect();

    LocatedColumns {
        header_row,
        columns,
    }
}

/// Column of the first cell matching the earliest keyword that matches at all
fn find_keyword(cells: &[String], keywords: &[String]) -> Option<usize> {
    keywords.iter().find_map(|keyword| {
        let needle = normalize(keyword);
        cells.iter().position(|cell| contains_words(cell, &needle))
    })
}
