//! Worked-days extraction

use crate::config::DaysLayout;
use crate::header::locate_columns;
use crate::money::parse_amount;
use crate::record::PersonRecord;
use crate::registry::{MatchOutcome, MatchPolicy, PersonRegistry};
use crate::table::{cell_at, Table};
use tracing::{debug, warn};

/// Row counts from one pass over a secondary source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub matched: usize,
    pub unmatched: usize,
    pub ambiguous: usize,
}

impl MatchStats {
    pub(crate) fn record(&mut self, outcome: &MatchOutcome) {
        match outcome {
            MatchOutcome::Matched(_) => self.matched += 1,
            MatchOutcome::Unmatched => self.unmatched += 1,
            MatchOutcome::Ambiguous(_) => self.ambiguous += 1,
        }
    }
}

/// Add worked days from every matching row to the person's running total.
///
/// Rows that match nobody are skipped; a person can receive several rows.
pub fn extract_days(
    table: &Table,
    layout: &DaysLayout,
    registry: &PersonRegistry,
    records: &mut [PersonRecord],
    policy: MatchPolicy,
) -> MatchStats {
    let mut stats = MatchStats::default();

    let located = locate_columns(
        table,
        layout.scan_rows,
        &[&layout.surname, &layout.given_name, &layout.worked_days],
        2,
    );
    let (surname_col, given_col, days_col) = match (located.get(0), located.get(1), located.get(2)) {
        (Some(s), Some(g), Some(d)) => (s, g, d),
        _ => {
            warn!(
                path = %table.source_path.display(),
                "worked-days columns not found, skipping source"
            );
            return stats;
        }
    };

    for (row_idx, row) in table.rows.iter().enumerate().skip(located.data_start()) {
        let surname = cell_at(row, surname_col);
        let given_name = cell_at(row, given_col);
        if surname.trim().is_empty() || given_name.trim().is_empty() {
            continue;
        }

        let outcome = registry.find(surname, given_name, policy);
        stats.record(&outcome);

        match outcome {
            MatchOutcome::Matched(person) => {
                if let Some(record) = records.get_mut(person) {
                    let days = parse_amount(cell_at(row, days_col));
                    record.worked_days = Some(record.worked_days.unwrap_or(0.0) + days);
                }
            }
            MatchOutcome::Unmatched => {
                debug!(row = row_idx, surname, given_name, "worked-days row matches nobody");
            }
            MatchOutcome::Ambiguous(candidates) => {
                debug!(row = row_idx, surname, given_name, ?candidates, "ambiguous worked-days row");
            }
        }
    }

    stats
}
