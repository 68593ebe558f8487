//! Merge HR description exports into person records
//!
//! Several description files may describe the same employee. Files are merged
//! in the order given and a field keeps the first real value it receives, so
//! the earliest file that knows a value is authoritative for it.

use crate::config::DescriptionLayout;
use crate::days::MatchStats;
use crate::header::locate_columns;
use crate::record::{DescriptionField, PersonRecord};
use crate::registry::{MatchOutcome, MatchPolicy, PersonRegistry};
use crate::table::{cell_at, Table};
use tracing::{debug, warn};

/// Column positions of one description file
#[derive(Debug, Clone, PartialEq, Eq)]
struct DescriptionColumns {
    surname: usize,
    given_name: usize,
    fields: Vec<(DescriptionField, usize)>,
    data_start: usize,
}

fn locate_description_columns(table: &Table, layout: &DescriptionLayout) -> Option<DescriptionColumns> {
    let located = locate_columns(
        table,
        layout.scan_rows,
        &[
            &layout.surname,
            &layout.given_name,
            &layout.job_title,
            &layout.seniority,
            &layout.arrival_date,
            &layout.contract_type,
        ],
        2,
    );

    let fields = DescriptionField::ALL
        .iter()
        .enumerate()
        .filter_map(|(i, field)| located.get(i + 2).map(|col| (*field, col)))
        .collect();

    Some(DescriptionColumns {
        surname: located.get(0)?,
        given_name: located.get(1)?,
        fields,
        data_start: located.data_start(),
    })
}

/// Fill still-empty description fields of matched persons from one file
pub fn merge_description(
    table: &Table,
    layout: &DescriptionLayout,
    registry: &PersonRegistry,
    records: &mut [PersonRecord],
    policy: MatchPolicy,
    no_data: &str,
) -> MatchStats {
    let mut stats = MatchStats::default();

    let Some(columns) = locate_description_columns(table, layout) else {
        warn!(
            path = %table.source_path.display(),
            "name columns not found in description file, skipping"
        );
        return stats;
    };

    for (row_idx, row) in table.rows.iter().enumerate().skip(columns.data_start) {
        let surname = cell_at(row, columns.surname);
        let given_name = cell_at(row, columns.given_name);
        if surname.trim().is_empty() || given_name.trim().is_empty() {
            continue;
        }

        let outcome = registry.find(surname, given_name, policy);
        stats.record(&outcome);

        let person = match outcome {
            MatchOutcome::Matched(person) => person,
            MatchOutcome::Unmatched => {
                debug!(row = row_idx, surname, given_name, "description row matches nobody");
                continue;
            }
            MatchOutcome::Ambiguous(candidates) => {
                debug!(row = row_idx, surname, given_name, ?candidates, "ambiguous description row");
                continue;
            }
        };

        let Some(record) = records.get_mut(person) else {
            continue;
        };

        for (field, col) in &columns.fields {
            let value = cell_at(row, *col).trim();
            if value.is_empty() || value == no_data {
                continue;
            }
            let slot = record.description.get_mut(*field);
            if *slot == no_data {
                *slot = value.to_string();
            }
        }
    }

    stats
}
