//! Reconciliation pipeline
//!
//! A run is strictly linear: load the compensation ledger, build the person
//! registry, extract money, extract worked days, merge each description file
//! in input order, aggregate categories, convert date serials, then freeze
//! the records into a [`Reconciliation`]. All mutable state belongs to the run.

use crate::aggregate::{aggregate_categories, CategoryIndex};
use crate::config::Vocabulary;
use crate::dates::convert_record_dates;
use crate::days::extract_days;
use crate::error::{Error, Result};
use crate::header::locate_ledger_columns;
use crate::loader::load_table;
use crate::merger::merge_description;
use crate::money::{extract_money, LabelIndex};
use crate::record::{PersonRecord, Reconciliation, RunSummary};
use crate::registry::{MatchPolicy, PersonRegistry};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Paths of one run's input files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileInput {
    pub compensation: PathBuf,
    pub worked_days: PathBuf,
    /// Merged in this order; the first file to supply a field wins
    pub descriptions: Vec<PathBuf>,
}

/// Behavior switches that are not vocabulary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerOptions {
    pub match_policy: MatchPolicy,
}

/// Runs the pipeline with a fixed vocabulary and options
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    vocabulary: Vocabulary,
    options: ReconcilerOptions,
}

impl Reconciler {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self::with_options(vocabulary, ReconcilerOptions::default())
    }

    pub fn with_options(vocabulary: Vocabulary, options: ReconcilerOptions) -> Self {
        Self {
            vocabulary,
            options,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn options(&self) -> ReconcilerOptions {
        self.options
    }

    /// Load every input file and reconcile them.
    ///
    /// An empty description collection is rejected before anything is read.
    /// A ledger without rows or persons yields an empty snapshot, not an error.
    pub fn reconcile(&self, input: &ReconcileInput) -> Result<Reconciliation> {
        if input.descriptions.is_empty() {
            return Err(Error::NoDescriptionSources);
        }

        let compensation = load_table(&input.compensation)?;
        let worked_days = load_table(&input.worked_days)?;
        let descriptions = input
            .descriptions
            .iter()
            .map(load_table)
            .collect::<Result<Vec<_>>>()?;

        self.reconcile_tables(&compensation, &worked_days, &descriptions)
    }

    /// Reconcile already-loaded tables
    pub fn reconcile_tables(
        &self,
        compensation: &Table,
        worked_days: &Table,
        descriptions: &[Table],
    ) -> Result<Reconciliation> {
        let mut summary = RunSummary {
            sources: std::iter::once(compensation)
                .chain(std::iter::once(worked_days))
                .chain(descriptions)
                .map(|t| t.source_path.clone())
                .collect(),
            ..RunSummary::default()
        };

        if compensation.is_empty() {
            warn!(
                path = %compensation.source_path.display(),
                "compensation ledger has no rows"
            );
            return Ok(empty(summary));
        }

        let registry = PersonRegistry::from_ledger(compensation, &self.vocabulary.ledger);
        if registry.is_empty() {
            warn!(
                path = %compensation.source_path.display(),
                "no person found in compensation ledger header"
            );
            return Ok(empty(summary));
        }
        info!(persons = registry.len(), "registered persons");

        let columns = locate_ledger_columns(compensation, &self.vocabulary.ledger)?;

        let labels = LabelIndex::new(&self.vocabulary);
        let mut records: Vec<PersonRecord> = registry
            .persons()
            .iter()
            .map(|person| {
                PersonRecord::new(
                    person.canonical_key.clone(),
                    person.official_name.clone(),
                    labels.labels(),
                    &self.vocabulary.no_data,
                )
            })
            .collect();

        summary.money_rows_applied =
            extract_money(compensation, &columns, &registry, &mut records, &labels);
        info!(rows = summary.money_rows_applied, "extracted compensation");

        let policy = self.options.match_policy;
        let days = extract_days(
            worked_days,
            &self.vocabulary.days,
            &registry,
            &mut records,
            policy,
        );
        summary.days_rows_matched = days.matched;
        summary.days_rows_unmatched = days.unmatched;
        summary.ambiguous_rows += days.ambiguous;
        info!(
            matched = days.matched,
            unmatched = days.unmatched,
            ambiguous = days.ambiguous,
            "extracted worked days"
        );

        for table in descriptions {
            let stats = merge_description(
                table,
                &self.vocabulary.description,
                &registry,
                &mut records,
                policy,
                &self.vocabulary.no_data,
            );
            summary.description_rows_matched += stats.matched;
            summary.description_rows_unmatched += stats.unmatched;
            summary.ambiguous_rows += stats.ambiguous;
            info!(
                path = %table.source_path.display(),
                matched = stats.matched,
                unmatched = stats.unmatched,
                "merged description file"
            );
        }

        let categories = CategoryIndex::new(&self.vocabulary);
        for record in &mut records {
            aggregate_categories(record, &categories);
            convert_record_dates(record, self.vocabulary.date_serial_threshold);
        }

        summary.persons_registered = records.len();
        summary.forfait_jours_count = records.iter().filter(|r| r.forfait_jours).count();
        info!(
            persons = summary.persons_registered,
            forfait_jours = summary.forfait_jours_count,
            "reconciliation complete"
        );

        Ok(Reconciliation { records, summary })
    }
}

fn empty(summary: RunSummary) -> Reconciliation {
    Reconciliation {
        records: Vec::new(),
        summary,
    }
}
