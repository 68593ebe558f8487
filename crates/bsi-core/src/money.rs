//! Compensation ledger extraction
//!
//! Each data row carries one label and, for every employee in header order,
//! a group of three cells: base, employee share, employer share.

use crate::config::Vocabulary;
use crate::header::LedgerColumns;
use crate::normalize::normalize;
use crate::record::{MoneyPair, PersonRecord};
use crate::registry::PersonRegistry;
use crate::table::{cell_at, Table};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Cells per employee in a ledger row
pub const GROUP_WIDTH: usize = 3;

/// Parse a French-formatted amount.
///
/// Spaces (including non-breaking ones) are thousands separators and a comma
/// is the decimal separator; when a comma is present, dots are treated as
/// thousands separators too. Anything unparsable is zero.
pub fn parse_amount(raw: &str) -> f64 {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€')
        .collect();

    if cleaned.contains(',') {
        cleaned = cleaned.replace('.', "").replace(',', ".");
    }

    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Lookup from normalized label to the configured label it stands for
#[derive(Debug, Clone)]
pub struct LabelIndex {
    labels: HashMap<String, String>,
    triggers: HashSet<String>,
}

impl LabelIndex {
    pub fn new(vocabulary: &Vocabulary) -> Self {
        let mut labels = HashMap::new();
        for label in vocabulary.tracked_labels() {
            labels
                .entry(normalize(label))
                .or_insert_with(|| label.to_string());
        }

        let triggers = vocabulary
            .forfait_jours_triggers
            .iter()
            .map(|t| normalize(t))
            .collect();

        Self { labels, triggers }
    }

    /// Configured label matching a raw ledger label, if tracked
    pub fn resolve(&self, raw_label: &str) -> Option<&str> {
        self.labels.get(&normalize(raw_label)).map(String::as_str)
    }

    pub fn is_trigger(&self, raw_label: &str) -> bool {
        self.triggers.contains(&normalize(raw_label))
    }

    /// Configured labels, one per normalized form
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.values().map(String::as_str)
    }
}

/// Walk the ledger and accumulate tracked amounts into `records`.
///
/// `records` is indexed like `registry.persons()`. Returns the number of rows
/// whose label was tracked.
pub fn extract_money(
    table: &Table,
    columns: &LedgerColumns,
    registry: &PersonRegistry,
    records: &mut [PersonRecord],
    index: &LabelIndex,
) -> usize {
    let mut rows_applied = 0;

    for row in &table.rows {
        if row.len() <= columns.label {
            continue;
        }

        let raw_label = row[columns.label].trim();
        let tracked = index.resolve(raw_label);
        let trigger = index.is_trigger(raw_label);
        if tracked.is_none() && !trigger {
            continue;
        }

        for (group, &person) in registry.groups().iter().enumerate() {
            let offset = columns.value_start + group * GROUP_WIDTH;
            let base = cell_at(row, offset);
            let salarial = cell_at(row, offset + 1);
            let patronal = cell_at(row, offset + 2);

            let Some(record) = records.get_mut(person) else {
                continue;
            };

            if trigger && [base, salarial, patronal].iter().any(|c| !c.trim().is_empty()) {
                record.forfait_jours = true;
            }

            if let Some(label) = tracked {
                *record
                    .monetary_entries
                    .entry(label.to_string())
                    .or_default() += MoneyPair::new(parse_amount(salarial), parse_amount(patronal));
            }
        }

        if tracked.is_some() {
            rows_applied += 1;
            debug!(label = raw_label, "applied ledger row");
        }
    }

    rows_applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NO_DATA;

    fn setup(names: &[&str]) -> (PersonRegistry, Vec<PersonRecord>, LabelIndex) {
        let vocabulary = Vocabulary::default();
        let index = LabelIndex::new(&vocabulary);
        let mut registry = PersonRegistry::default();
        let mut records = Vec::new();
        for name in names {
            registry.register(normalize(name), name.to_string());
            records.push(PersonRecord::new(
                normalize(name),
                name.to_string(),
                index.labels(),
                NO_DATA,
            ));
        }
        (registry, records, index)
    }

    const COLUMNS: LedgerColumns = LedgerColumns {
        code: 0,
        label: 1,
        value_start: 2,
    };

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1 234,56"), 1234.56);
        assert_eq!(parse_amount("1\u{a0}234,56"), 1234.56);
        assert_eq!(parse_amount("1\u{202f}234,56"), 1234.56);
        assert_eq!(parse_amount("1.234,5"), 1234.5);
        assert_eq!(parse_amount("1234.56"), 1234.56);
        assert_eq!(parse_amount("-12,30"), -12.3);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("n/a"), 0.0);
    }

    #[test]
    fn test_label_index_normalizes() {
        let index = LabelIndex::new(&Vocabulary::default());
        assert_eq!(index.resolve("  salaire DE base "), Some("Salaire de base"));
        assert_eq!(index.resolve("Assurance chomage TrA+TrB"), Some("Assurance chômage TrA+TrB"));
        assert_eq!(index.resolve("Unknown"), None);
        assert!(index.is_trigger("RTT pris (j)"));
        assert!(index.is_trigger("rtt PRIS j"));
    }

    #[test]
    fn test_values_follow_person_groups() {
        let (registry, mut records, index) = setup(&["Jean Dupont", "Marie Curie"]);
        let table = Table::from_rows(
            "money.csv",
            vec![vec![
                "100", "Salaire de base", "1000", "1000", "1000", "2000", "2000", "2000",
            ]],
        );

        let applied = extract_money(&table, &COLUMNS, &registry, &mut records, &index);

        assert_eq!(applied, 1);
        assert_eq!(records[0].entry("Salaire de base").unwrap().salarial, 1000.0);
        assert_eq!(records[1].entry("Salaire de base").unwrap().salarial, 2000.0);
        assert_eq!(records[1].entry("Salaire de base").unwrap().patronal, 2000.0);
    }

    #[test]
    fn test_repeated_label_accumulates() {
        let (registry, mut records, index) = setup(&["Jean Dupont"]);
        let table = Table::from_rows(
            "money.csv",
            vec![
                vec!["", "AGS", "", "1,50", "2,00"],
                vec!["", "AGS", "", "0,50", "1 000,00"],
            ],
        );

        extract_money(&table, &COLUMNS, &registry, &mut records, &index);

        assert_eq!(records[0].entry("AGS"), Some(&MoneyPair::new(2.0, 1002.0)));
    }

    #[test]
    fn test_forfait_jours_only_for_filled_groups() {
        let (registry, mut records, index) = setup(&["Jean Dupont", "Marie Curie"]);
        let table = Table::from_rows(
            "money.csv",
            vec![vec!["", "RTT pris (j)", "5", "", "", "", " ", ""]],
        );

        let applied = extract_money(&table, &COLUMNS, &registry, &mut records, &index);

        assert_eq!(applied, 0);
        assert!(records[0].forfait_jours);
        assert!(!records[1].forfait_jours);
    }

    #[test]
    fn test_unknown_label_and_short_rows_ignored() {
        let (registry, mut records, index) = setup(&["Jean Dupont"]);
        let table = Table::from_rows(
            "money.csv",
            vec![vec!["", "Prime exceptionnelle", "", "50", "50"], vec!["x"]],
        );

        let applied = extract_money(&table, &COLUMNS, &registry, &mut records, &index);

        assert_eq!(applied, 0);
        assert!(records[0].monetary_entries.values().all(MoneyPair::is_zero));
    }

    #[test]
    fn test_row_shorter_than_groups() {
        let (registry, mut records, index) = setup(&["Jean Dupont", "Marie Curie"]);
        let table = Table::from_rows(
            "money.csv",
            vec![vec!["", "Salaire Brut", "", "3000", "0"]],
        );

        extract_money(&table, &COLUMNS, &registry, &mut records, &index);

        assert_eq!(records[0].entry("Salaire Brut").unwrap().salarial, 3000.0);
        assert!(records[1].entry("Salaire Brut").unwrap().is_zero());
    }
}
