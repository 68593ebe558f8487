//! Per-employee record types and the frozen reconciliation snapshot

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;
use std::path::PathBuf;

/// Default placeholder for description fields no source has filled
pub const NO_DATA: &str = "no data";

/// Semantic contribution groups that raw payroll labels roll up into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Retirement,
    Health,
    Unemployment,
    ProvidentInsurance,
    SupplementaryHealth,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Retirement,
        Category::Health,
        Category::Unemployment,
        Category::ProvidentInsurance,
        Category::SupplementaryHealth,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Retirement => "retirement",
            Category::Health => "health",
            Category::Unemployment => "unemployment",
            Category::ProvidentInsurance => "provident_insurance",
            Category::SupplementaryHealth => "supplementary_health",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Employee-side / employer-side amounts for one payroll line
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoneyPair {
    pub salarial: f64,
    pub patronal: f64,
}

impl MoneyPair {
    pub fn new(salarial: f64, patronal: f64) -> Self {
        Self { salarial, patronal }
    }

    /// Both sides rounded to the cent
    pub fn rounded(&self) -> Self {
        Self {
            salarial: round_cents(self.salarial),
            patronal: round_cents(self.patronal),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.salarial == 0.0 && self.patronal == 0.0
    }
}

impl AddAssign for MoneyPair {
    fn add_assign(&mut self, other: Self) {
        self.salarial += other.salarial;
        self.patronal += other.patronal;
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The four HR description fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionField {
    JobTitle,
    Seniority,
    ArrivalDate,
    ContractType,
}

impl DescriptionField {
    pub const ALL: [DescriptionField; 4] = [
        DescriptionField::JobTitle,
        DescriptionField::Seniority,
        DescriptionField::ArrivalDate,
        DescriptionField::ContractType,
    ];
}

/// HR description of an employee. Every field starts as the "no data"
/// placeholder and is written at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    pub job_title: String,
    pub seniority: String,
    pub arrival_date: String,
    pub contract_type: String,
}

impl Description {
    /// All fields set to the given placeholder
    pub fn placeholder(no_data: &str) -> Self {
        Self {
            job_title: no_data.to_string(),
            seniority: no_data.to_string(),
            arrival_date: no_data.to_string(),
            contract_type: no_data.to_string(),
        }
    }

    pub fn get(&self, field: DescriptionField) -> &str {
        match field {
            DescriptionField::JobTitle => &self.job_title,
            DescriptionField::Seniority => &self.seniority,
            DescriptionField::ArrivalDate => &self.arrival_date,
            DescriptionField::ContractType => &self.contract_type,
        }
    }

    pub fn get_mut(&mut self, field: DescriptionField) -> &mut String {
        match field {
            DescriptionField::JobTitle => &mut self.job_title,
            DescriptionField::Seniority => &mut self.seniority,
            DescriptionField::ArrivalDate => &mut self.arrival_date,
            DescriptionField::ContractType => &mut self.contract_type,
        }
    }
}

impl Default for Description {
    fn default() -> Self {
        Self::placeholder(NO_DATA)
    }
}

/// One reconciled employee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRecord {
    /// Normalized name, unique within a run
    pub canonical_key: String,
    /// Name exactly as written in the compensation ledger header
    pub official_name: String,
    /// Whether the employee is on a fixed-days scheme
    pub forfait_jours: bool,
    /// Raw payroll label -> accumulated amounts
    pub monetary_entries: BTreeMap<String, MoneyPair>,
    /// Category totals, recomputed from `monetary_entries`
    pub category_totals: BTreeMap<Category, MoneyPair>,
    pub description: Description,
    /// Sum of every matching worked-days row, `None` if no row matched
    pub worked_days: Option<f64>,
}

impl PersonRecord {
    /// A fresh record with every known label seeded at zero
    pub fn new<'a>(
        canonical_key: String,
        official_name: String,
        labels: impl IntoIterator<Item = &'a str>,
        no_data: &str,
    ) -> Self {
        Self {
            canonical_key,
            official_name,
            forfait_jours: false,
            monetary_entries: labels
                .into_iter()
                .map(|label| (label.to_string(), MoneyPair::default()))
                .collect(),
            category_totals: Category::ALL
                .iter()
                .map(|c| (*c, MoneyPair::default()))
                .collect(),
            description: Description::placeholder(no_data),
            worked_days: None,
        }
    }

    /// Amounts recorded for a raw label
    pub fn entry(&self, label: &str) -> Option<&MoneyPair> {
        self.monetary_entries.get(label)
    }

    /// Total for a category (zero if never aggregated)
    pub fn category_total(&self, category: Category) -> MoneyPair {
        self.category_totals
            .get(&category)
            .copied()
            .unwrap_or_default()
    }
}

/// Counters describing what a run absorbed without failing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub persons_registered: usize,
    pub forfait_jours_count: usize,
    pub money_rows_applied: usize,
    pub days_rows_matched: usize,
    pub days_rows_unmatched: usize,
    pub description_rows_matched: usize,
    pub description_rows_unmatched: usize,
    pub ambiguous_rows: usize,
    /// Files read, in processing order
    pub sources: Vec<PathBuf>,
}

/// Frozen result of one reconciliation run, in ledger order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reconciliation {
    pub records: Vec<PersonRecord>,
    pub summary: RunSummary,
}

impl Reconciliation {
    /// Get the number of employees
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the compensation ledger yielded nobody
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find a record by canonical key
    pub fn get(&self, canonical_key: &str) -> Option<&PersonRecord> {
        self.records
            .iter()
            .find(|r| r.canonical_key == canonical_key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PersonRecord> {
        self.records.iter()
    }

    /// Canonical keys in ledger order
    pub fn keys(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.canonical_key.as_str())
            .collect()
    }

    /// Key -> record view
    pub fn as_map(&self) -> BTreeMap<&str, &PersonRecord> {
        self.records
            .iter()
            .map(|r| (r.canonical_key.as_str(), r))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_pair_add_and_round() {
        let mut pair = MoneyPair::new(1.004, 2.0);
        pair += MoneyPair::new(0.1, 0.2);
        assert_eq!(pair.rounded(), MoneyPair::new(1.1, 2.2));
        assert!(MoneyPair::default().is_zero());
    }

    #[test]
    fn test_new_record_is_seeded() {
        let record = PersonRecord::new(
            "JEAN DUPONT".to_string(),
            "Jean Dupont".to_string(),
            ["Salaire de base", "AGS"],
            NO_DATA,
        );

        assert_eq!(record.entry("AGS"), Some(&MoneyPair::default()));
        assert_eq!(record.category_totals.len(), 5);
        assert_eq!(record.description.get(DescriptionField::JobTitle), NO_DATA);
        assert!(!record.forfait_jours);
        assert_eq!(record.worked_days, None);
    }

    #[test]
    fn test_description_get_mut() {
        let mut description = Description::default();
        *description.get_mut(DescriptionField::ContractType) = "CDI".to_string();
        assert_eq!(description.contract_type, "CDI");
        assert_eq!(description.get(DescriptionField::Seniority), NO_DATA);
    }

    #[test]
    fn test_reconciliation_lookup() {
        let record = PersonRecord::new("A".into(), "a".into(), std::iter::empty::<&str>(), NO_DATA);
        let reconciliation = Reconciliation {
            records: vec![record],
            summary: RunSummary::default(),
        };

        assert_eq!(reconciliation.len(), 1);
        assert!(reconciliation.get("A").is_some());
        assert!(reconciliation.get("B").is_none());
        assert_eq!(reconciliation.keys(), vec!["A"]);
        assert!(reconciliation.as_map().contains_key("A"));
    }

    #[test]
    fn test_category_serializes_as_map_key() {
        let record = PersonRecord::new("A".into(), "a".into(), std::iter::empty::<&str>(), NO_DATA);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["category_totals"]["provident_insurance"].is_object());
    }
}
