//! Vocabulary configuration
//!
//! Everything that tends to drift between payroll export versions lives here
//! as data: label lists, category aliases, header keywords and fallback
//! column positions. The built-in defaults match the French payroll exports
//! the tool was written for; a TOML file can override any part of it.

use crate::error::{Error, Result};
use crate::record::{Category, NO_DATA};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Placeholder for description fields nobody supplied
    pub no_data: String,
    /// Numeric seniority/arrival values above this are treated as date serials
    pub date_serial_threshold: f64,
    /// Labels kept as-is on the record without belonging to a category
    pub money_labels: Vec<String>,
    /// Labels whose presence marks a fixed-days employee
    pub forfait_jours_triggers: Vec<String>,
    pub ledger: LedgerLayout,
    pub days: DaysLayout,
    pub description: DescriptionLayout,
    pub categories: Vec<CategoryDefinition>,
}

/// Layout of the compensation ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerLayout {
    /// Zero-based row holding one cell per employee
    pub person_header_row: usize,
    /// Header cell that closes the employee list
    pub total_marker: String,
    pub code_anchor: String,
    pub label_anchor: String,
    /// First cell of the repeating (base, employee, employer) group
    pub value_start_anchor: String,
}

/// How to find one column: keywords first, then a fixed position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRule {
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<usize>,
}

impl ColumnRule {
    pub fn new(keywords: &[&str], fallback: usize) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            fallback: Some(fallback),
        }
    }
}

/// Layout of the worked-days ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaysLayout {
    /// Leading rows searched for header keywords
    pub scan_rows: usize,
    pub surname: ColumnRule,
    pub given_name: ColumnRule,
    pub worked_days: ColumnRule,
}

/// Layout of an HR description export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptionLayout {
    pub scan_rows: usize,
    pub surname: ColumnRule,
    pub given_name: ColumnRule,
    pub job_title: ColumnRule,
    pub seniority: ColumnRule,
    pub arrival_date: ColumnRule,
    pub contract_type: ColumnRule,
}

/// A category and the raw labels that roll up into it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub category: Category,
    pub aliases: Vec<String>,
}

impl CategoryDefinition {
    pub fn new(category: Category, aliases: &[&str]) -> Self {
        Self {
            category,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            no_data: NO_DATA.to_string(),
            date_serial_threshold: 10_000.0,
            money_labels: [
                "Salaire de base",
                "Salaire Brut",
                "Sous-total Primes",
                "INTERESSEMENT",
                "Net imposable",
                "Acomptes",
                "Frais de transport personnel non soumis",
                "Heures mensuelles majorées",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            forfait_jours_triggers: ["RTT pris (j)", "RTT acquis (j)", "RTT et autres repos"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ledger: LedgerLayout::default(),
            days: DaysLayout::default(),
            description: DescriptionLayout::default(),
            categories: vec![
                CategoryDefinition::new(
                    Category::Retirement,
                    &[
                        "Vieillesse déplafonnée",
                        "Vieillesse plafonnée",
                        "Retraite TU1",
                        "Contribution d'Equilibre Général TU1",
                        "Réduct. générale des cotisat. pat. retraite",
                    ],
                ),
                CategoryDefinition::new(
                    Category::Health,
                    &["Maladie - maternité - invalidité - décès"],
                ),
                CategoryDefinition::new(
                    Category::Unemployment,
                    &["Assurance chômage TrA+TrB", "AGS"],
                ),
                CategoryDefinition::new(
                    Category::ProvidentInsurance,
                    &["Prévoyance supplémentaire non cadre TrA"],
                ),
                CategoryDefinition::new(Category::SupplementaryHealth, &["Frais de santé"]),
            ],
        }
    }
}

impl Default for LedgerLayout {
    fn default() -> Self {
        Self {
            person_header_row: 2,
            total_marker: "TOTAL".to_string(),
            code_anchor: "Code".to_string(),
            label_anchor: "Libellé".to_string(),
            value_start_anchor: "Base S.".to_string(),
        }
    }
}

impl Default for DaysLayout {
    fn default() -> Self {
        Self {
            scan_rows: 5,
            surname: ColumnRule::new(&["Nom"], 2),
            given_name: ColumnRule::new(&["Prénom"], 3),
            worked_days: ColumnRule::new(
                &["Jours travaillés", "Nb jours", "Nombre de jours", "Jours"],
                6,
            ),
        }
    }
}

impl Default for DescriptionLayout {
    fn default() -> Self {
        Self {
            scan_rows: 5,
            surname: ColumnRule::new(&["Nom"], 0),
            given_name: ColumnRule::new(&["Prénom"], 1),
            job_title: ColumnRule::new(&["Poste", "Emploi", "Fonction", "Intitulé"], 2),
            seniority: ColumnRule::new(&["Ancienneté"], 3),
            arrival_date: ColumnRule::new(
                &[
                    "Date d'arrivée",
                    "Date d'entrée",
                    "Date d'embauche",
                    "Arrivée",
                    "Embauche",
                    "Entrée",
                ],
                4,
            ),
            contract_type: ColumnRule::new(&["Type de contrat", "Contrat"], 5),
        }
    }
}

impl Vocabulary {
    /// Parse a TOML vocabulary; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse {
            path: "<inline>".into(),
            message: e.to_string(),
        })
    }

    /// Load a vocabulary from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Render as TOML, e.g. to seed a custom vocabulary file
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::ConfigParse {
            path: "<inline>".into(),
            message: e.to_string(),
        })
    }

    /// Every label a record tracks: standalone labels, then category aliases
    pub fn tracked_labels(&self) -> impl Iterator<Item = &str> {
        self.money_labels
            .iter()
            .chain(self.categories.iter().flat_map(|c| c.aliases.iter()))
            .map(String::as_str)
    }

    /// Aliases configured for a category (all definitions combined)
    pub fn aliases_for(&self, category: Category) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .filter(move |c| c.category == category)
            .flat_map(|c| c.aliases.iter())
            .map(String::as_str)
    }
}
