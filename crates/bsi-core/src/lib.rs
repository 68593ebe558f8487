//! bsi-core: Core library for reconciling employee payroll exports
//!
//! This library provides functionality to:
//! - Load CSV and spreadsheet exports into raw tables
//! - Locate header columns by keyword instead of fixed position
//! - Register employees from the compensation ledger header
//! - Slice per-employee money columns and roll labels up into categories
//! - Match worked-days and HR description rows to employees by name
//! - Freeze everything into one record per employee

pub mod aggregate;
pub mod config;
pub mod dates;
pub mod days;
pub mod engine;
pub mod error;
pub mod header;
pub mod loader;
pub mod merger;
pub mod money;
pub mod normalize;
pub mod record;
pub mod registry;
pub mod scanner;
pub mod table;

pub use config::{CategoryDefinition, ColumnRule, DaysLayout, DescriptionLayout, LedgerLayout, Vocabulary};
pub use engine::{ReconcileInput, Reconciler, ReconcilerOptions};
pub use error::{Error, Result};
pub use header::{locate_ledger_columns, LedgerColumns};
pub use loader::{load_table, parse_csv_str};
pub use money::parse_amount;
pub use normalize::normalize;
pub use record::{Category, Description, MoneyPair, PersonRecord, Reconciliation, RunSummary, NO_DATA};
pub use registry::{MatchOutcome, MatchPolicy, PersonRegistry};
pub use scanner::discover_sources;
pub use table::Table;
