//! Category aggregation
//!
//! Totals are always rebuilt from the raw label entries, never incremented,
//! so running the aggregation again over the same entries gives the same
//! result.

use crate::config::Vocabulary;
use crate::normalize::normalize;
use crate::record::{Category, MoneyPair, PersonRecord};
use std::collections::{HashMap, HashSet};

/// Normalized alias sets per category
#[derive(Debug, Clone)]
pub struct CategoryIndex {
    aliases: HashMap<Category, HashSet<String>>,
}

impl CategoryIndex {
    pub fn new(vocabulary: &Vocabulary) -> Self {
        let mut aliases: HashMap<Category, HashSet<String>> = HashMap::new();
        for definition in &vocabulary.categories {
            aliases
                .entry(definition.category)
                .or_default()
                .extend(definition.aliases.iter().map(|a| normalize(a)));
        }
        Self { aliases }
    }

    /// Whether a raw label rolls up into the category
    pub fn contains(&self, category: Category, label: &str) -> bool {
        self.aliases
            .get(&category)
            .is_some_and(|set| set.contains(&normalize(label)))
    }

    /// Sum of the entries belonging to one category, each rounded to the cent
    pub fn total(&self, category: Category, record: &PersonRecord) -> MoneyPair {
        let mut total = MoneyPair::default();
        for (label, pair) in &record.monetary_entries {
            if self.contains(category, label) {
                total += pair.rounded();
            }
        }
        total.rounded()
    }
}

/// Recompute every category total of a record
pub fn aggregate_categories(record: &mut PersonRecord, index: &CategoryIndex) {
    let totals = Category::ALL
        .iter()
        .map(|category| (*category, index.total(*category, record)))
        .collect();
    record.category_totals = totals;
}
