//! Person registry built from the compensation ledger header
//!
//! The registry is the only place identities are created. The other sources
//! never share an identifier with the ledger, so their rows are attached to
//! registered persons by name matching.

use crate::config::LedgerLayout;
use crate::normalize::normalize;
use crate::table::Table;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A person as written in the ledger header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredPerson {
    pub canonical_key: String,
    pub official_name: String,
}

/// How rows from secondary sources are attached to registered persons
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// First registered person whose key contains the surname and the given
    /// name (or its initial). Two employees sharing a surname can be confused.
    #[default]
    Greedy,
    /// Exact full-name match first, then the greedy rule restricted to a
    /// single candidate. Anything else is reported as ambiguous.
    Strict,
}

/// Outcome of matching one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched(usize),
    Unmatched,
    /// Several persons fit; carries their registry indices
    Ambiguous(Vec<usize>),
}

/// Ordered set of persons plus the mapping from ledger column groups to them
#[derive(Debug, Clone, Default)]
pub struct PersonRegistry {
    persons: Vec<RegisteredPerson>,
    /// Column group n (n-th person cell in the header) -> index into `persons`
    groups: Vec<usize>,
}

impl PersonRegistry {
    /// Read the person header row of the compensation ledger.
    ///
    /// Every non-empty cell except the total marker is a person, in order.
    /// Two cells with the same canonical key share one person, and both
    /// column groups feed it.
    pub fn from_ledger(table: &Table, layout: &LedgerLayout) -> Self {
        let mut registry = Self::default();
        let total_marker = normalize(&layout.total_marker);

        let header = match table.row(layout.person_header_row) {
            Some(row) => row,
            None => return registry,
        };

        for cell in header {
            let canonical_key = normalize(cell);
            if canonical_key.is_empty() || canonical_key == total_marker {
                continue;
            }
            registry.register(canonical_key, cell.clone());
        }

        registry
    }

    /// Register a person, returning its index
    pub fn register(&mut self, canonical_key: String, official_name: String) -> usize {
        let index = match self.index_of(&canonical_key) {
            Some(existing) => {
                warn!(
                    key = %canonical_key,
                    name = %official_name,
                    "duplicate person in ledger header, merging column groups"
                );
                existing
            }
            None => {
                self.persons.push(RegisteredPerson {
                    canonical_key,
                    official_name,
                });
                self.persons.len() - 1
            }
        };
        self.groups.push(index);
        index
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    pub fn persons(&self) -> &[RegisteredPerson] {
        &self.persons
    }

    /// Person index for each ledger column group, in column order
    pub fn groups(&self) -> &[usize] {
        &self.groups
    }

    pub fn index_of(&self, canonical_key: &str) -> Option<usize> {
        self.persons
            .iter()
            .position(|p| p.canonical_key == canonical_key)
    }

    /// Match a (surname, given name) pair coming from another source
    pub fn find(&self, surname: &str, given_name: &str, policy: MatchPolicy) -> MatchOutcome {
        let surname = normalize(surname);
        let given_name = normalize(given_name);
        if surname.is_empty() || given_name.is_empty() {
            return MatchOutcome::Unmatched;
        }

        match policy {
            MatchPolicy::Greedy => self
                .persons
                .iter()
                .position(|p| loose_match(&p.canonical_key, &surname, &given_name))
                .map_or(MatchOutcome::Unmatched, MatchOutcome::Matched),
            MatchPolicy::Strict => self.find_strict(&surname, &given_name),
        }
    }

    fn find_strict(&self, surname: &str, given_name: &str) -> MatchOutcome {
        let full_name = format!("{surname} {given_name}");
        let wanted = sorted_tokens(&full_name);
        let exact: Vec<usize> = self
            .persons
            .iter()
            .enumerate()
            .filter(|(_, p)| sorted_tokens(&p.canonical_key) == wanted)
            .map(|(i, _)| i)
            .collect();
        if !exact.is_empty() {
            return single(exact);
        }

        let loose: Vec<usize> = self
            .persons
            .iter()
            .enumerate()
            .filter(|(_, p)| loose_match(&p.canonical_key, surname, given_name))
            .map(|(i, _)| i)
            .collect();
        single(loose)
    }
}

/// Key contains the surname, and either the given name or "SURNAME I".
fn loose_match(key: &str, surname: &str, given_name: &str) -> bool {
    if !key.contains(surname) {
        return false;
    }
    if key.contains(given_name) {
        return true;
    }
    match given_name.chars().next() {
        Some(initial) => key.contains(&format!("{surname} {initial}")),
        None => false,
    }
}

fn sorted_tokens(value: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = value.split(' ').filter(|t| !t.is_empty()).collect();
    tokens.sort_unstable();
    tokens
}

fn single(candidates: Vec<usize>) -> MatchOutcome {
    match candidates.len() {
        0 => MatchOutcome::Unmatched,
        1 => MatchOutcome::Matched(candidates[0]),
        _ => MatchOutcome::Ambiguous(candidates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(names: &[&str]) -> PersonRegistry {
        let mut registry = PersonRegistry::default();
        for name in names {
            registry.register(normalize(name), name.to_string());
        }
        registry
    }

    #[test]
    fn test_from_ledger_reads_third_row() {
        let table = Table::from_rows(
            "money.csv",
            vec![
                vec!["", "", ""],
                vec!["Code", "Libellé", "Base S."],
                vec!["", "Jean Dupont", "", "", "Marie Curie", "", "", "TOTAL"],
            ],
        );
        let registry = PersonRegistry::from_ledger(&table, &LedgerLayout::default());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.persons()[0].canonical_key, "JEAN DUPONT");
        assert_eq!(registry.persons()[0].official_name, "Jean Dupont");
        assert_eq!(registry.persons()[1].canonical_key, "MARIE CURIE");
        assert_eq!(registry.groups(), &[0, 1]);
    }

    #[test]
    fn test_from_ledger_short_table() {
        let table = Table::from_rows("money.csv", vec![vec!["Code"]]);
        assert!(PersonRegistry::from_ledger(&table, &LedgerLayout::default()).is_empty());
    }

    #[test]
    fn test_duplicate_names_share_a_person() {
        let registry = registry(&["Jean Dupont", "Marie Curie", "JEAN  DUPONT"]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.groups(), &[0, 1, 0]);
    }

    #[test]
    fn test_greedy_match_full_given_name() {
        let registry = registry(&["Jean Dupont", "Marie Curie"]);
        assert_eq!(
            registry.find("DUPONT", "Jean", MatchPolicy::Greedy),
            MatchOutcome::Matched(0)
        );
        assert_eq!(
            registry.find("Curie", "Marie", MatchPolicy::Greedy),
            MatchOutcome::Matched(1)
        );
    }

    #[test]
    fn test_greedy_match_initial() {
        let registry = registry(&["DUPONT J."]);
        assert_eq!(
            registry.find("Dupont", "Jean", MatchPolicy::Greedy),
            MatchOutcome::Matched(0)
        );
    }

    #[test]
    fn test_greedy_unmatched_and_empty() {
        let registry = registry(&["Jean Dupont"]);
        assert_eq!(
            registry.find("Martin", "Paul", MatchPolicy::Greedy),
            MatchOutcome::Unmatched
        );
        assert_eq!(registry.find("", "Jean", MatchPolicy::Greedy), MatchOutcome::Unmatched);
        assert_eq!(registry.find("Dupont", " ", MatchPolicy::Greedy), MatchOutcome::Unmatched);
    }

    #[test]
    fn test_greedy_prefers_first_registered() {
        // Both keys contain DUPONT and the initial J
        let registry = registry(&["DUPONT J", "DUPONT JULIE"]);
        assert_eq!(
            registry.find("Dupont", "Julie", MatchPolicy::Greedy),
            MatchOutcome::Matched(0)
        );
    }

    #[test]
    fn test_strict_prefers_exact_name() {
        let registry = registry(&["DUPONT J", "DUPONT JULIE"]);
        assert_eq!(
            registry.find("Dupont", "Julie", MatchPolicy::Strict),
            MatchOutcome::Matched(1)
        );
    }

    #[test]
    fn test_strict_reports_ambiguity() {
        let registry = registry(&["DUPONT JEAN", "DUPONT JULIE"]);
        assert_eq!(
            registry.find("Dupont", "J", MatchPolicy::Strict),
            MatchOutcome::Ambiguous(vec![0, 1])
        );
    }

    #[test]
    fn test_strict_exact_match_ignores_token_order() {
        let registry = registry(&["Marie Curie", "Pierre Curie"]);
        assert_eq!(
            registry.find("CURIE", "Pierre", MatchPolicy::Strict),
            MatchOutcome::Matched(1)
        );
        assert_eq!(
            registry.find("Curie", "Irène", MatchPolicy::Strict),
            MatchOutcome::Unmatched
        );
    }

    #[test]
    fn test_strict_falls_back_to_loose_rule() {
        let registry = registry(&["Jean-Pierre Dupont", "Marie Curie"]);
        assert_eq!(
            registry.find("Dupont", "Jean", MatchPolicy::Strict),
            MatchOutcome::Matched(0)
        );
    }
}
