//! Canonical matching keys for names and labels
//!
//! The same function builds registry keys and normalizes whatever the other
//! sources say about a person, so matching only works if both sides go
//! through here.

use unicode_normalization::UnicodeNormalization;

/// Canonicalize a string into a comparable key.
///
/// Diacritics are stripped, every run of non-alphanumeric characters becomes
/// a single space, and the result is trimmed and uppercased.
///
/// ```
/// use bsi_core::normalize;
/// assert_eq!(normalize("  Émilie  d'Arc-Dupré "), "EMILIE D ARC DUPRE");
/// ```
pub fn normalize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_space = false;

    let mut push = |c: char| {
        if c.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c.to_ascii_uppercase());
        } else {
            pending_space = true;
        }
    };

    for c in value.nfd() {
        match c {
            // combining diacritical marks left over from decomposition
            '\u{0300}'..='\u{036f}' => {}
            'œ' | 'Œ' => {
                push('O');
                push('E');
            }
            'æ' | 'Æ' => {
                push('A');
                push('E');
            }
            'ß' => {
                push('S');
                push('S');
            }
            'ø' | 'Ø' => push('O'),
            'đ' | 'Đ' => push('D'),
            'ł' | 'Ł' => push('L'),
            c => push(c),
        }
    }

    out
}

/// Whether `needle` occurs in `haystack` as whole space-separated words.
/// Both arguments are expected to be normalized already.
pub fn contains_words(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let padded_haystack = format!(" {haystack} ");
    let padded_needle = format!(" {needle} ");
    padded_haystack.contains(&padded_needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_is_case_and_accent_insensitive() {
        assert_eq!(normalize("Émilie"), "EMILIE");
        assert_eq!(normalize("EMILIE"), "EMILIE");
        assert_eq!(normalize("  emilie "), "EMILIE");
        assert_eq!(normalize("Émilie"), normalize("  emilie "));
    }

    #[test]
    fn test_normalize_collapses_separators() {
        assert_eq!(normalize("Jean--Pierre   DUPONT"), "JEAN PIERRE DUPONT");
        assert_eq!(normalize("RTT pris (j)"), "RTT PRIS J");
        assert_eq!(normalize("Base S."), "BASE S");
    }

    #[test]
    fn test_normalize_keeps_digits() {
        assert_eq!(normalize("Retraite TU1"), "RETRAITE TU1");
        assert_eq!(normalize("Assurance chômage TrA+TrB"), "ASSURANCE CHOMAGE TRA TRB");
    }

    #[test]
    fn test_normalize_ligatures_and_specials() {
        assert_eq!(normalize("Cœur"), "COEUR");
        assert_eq!(normalize("Straße"), "STRASSE");
        assert_eq!(normalize("Łukasz Ørsted"), "LUKASZ ORSTED");
    }

    #[test]
    fn test_normalize_empty_and_symbols() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" -- / "), "");
        assert_eq!(normalize("\u{a0}Marie\u{a0}"), "MARIE");
    }

    #[test]
    fn test_contains_words() {
        assert!(contains_words("NOM", "NOM"));
        assert!(contains_words("NOM DE FAMILLE", "NOM"));
        assert!(!contains_words("PRENOM", "NOM"));
        assert!(contains_words("NB JOURS TRAVAILLES", "JOURS TRAVAILLES"));
        assert!(!contains_words("NOM", ""));
    }
}
