//! Clause-number extraction.
//!
//! Best-effort: derives a dotted-numeral clause identifier (`5.1.2.3`)
//! from a chunk's outline position. Heuristic by design; a miss yields
//! `None` and never fails the chunking run.

use once_cell::sync::Lazy;
use regex::Regex;

/// A full dotted-numeral label: one to five numeral groups.
static HIERARCHY_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:\.\d+){0,4}$").expect("valid clause regex"));

/// A dotted numeral leading a heading, e.g. `4.2.3 Requirements`.
static HEADING_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+){0,4})\b").expect("valid heading regex"));

/// Derive a clause number, in priority order: the deepest hierarchy entry
/// that is itself a dotted numeral, then a dotted numeral leading the
/// heading text.
pub fn extract(section_hierarchy: &[String], heading_text: &str) -> Option<String> {
    if let Some(label) = section_hierarchy
        .iter()
        .rev()
        .find(|entry| HIERARCHY_LABEL.is_match(entry.trim()))
    {
        return Some(label.trim().to_string());
    }

    HEADING_PREFIX
        .captures(heading_text.trim())
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hierarchy(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn deepest_hierarchy_entry_wins() {
        let h = hierarchy(&["4", "4.2", "4.2.3"]);
        assert_eq!(extract(&h, "4.2.3 Requirements"), Some("4.2.3".into()));
    }

    #[test]
    fn falls_back_to_heading_prefix() {
        let h = hierarchy(&["Introduction"]);
        assert_eq!(extract(&h, "5.1.2 Verification"), Some("5.1.2".into()));
    }

    #[test]
    fn non_numeric_outline_yields_none() {
        let h = hierarchy(&["Annex A"]);
        assert_eq!(extract(&h, "Scope and field of application"), None);
    }

    #[test]
    fn skips_non_numeric_deep_entries() {
        let h = hierarchy(&["4", "4.2", "Table 3"]);
        assert_eq!(extract(&h, ""), Some("4.2".into()));
    }

    #[test]
    fn five_groups_supported() {
        let h = hierarchy(&["1.2.3.4.5"]);
        assert_eq!(extract(&h, ""), Some("1.2.3.4.5".into()));
    }

    #[test]
    fn empty_inputs_yield_none() {
        assert_eq!(extract(&[], ""), None);
    }
}
