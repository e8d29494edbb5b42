//! Pure classifiers that turn raw lane and identifier text into grouping keys.
//!
//! Both functions are total: unrecognized input yields `None` (range) or the
//! `other` / `unknown` categories, never an error.

use serde::{Deserialize, Serialize};

use crate::constants::classifier::{
    CATEGORY_OTHER, CATEGORY_PREFIX_LEN, CATEGORY_UNKNOWN, CIL_PREFIX, DEFAULT_CATEGORY_PREFIXES,
    RANGE_BUCKET_WIDTH,
};
use crate::types::{CategoryKey, RangeKey};

/// Location-range key for a lane string.
///
/// - blank or missing => `None`
/// - `CIL<n>` (any case) => trailing digit run `n * 100`
/// - otherwise the first digit run, floored to its hundred (`411B` => `400`)
pub fn range_key(location: Option<&str>) -> Option<RangeKey> {
    let value = location?.trim();
    if value.is_empty() {
        return None;
    }
    if has_cil_prefix(value) {
        let lane = trailing_digit_run(value)?.parse::<u64>().ok()?;
        return lane.checked_mul(RANGE_BUCKET_WIDTH);
    }
    let lane = leading_digit_run(value)?.parse::<u64>().ok()?;
    Some((lane / RANGE_BUCKET_WIDTH) * RANGE_BUCKET_WIDTH)
}

/// Category key for an identifier code, using the built-in prefix table.
pub fn category_key(identifier: Option<&str>) -> CategoryKey {
    CategoryTable::default().classify(identifier)
}

fn has_cil_prefix(value: &str) -> bool {
    value
        .get(..CIL_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(CIL_PREFIX))
}

fn trailing_digit_run(value: &str) -> Option<&str> {
    let digits = value
        .chars()
        .rev()
        .take_while(|ch| ch.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    Some(&value[value.len() - digits..])
}

fn leading_digit_run(value: &str) -> Option<&str> {
    let start = value.find(|ch: char| ch.is_ascii_digit())?;
    let rest = &value[start..];
    let end = rest
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// One identifier prefix mapped to a category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPrefix {
    /// Upper-case identifier prefix (normally six characters).
    pub prefix: String,
    /// Category name assigned to matching identifiers.
    pub category: CategoryKey,
}

/// Lookup table from identifier prefixes to category names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTable {
    entries: Vec<CategoryPrefix>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_CATEGORY_PREFIXES
                .iter()
                .map(|(prefix, category)| (prefix.to_string(), category.to_string())),
        )
    }
}

impl CategoryTable {
    /// Build a table from `(prefix, category)` pairs. Prefixes are upper-cased.
    pub fn new(entries: impl IntoIterator<Item = (String, CategoryKey)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(prefix, category)| CategoryPrefix {
                    prefix: prefix.trim().to_uppercase(),
                    category,
                })
                .collect(),
        }
    }

    /// Table entries in lookup order.
    pub fn entries(&self) -> &[CategoryPrefix] {
        &self.entries
    }

    /// Add (or replace) the category for `prefix`.
    pub fn insert(&mut self, prefix: &str, category: impl Into<CategoryKey>) {
        let prefix = prefix.trim().to_uppercase();
        let category = category.into();
        match self.entries.iter_mut().find(|entry| entry.prefix == prefix) {
            Some(entry) => entry.category = category,
            None => self.entries.push(CategoryPrefix { prefix, category }),
        }
    }

    /// Category for `identifier`: `unknown` when missing or blank, `other` when unmatched.
    pub fn classify(&self, identifier: Option<&str>) -> CategoryKey {
        let Some(value) = identifier.map(str::trim).filter(|value| !value.is_empty()) else {
            return CATEGORY_UNKNOWN.to_string();
        };
        let prefix: String = value
            .chars()
            .take(CATEGORY_PREFIX_LEN)
            .collect::<String>()
            .to_uppercase();
        self.entries
            .iter()
            .find(|entry| entry.prefix == prefix)
            .map(|entry| entry.category.clone())
            .unwrap_or_else(|| CATEGORY_OTHER.to_string())
    }
}

/// True for the fallback categories that carry no classification signal.
pub fn is_fallback_category(category: &str) -> bool {
    category == CATEGORY_OTHER || category == CATEGORY_UNKNOWN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_key_floors_regular_lanes_to_hundreds() {
        assert_eq!(range_key(Some("411B")), Some(400));
        assert_eq!(range_key(Some("  99 ")), Some(0));
        assert_eq!(range_key(Some("Lane 1250-A")), Some(1200));
    }

    #[test]
    fn range_key_uses_first_digit_run_only() {
        assert_eq!(range_key(Some("R305/12")), Some(300));
    }

    #[test]
    fn range_key_scales_cil_lanes() {
        assert_eq!(range_key(Some("CIL2")), Some(200));
        assert_eq!(range_key(Some("cil 15")), Some(1500));
        assert_eq!(range_key(Some("Cil")), None);
        assert_eq!(range_key(Some("CIL2A")), None);
    }

    #[test]
    fn range_key_is_absent_for_text_and_blank_input() {
        assert_eq!(range_key(Some("At Factory")), None);
        assert_eq!(range_key(Some("   ")), None);
        assert_eq!(range_key(None), None);
    }

    #[test]
    fn range_key_overflow_is_absent() {
        assert_eq!(range_key(Some("99999999999999999999999")), None);
        assert_eq!(range_key(Some("CIL999999999999999999")), None);
    }

    #[test]
    fn range_key_handles_multibyte_text() {
        assert_eq!(range_key(Some("çil9")), Some(0));
        assert_eq!(range_key(Some("Pátio")), None);
    }

    #[test]
    fn category_key_matches_known_prefixes() {
        assert_eq!(category_key(Some("93YRBB12345")), "kwid");
        assert_eq!(category_key(Some("93yhjd000")), "duster");
        assert_eq!(category_key(Some(" 8A18SR77 ")), "oroch");
    }

    #[test]
    fn category_key_fallbacks() {
        assert_eq!(category_key(Some("ZZZZZZ")), "other");
        assert_eq!(category_key(Some("93Y")), "other");
        assert_eq!(category_key(None), "unknown");
        assert_eq!(category_key(Some("")), "unknown");
    }

    #[test]
    fn category_table_insert_extends_and_overrides() {
        let mut table = CategoryTable::default();
        table.insert("9bwzzz", "polo");
        table.insert("93YRBB", "kwid-ev");
        assert_eq!(table.classify(Some("9BWZZZ1")), "polo");
        assert_eq!(table.classify(Some("93YRBB1")), "kwid-ev");
        assert_eq!(table.entries().len(), 4);
    }

    #[test]
    fn fallback_categories_are_recognized() {
        assert!(is_fallback_category("other"));
        assert!(is_fallback_category("unknown"));
        assert!(!is_fallback_category("kwid"));
    }
}
