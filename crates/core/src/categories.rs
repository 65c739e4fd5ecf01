//! Category index derived from the current collection.

use std::collections::BTreeSet;

use crate::quotes::Quote;

/// Filter value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Distinct categories of a collection. Computed fresh on every call;
/// collections are small enough that no incremental index is warranted.
pub fn categories_of(quotes: &[Quote]) -> BTreeSet<String> {
    quotes.iter().map(|quote| quote.category.clone()).collect()
}

/// Resolve a persisted filter preference against the current collection.
/// A preference that no longer names an existing category falls back to
/// [`ALL_CATEGORIES`].
pub fn active_filter(quotes: &[Quote], preference: Option<&str>) -> String {
    match preference {
        Some(value) if value == ALL_CATEGORIES => ALL_CATEGORIES.to_string(),
        Some(value) if quotes.iter().any(|quote| quote.category == value) => value.to_string(),
        _ => ALL_CATEGORIES.to_string(),
    }
}
