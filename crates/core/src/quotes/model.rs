//! Quote record model and identity rules.

use serde::{Deserialize, Serialize};

/// Storage key for the persisted collection blob.
pub const QUOTES_STORAGE_KEY: &str = "quotes";

/// Storage key for the persisted category filter preference.
pub const CATEGORY_FILTER_PREFERENCE_KEY: &str = "category_filter";

/// A single quote known to the client.
///
/// Identity: within a collection there is at most one quote per identifier
/// when identifiers are present. Quotes without an identifier are
/// de-duplicated by structural equality on (text, category) — a deliberately
/// weak rule kept as-is until the product decides on a stronger one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Stable identifier assigned by the remote service, absent for quotes
    /// created locally and not yet acknowledged remotely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    pub category: String,
}

impl Quote {
    pub fn new(id: Option<String>, text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            category: category.into(),
        }
    }

    /// Structural equality used for de-duplication of identifier-less quotes.
    pub fn same_content(&self, other: &Quote) -> bool {
        self.text == other.text && self.category == other.category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_serialization_omits_absent_id() {
        let quote = Quote::new(None, "A", "X");
        let json = serde_json::to_string(&quote).expect("serialize quote");
        assert_eq!(json, r#"{"text":"A","category":"X"}"#);
    }

    #[test]
    fn quote_serialization_includes_present_id() {
        let quote = Quote::new(Some("1".to_string()), "A", "X");
        let json = serde_json::to_string(&quote).expect("serialize quote");
        assert_eq!(json, r#"{"id":"1","text":"A","category":"X"}"#);
    }

    #[test]
    fn same_content_ignores_identifier() {
        let a = Quote::new(Some("1".to_string()), "A", "X");
        let b = Quote::new(None, "A", "X");
        assert!(a.same_content(&b));
        assert!(!a.same_content(&Quote::new(None, "A", "Y")));
    }
}
