//! Portable JSON import/export codec for quote collections.

use crate::errors::{Error, Result};
use crate::quotes::Quote;

/// Serialize a collection to its portable form: a UTF-8 JSON array of
/// `{id?, text, category}`.
pub fn export_to_portable(quotes: &[Quote]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(quotes)?)
}

/// Parse and validate a portable payload.
///
/// Every element must carry non-empty `text` and `category`; anything else is
/// a format error and the caller must leave its existing collection untouched.
pub fn import_from_portable(bytes: &[u8]) -> Result<Vec<Quote>> {
    let quotes: Vec<Quote> = serde_json::from_slice(bytes)
        .map_err(|err| Error::format(format!("Malformed portable payload: {}", err)))?;

    for (index, quote) in quotes.iter().enumerate() {
        if quote.text.trim().is_empty() || quote.category.trim().is_empty() {
            return Err(Error::format(format!(
                "Quote at index {} must have non-empty text and category",
                index
            )));
        }
    }
    Ok(quotes)
}
