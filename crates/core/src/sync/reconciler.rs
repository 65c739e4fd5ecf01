//! Pure remote-wins merge of two quote collections.

use std::collections::{HashMap, HashSet};

use crate::quotes::Quote;

/// Merge `remote` into `local` under remote-wins precedence.
///
/// Quotes carrying an identifier occupy one slot per identifier: local quotes
/// claim slots first, and a remote quote sharing an identifier overwrites the
/// local one in place, keeping its original slot. Remote-only identified
/// quotes append afterward. Quotes without an identifier append independently
/// with content-equality de-duplication against everything already merged.
/// Duplicate identifiers within one input collapse to the last occurrence.
///
/// Returns the merged collection and whether its composition differs from
/// `local`.
pub fn merge(local: &[Quote], remote: &[Quote]) -> (Vec<Quote>, bool) {
    let mut merged: Vec<Quote> = Vec::with_capacity(local.len() + remote.len());
    let mut slots: HashMap<String, usize> = HashMap::new();

    for quote in local.iter().chain(remote.iter()) {
        upsert(&mut merged, &mut slots, quote);
    }

    let changed = composition(&merged) != composition(local);
    (merged, changed)
}

/// Append each incoming quote not already present by content equality.
///
/// The import path: the incoming set is treated as identifier-less, so only
/// the weak (text, category) de-duplication rule applies. Returns how many
/// quotes were appended.
pub fn append_unique(existing: &mut Vec<Quote>, incoming: &[Quote]) -> usize {
    let mut added = 0;
    for quote in incoming {
        if !existing.iter().any(|present| present.same_content(quote)) {
            existing.push(quote.clone());
            added += 1;
        }
    }
    added
}

fn upsert(merged: &mut Vec<Quote>, slots: &mut HashMap<String, usize>, quote: &Quote) {
    match quote.id.as_deref() {
        Some(id) => match slots.get(id) {
            Some(&slot) => merged[slot] = quote.clone(),
            None => {
                slots.insert(id.to_string(), merged.len());
                merged.push(quote.clone());
            }
        },
        None => {
            if !merged.iter().any(|present| present.same_content(quote)) {
                merged.push(quote.clone());
            }
        }
    }
}

fn composition(quotes: &[Quote]) -> HashSet<&Quote> {
    quotes.iter().collect()
}
