//! Persistent store contract for the quote collection and preferences.

use crate::errors::Result;
use crate::quotes::Quote;

/// Durable key-value store for the quote collection and scalar preferences.
///
/// The store owns the persisted collection; callers only hold values obtained
/// from explicit `load`/`save` calls, never shared mutable state.
pub trait QuoteStore: Send + Sync {
    /// Load the previously saved collection.
    ///
    /// Returns an empty collection when nothing was saved yet, when the
    /// stored blob fails to parse, or when the read itself fails — a load
    /// never raises into the caller.
    fn load(&self) -> Vec<Quote>;

    /// Overwrite the stored collection atomically. Durable once this
    /// returns: a crash afterwards never loses the written state.
    fn save(&self, quotes: &[Quote]) -> Result<()>;

    /// Load a scalar preference value, if one was saved under `key`.
    fn load_preference(&self, key: &str) -> Option<String>;

    /// Save a scalar preference value under `key`.
    fn save_preference(&self, key: &str, value: &str) -> Result<()>;
}
