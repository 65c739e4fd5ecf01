//! Sqlite-backed persistent store for QuoteSync.

mod store;

pub use store::*;
