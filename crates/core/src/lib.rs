//! Core domain logic for QuoteSync: quote models, the remote-wins
//! reconciler, the sync engine, and the portable import/export codec.

pub mod categories;
pub mod errors;
pub mod portable;
pub mod quotes;
pub mod sync;

pub use errors::{Error, Result};
