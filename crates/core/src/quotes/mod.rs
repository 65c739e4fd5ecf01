//! Quote domain models and the persistent store contract.

mod model;
mod store;

pub use model::*;
pub use store::*;
