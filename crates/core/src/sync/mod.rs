//! Sync domain: reconciler, remote gateway contract, events, and engine.

mod engine;
mod events;
mod gateway;
pub mod reconciler;
mod scheduler;

pub use engine::*;
pub use events::*;
pub use gateway::*;
pub use scheduler::*;
