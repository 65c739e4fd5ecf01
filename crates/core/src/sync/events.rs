//! Structured sync events consumed by UI collaborators.

use serde::{Deserialize, Serialize};

/// Outcome event emitted at the end of a sync cycle.
///
/// The notification surface is deliberately decoupled from merge logic:
/// the engine emits these and a subscriber decides how to present them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SyncEvent {
    #[serde(rename_all = "camelCase")]
    SyncCompleted { changed: bool, quote_count: usize },
    #[serde(rename_all = "camelCase")]
    SyncFailed { reason: String },
}

/// Sink for sync events. Runtime bridges implement this to surface
/// notifications; emitting must have no other side effects.
pub trait SyncEventSink: Send + Sync {
    fn emit(&self, event: SyncEvent);
}

/// Sink that drops every event, for headless callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl SyncEventSink for NullEventSink {
    fn emit(&self, _event: SyncEvent) {}
}
