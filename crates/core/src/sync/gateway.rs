//! Remote gateway contract used by the sync engine.

use async_trait::async_trait;

use crate::errors::Result;
use crate::quotes::Quote;

/// Outcome of a best-effort push of local quotes to the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Accepted,
    Rejected { reason: String },
}

/// Abstract fetch/push capability over the remote source of truth.
///
/// Implementations own all knowledge of the external schema; the reconciler
/// only ever sees adapted [`Quote`] values. Fetch failures are recoverable
/// `Error::Network` conditions, and a failed push must never roll back or
/// corrupt local state.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Fetch the remote snapshot, adapted into the quote model.
    async fn fetch_remote(&self) -> Result<Vec<Quote>>;

    /// Push local quotes to the remote service. Response status alone
    /// determines the outcome.
    async fn push_local(&self, quotes: &[Quote]) -> Result<PushOutcome>;
}
