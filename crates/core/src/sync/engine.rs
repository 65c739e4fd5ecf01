//! Sync engine: serialized fetch/merge/persist cycles and background loop.

use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::categories;
use crate::errors::{Error, Result};
use crate::portable;
use crate::quotes::{Quote, QuoteStore, CATEGORY_FILTER_PREFERENCE_KEY};
use crate::sync::events::{SyncEvent, SyncEventSink};
use crate::sync::gateway::{PushOutcome, RemoteGateway};
use crate::sync::reconciler;
use crate::sync::scheduler::{SYNC_INTERVAL_JITTER_MS, SYNC_INTERVAL_SECS};

/// Outcome of a single sync cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed { changed: bool, quote_count: usize },
    Failed { reason: String },
    /// The engine was stopped while this cycle was awaiting the network;
    /// the fetched result was discarded without touching persisted state.
    Superseded,
}

/// Lightweight engine status snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEngineStatus {
    pub last_success_at: Option<String>,
    pub last_error: Option<String>,
    pub consecutive_failures: i32,
    pub last_cycle_status: Option<String>,
}

/// Result of a portable import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub added: usize,
    pub total: usize,
}

/// Runtime state shared by every handle onto one engine.
struct EngineRuntimeState {
    /// Serializes cycles and every other store read-modify-write. A trigger
    /// arriving while a cycle runs queues behind it instead of overlapping.
    cycle_mutex: Mutex<()>,
    background_task: Mutex<Option<JoinHandle<()>>>,
    /// Last fetched remote snapshot, kept for manual conflict override.
    last_remote: std::sync::Mutex<Option<Vec<Quote>>>,
    status: std::sync::Mutex<SyncEngineStatus>,
    /// Bumped by `stop()`; a cycle whose captured generation no longer
    /// matches after its fetch discards the result as superseded.
    generation: AtomicU64,
}

fn lock_unpoisoned<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Drives periodic and on-demand sync cycles against one store/gateway pair.
#[derive(Clone)]
pub struct SyncEngine {
    store: Arc<dyn QuoteStore>,
    gateway: Arc<dyn RemoteGateway>,
    event_sink: Arc<dyn SyncEventSink>,
    runtime: Arc<EngineRuntimeState>,
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn QuoteStore>,
        gateway: Arc<dyn RemoteGateway>,
        event_sink: Arc<dyn SyncEventSink>,
    ) -> Self {
        Self {
            store,
            gateway,
            event_sink,
            runtime: Arc::new(EngineRuntimeState {
                cycle_mutex: Mutex::new(()),
                background_task: Mutex::new(None),
                last_remote: std::sync::Mutex::new(None),
                status: std::sync::Mutex::new(SyncEngineStatus::default()),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Run one sync cycle immediately and return its outcome.
    pub async fn sync_now(&self) -> SyncOutcome {
        let _cycle_guard = self.runtime.cycle_mutex.lock().await;
        self.run_cycle().await
    }

    async fn run_cycle(&self) -> SyncOutcome {
        let generation = self.runtime.generation.load(Ordering::SeqCst);
        let local = self.store.load();

        let remote = match self.gateway.fetch_remote().await {
            Ok(value) => value,
            Err(err) => return self.fail_cycle(format!("Fetch failed: {}", err)),
        };

        // The fetch is the only suspension point in a cycle. A stop() issued
        // while it was in flight supersedes this cycle; its result must not
        // be applied.
        if self.runtime.generation.load(Ordering::SeqCst) != generation {
            debug!("[QuoteSync] Discarding superseded cycle result");
            return SyncOutcome::Superseded;
        }

        *lock_unpoisoned(&self.runtime.last_remote) = Some(remote.clone());

        let (merged, changed) = reconciler::merge(&local, &remote);
        if changed {
            if let Err(err) = self.store.save(&merged) {
                return self.fail_cycle(format!("Save failed: {}", err));
            }
        }

        debug!(
            "[QuoteSync] Cycle complete changed={} quote_count={}",
            changed,
            merged.len()
        );
        self.complete_cycle(changed, merged.len())
    }

    fn complete_cycle(&self, changed: bool, quote_count: usize) -> SyncOutcome {
        {
            let mut status = lock_unpoisoned(&self.runtime.status);
            status.last_success_at = Some(Utc::now().to_rfc3339());
            status.last_error = None;
            status.consecutive_failures = 0;
            status.last_cycle_status = Some("ok".to_string());
        }
        self.event_sink.emit(SyncEvent::SyncCompleted {
            changed,
            quote_count,
        });
        SyncOutcome::Completed {
            changed,
            quote_count,
        }
    }

    fn fail_cycle(&self, reason: String) -> SyncOutcome {
        warn!("[QuoteSync] Cycle failed: {}", reason);
        {
            let mut status = lock_unpoisoned(&self.runtime.status);
            status.last_error = Some(reason.clone());
            status.consecutive_failures += 1;
            status.last_cycle_status = Some("failed".to_string());
        }
        self.event_sink.emit(SyncEvent::SyncFailed {
            reason: reason.clone(),
        });
        SyncOutcome::Failed { reason }
    }

    /// Begin recurring cycles at the default cadence.
    pub async fn start_periodic_default(&self) {
        self.start_periodic(Duration::from_secs(SYNC_INTERVAL_SECS))
            .await
    }

    /// Begin recurring cycles on a background task. A no-op while a previous
    /// loop is still running.
    pub async fn start_periodic(&self, interval: Duration) {
        let mut guard = self.runtime.background_task.lock().await;
        if let Some(handle) = guard.as_ref() {
            if !handle.is_finished() {
                return;
            }
            guard.take();
        }

        let engine = self.clone();
        let handle = tokio::spawn(async move {
            loop {
                let outcome = engine.sync_now().await;
                if let SyncOutcome::Failed { reason } = &outcome {
                    let failures =
                        lock_unpoisoned(&engine.runtime.status).consecutive_failures;
                    warn!(
                        "[QuoteSync] Periodic cycle failed ({} consecutive): {}",
                        failures, reason
                    );
                }

                let jitter_ms = if SYNC_INTERVAL_JITTER_MS > 0 {
                    Utc::now().timestamp_millis().unsigned_abs() % SYNC_INTERVAL_JITTER_MS
                } else {
                    0
                };
                let delay = interval + Duration::from_millis(jitter_ms);
                tokio::time::sleep(delay).await;
            }
        });
        *guard = Some(handle);
        info!("[QuoteSync] Periodic sync started");
    }

    /// Halt future cycles. Idempotent. A cycle already awaiting the network
    /// completes its fetch but discards the result as superseded.
    pub async fn stop(&self) {
        self.runtime.generation.fetch_add(1, Ordering::SeqCst);
        let mut guard = self.runtime.background_task.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
            info!("[QuoteSync] Periodic sync stopped");
        }
    }

    /// Replace the persisted collection wholesale with either the last
    /// fetched remote snapshot or the current local one — the user-directed
    /// escape hatch that bypasses the reconciler entirely.
    ///
    /// When `prefer_remote` and no snapshot has been fetched yet, a fresh one
    /// is fetched first.
    pub async fn resolve_conflict(&self, prefer_remote: bool) -> Result<Vec<Quote>> {
        let _cycle_guard = self.runtime.cycle_mutex.lock().await;
        let resolved = if prefer_remote {
            let cached = lock_unpoisoned(&self.runtime.last_remote).clone();
            match cached {
                Some(snapshot) => snapshot,
                None => {
                    let snapshot = self.gateway.fetch_remote().await?;
                    *lock_unpoisoned(&self.runtime.last_remote) = Some(snapshot.clone());
                    snapshot
                }
            }
        } else {
            self.store.load()
        };
        self.store.save(&resolved)?;
        info!(
            "[QuoteSync] Conflict resolved prefer_remote={} quote_count={}",
            prefer_remote,
            resolved.len()
        );
        Ok(resolved)
    }

    /// Add a quote created by user input, then best-effort push it to the
    /// remote service. A failed push never unwinds the local write.
    pub async fn add_quote(&self, text: &str, category: &str) -> Result<Quote> {
        if text.trim().is_empty() || category.trim().is_empty() {
            return Err(Error::format(
                "Quote text and category must be non-empty",
            ));
        }
        let quote = Quote::new(None, text, category);

        {
            let _cycle_guard = self.runtime.cycle_mutex.lock().await;
            let mut collection = self.store.load();
            if reconciler::append_unique(&mut collection, std::slice::from_ref(&quote)) > 0 {
                self.store.save(&collection)?;
            }
        }

        match self.gateway.push_local(std::slice::from_ref(&quote)).await {
            Ok(PushOutcome::Accepted) => debug!("[QuoteSync] Quote pushed to remote"),
            Ok(PushOutcome::Rejected { reason }) => {
                warn!("[QuoteSync] Remote rejected pushed quote: {}", reason)
            }
            Err(err) => warn!("[QuoteSync] Quote push failed: {}", err),
        }
        Ok(quote)
    }

    /// Import a portable JSON payload, appending to the persisted collection
    /// with content-equality de-duplication. A malformed payload leaves the
    /// existing collection untouched.
    pub async fn import_portable(&self, bytes: &[u8]) -> Result<ImportSummary> {
        let imported = portable::import_from_portable(bytes)?;
        let _cycle_guard = self.runtime.cycle_mutex.lock().await;
        let mut collection = self.store.load();
        let added = reconciler::append_unique(&mut collection, &imported);
        if added > 0 {
            self.store.save(&collection)?;
        }
        info!(
            "[QuoteSync] Imported {} of {} quotes",
            added,
            imported.len()
        );
        Ok(ImportSummary {
            added,
            total: collection.len(),
        })
    }

    /// Serialize the persisted collection to its portable JSON form.
    pub fn export_portable(&self) -> Result<Vec<u8>> {
        portable::export_to_portable(&self.store.load())
    }

    /// Distinct categories of the persisted collection.
    pub fn categories(&self) -> std::collections::BTreeSet<String> {
        categories::categories_of(&self.store.load())
    }

    /// Resolve the persisted category filter preference against the current
    /// collection, falling back to `"all"` when it no longer matches.
    pub fn active_category_filter(&self) -> String {
        let collection = self.store.load();
        let preference = self.store.load_preference(CATEGORY_FILTER_PREFERENCE_KEY);
        categories::active_filter(&collection, preference.as_deref())
    }

    /// Persist the category filter preference.
    pub fn set_category_filter(&self, value: &str) -> Result<()> {
        self.store
            .save_preference(CATEGORY_FILTER_PREFERENCE_KEY, value)
    }

    /// Current engine status snapshot.
    pub fn status(&self) -> SyncEngineStatus {
        lock_unpoisoned(&self.runtime.status).clone()
    }
}
