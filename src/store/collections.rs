//! Collection Store
//!
//! Single source of truth for collection data. Readers get snapshots;
//! writes go through the mutations below, each of which runs to
//! completion under the write lock and then publishes a [`StoreEvent`].

use chrono::Utc;
use futures_util::future::join_all;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use super::error::{StoreError, StoreResult};
use super::state::{EntryStatus, RefreshReport, StoreEvent, StoreSnapshot, StoreState};
use crate::client::{ClientError, CollectionSource};
use crate::payload::CollectionPayload;

/// Default capacity of the event channel
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Outcome of a single fetch-and-commit
enum FetchOutcome {
    Committed,
    Superseded,
}

/// Shared handle to the collection store
///
/// Cloning is cheap; every clone sees the same state.
#[derive(Clone)]
pub struct CollectionStore {
    source: Arc<dyn CollectionSource>,
    state: Arc<RwLock<StoreState>>,
    events: broadcast::Sender<StoreEvent>,
}

impl CollectionStore {
    /// Create an empty store backed by `source`
    pub fn new(source: Arc<dyn CollectionSource>) -> Self {
        let (events, _) = broadcast::channel(DEFAULT_EVENT_CAPACITY);

        Self {
            source,
            state: Arc::new(RwLock::new(StoreState::default())),
            events,
        }
    }

    /// Receive change notifications from now on
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // ============================================
    // Observation
    // ============================================

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.snapshot.clone()
    }

    pub async fn version(&self) -> u64 {
        self.state.read().await.snapshot.version
    }

    pub async fn names(&self) -> Vec<String> {
        self.state.read().await.snapshot.names.clone()
    }

    pub async fn active(&self) -> Option<String> {
        self.state.read().await.snapshot.active.clone()
    }

    pub async fn payload(&self, name: &str) -> Option<CollectionPayload> {
        self.state.read().await.snapshot.collections.get(name).cloned()
    }

    pub async fn status(&self, name: &str) -> Option<EntryStatus> {
        self.state.read().await.snapshot.status.get(name).cloned()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.snapshot.last_error.clone()
    }

    // ============================================
    // Mutations
    // ============================================

    /// Replace the name list and activate its first entry
    pub async fn set_collection_names(&self, names: Vec<String>) {
        let mut state = self.state.write().await;
        let active = names.first().cloned();

        state.snapshot.names = names.clone();
        state.snapshot.last_error = None;
        let active_changed = state.snapshot.active != active;
        state.snapshot.active = active.clone();
        state.bump();

        self.publish(StoreEvent::NamesReplaced { names });
        if active_changed {
            self.publish(StoreEvent::ActiveChanged { active });
        }
    }

    /// Select a collection for display
    ///
    /// Fails with [`StoreError::InvalidName`] when `name` is not in the
    /// current list; state is left unchanged in that case.
    pub async fn set_active(&self, name: &str) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if !state.snapshot.names.iter().any(|n| n == name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }

        if state.snapshot.active.as_deref() != Some(name) {
            state.snapshot.active = Some(name.to_string());
            state.bump();
            self.publish(StoreEvent::ActiveChanged {
                active: Some(name.to_string()),
            });
        }
        Ok(())
    }

    /// Mark `name` as loading and issue the generation its response
    /// must carry to be committed
    pub async fn begin_fetch(&self, name: &str) -> u64 {
        let mut state = self.state.write().await;
        let generation = state.issue(name);
        state
            .snapshot
            .status
            .insert(name.to_string(), EntryStatus::Loading);
        state.bump();

        self.publish(StoreEvent::CollectionLoading {
            name: name.to_string(),
        });
        generation
    }

    /// Write a fetched payload
    ///
    /// Returns `false` without touching state when a payload from a newer
    /// request is already stored.
    pub async fn commit_collection(
        &self,
        name: &str,
        generation: u64,
        payload: CollectionPayload,
    ) -> bool {
        let mut state = self.state.write().await;
        if !state.accepts(name, generation) {
            tracing::debug!(collection = %name, generation, "Discarding stale collection response");
            return false;
        }

        state
            .snapshot
            .collections
            .insert(name.to_string(), payload);
        state
            .snapshot
            .loaded_at
            .insert(name.to_string(), Utc::now());
        state.record_commit(name, generation);
        if state.is_latest(name, generation) {
            state
                .snapshot
                .status
                .insert(name.to_string(), EntryStatus::Present);
        }
        state.bump();

        self.publish(StoreEvent::CollectionLoaded {
            name: name.to_string(),
        });
        true
    }

    /// Record a failed fetch; any stored payload is kept
    ///
    /// Returns `false` when a newer request for `name` has been issued.
    pub async fn commit_failure(&self, name: &str, generation: u64, error: &ClientError) -> bool {
        let mut state = self.state.write().await;
        if !state.is_latest(name, generation) {
            return false;
        }

        state
            .snapshot
            .status
            .insert(name.to_string(), EntryStatus::Failed(error.to_string()));
        state.bump();

        self.publish(StoreEvent::CollectionFailed {
            name: name.to_string(),
            error: error.clone(),
        });
        true
    }

    /// Clear names, selection, payloads and statuses
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.clear();
        state.bump();
        self.publish(StoreEvent::Reset);
    }

    async fn record_refresh_failure(&self, error: &ClientError) {
        let mut state = self.state.write().await;
        state.snapshot.last_error = Some(error.to_string());
        state.bump();
        self.publish(StoreEvent::RefreshFailed {
            error: error.clone(),
        });
    }

    fn publish(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    // ============================================
    // Actions
    // ============================================

    /// Fetch the name list, then every collection in it
    ///
    /// A failed list call leaves names, selection and payloads untouched
    /// and is returned as an error. Per-name failures are logged and
    /// reported without stopping the other fetches.
    pub async fn refresh_all(&self) -> StoreResult<RefreshReport> {
        let names = match self.source.list_collection_names().await {
            Ok(names) => names,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list collections");
                self.record_refresh_failure(&e).await;
                return Err(e.into());
            }
        };

        tracing::info!(count = names.len(), "Collection names refreshed");
        self.set_collection_names(names.clone()).await;

        let mut seen = HashSet::new();
        let unique: Vec<String> = names
            .iter()
            .filter(|n| seen.insert(n.to_string()))
            .cloned()
            .collect();

        let outcomes = join_all(unique.iter().map(|name| async move {
            (name.clone(), self.fetch_and_commit(name).await)
        }))
        .await;

        let mut report = RefreshReport {
            names,
            ..RefreshReport::default()
        };
        for (name, outcome) in outcomes {
            match outcome {
                Ok(FetchOutcome::Committed) => report.loaded.push(name),
                Ok(FetchOutcome::Superseded) => report.superseded.push(name),
                Err(e) => report.failed.push((name, e)),
            }
        }

        tracing::info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            superseded = report.superseded.len(),
            "Refresh cycle completed"
        );
        Ok(report)
    }

    /// Run [`refresh_all`](Self::refresh_all) unless `stop` completes first
    ///
    /// Returns `None` when stopped. Fetches already committed stay
    /// committed; those still in flight are dropped and their entries
    /// remain `Loading` until the next refresh.
    pub async fn refresh_all_until<F>(&self, stop: F) -> Option<StoreResult<RefreshReport>>
    where
        F: Future,
    {
        tokio::select! {
            result = self.refresh_all() => Some(result),
            _ = stop => {
                tracing::debug!("Refresh interrupted");
                None
            }
        }
    }

    /// Fetch a single collection and commit it
    ///
    /// `name` does not have to be in the current list. On failure the
    /// stored payload, if any, is kept.
    pub async fn fetch_one(&self, name: &str) -> StoreResult<()> {
        self.fetch_and_commit(name).await?;
        Ok(())
    }

    async fn fetch_and_commit(&self, name: &str) -> Result<FetchOutcome, ClientError> {
        let generation = self.begin_fetch(name).await;

        match self.source.fetch_collection(name).await {
            Ok(payload) => {
                if self.commit_collection(name, generation, payload).await {
                    tracing::debug!(collection = %name, "Collection loaded");
                    Ok(FetchOutcome::Committed)
                } else {
                    Ok(FetchOutcome::Superseded)
                }
            }
            Err(e) => {
                tracing::warn!(collection = %name, error = %e, "Failed to load collection");
                self.commit_failure(name, generation, &e).await;
                Err(e)
            }
        }
    }
}
