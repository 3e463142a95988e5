//! Store State
//!
//! Plain data held by the collection store, plus the events it publishes
//! when that data changes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::client::ClientError;
use crate::payload::CollectionPayload;

/// Load state of one collection entry
///
/// A name with no status has never been requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum EntryStatus {
    Loading,
    Present,
    Failed(String),
}

/// Read-only copy of the store, handed to the view layer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreSnapshot {
    /// Collection names in server order
    pub names: Vec<String>,
    /// Name selected for display
    pub active: Option<String>,
    /// Fetched payloads keyed by name
    pub collections: HashMap<String, CollectionPayload>,
    /// When each payload was committed
    pub loaded_at: HashMap<String, DateTime<Utc>>,
    /// Per-name load state
    pub status: HashMap<String, EntryStatus>,
    /// Message of the last failed name refresh
    pub last_error: Option<String>,
    /// Bumped on every commit
    pub version: u64,
}

impl StoreSnapshot {
    pub fn payload(&self, name: &str) -> Option<&CollectionPayload> {
        self.collections.get(name)
    }

    pub fn status(&self, name: &str) -> Option<&EntryStatus> {
        self.status.get(name)
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.as_deref() == Some(name)
    }
}

/// Change notifications published after each commit
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    NamesReplaced { names: Vec<String> },
    ActiveChanged { active: Option<String> },
    CollectionLoading { name: String },
    CollectionLoaded { name: String },
    CollectionFailed { name: String, error: ClientError },
    RefreshFailed { error: ClientError },
    Reset,
}

/// Outcome of one refresh cycle
#[derive(Debug, Clone, Default)]
pub struct RefreshReport {
    /// Name list the cycle fetched against
    pub names: Vec<String>,
    /// Names whose payload was committed
    pub loaded: Vec<String>,
    /// Names whose response was superseded by a newer request
    pub superseded: Vec<String>,
    /// Names whose fetch failed
    pub failed: Vec<(String, ClientError)>,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Mutable state behind the store lock
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) snapshot: StoreSnapshot,
    /// Source of request generations; strictly increasing across the store
    next_generation: u64,
    /// Newest generation issued per name
    issued: HashMap<String, u64>,
    /// Generation of the payload currently stored per name
    committed: HashMap<String, u64>,
    /// Requests issued at or below this generation predate the last reset
    floor: u64,
}

impl StoreState {
    pub(crate) fn bump(&mut self) -> u64 {
        self.snapshot.version += 1;
        self.snapshot.version
    }

    /// Issue a new request generation for `name`
    pub(crate) fn issue(&mut self, name: &str) -> u64 {
        self.next_generation += 1;
        self.issued.insert(name.to_string(), self.next_generation);
        self.next_generation
    }

    /// Whether `generation` is the newest request issued for `name`
    pub(crate) fn is_latest(&self, name: &str, generation: u64) -> bool {
        self.issued.get(name) == Some(&generation)
    }

    /// Whether a payload from `generation` is newer than the stored one
    pub(crate) fn accepts(&self, name: &str, generation: u64) -> bool {
        generation > self.floor && self.committed.get(name).map_or(true, |&g| generation > g)
    }

    pub(crate) fn record_commit(&mut self, name: &str, generation: u64) {
        self.committed.insert(name.to_string(), generation);
    }

    /// Back to the start state; the version keeps counting
    pub(crate) fn clear(&mut self) {
        let version = self.snapshot.version;
        *self = StoreState {
            next_generation: self.next_generation,
            floor: self.next_generation,
            ..StoreState::default()
        };
        self.snapshot.version = version;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generations_are_monotonic() {
        let mut state = StoreState::default();
        let first = state.issue("a");
        let second = state.issue("b");
        let third = state.issue("a");

        assert!(first < second && second < third);
        assert!(!state.is_latest("a", first));
        assert!(state.is_latest("a", third));
        assert!(state.is_latest("b", second));
    }

    #[test]
    fn test_accepts_only_newer_commits() {
        let mut state = StoreState::default();
        let old = state.issue("a");
        let new = state.issue("a");

        assert!(state.accepts("a", new));
        state.record_commit("a", new);
        assert!(!state.accepts("a", old));
        assert!(!state.accepts("a", new));
    }

    #[test]
    fn test_clear_keeps_version_and_generations() {
        let mut state = StoreState::default();
        state.snapshot.names = vec!["a".to_string()];
        let before = state.issue("a");
        state.bump();
        state.bump();

        state.clear();
        assert!(state.snapshot.names.is_empty());
        assert_eq!(state.snapshot.version, 2);
        assert!(!state.accepts("a", before));
        assert!(state.issue("a") > before);
    }

    #[test]
    fn test_status_serializes_tagged() {
        let json = serde_json::to_string(&EntryStatus::Failed("boom".to_string())).unwrap();
        assert_eq!(json, r#"{"state":"failed","error":"boom"}"#);
        let json = serde_json::to_string(&EntryStatus::Present).unwrap();
        assert_eq!(json, r#"{"state":"present"}"#);
    }
}
