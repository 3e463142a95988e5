//! # collbrowse
//!
//! Collection browser - a client for the named collections an embedded
//! database exposes over a read-only REST endpoint.
//!
//! ## Features
//!
//! - **Typed payloads**: collection JSON as an ordered tagged union
//! - **Collection store**: name list, active selection and fetched payloads
//!   with change notifications
//! - **Stale response guard**: per-name request generations
//! - **Theme preference**: persisted light/dark flag
//!
//! ## Modules
//!
//! - [`client`]: REST client and the source trait the store depends on
//! - [`store`]: collection store, mutations and refresh actions
//! - [`payload`]: JSON payload model
//! - [`theme`]: theme persistence
//! - [`view`]: text rendering of store snapshots
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use collbrowse::{ClientConfig, CollectionStore, RestClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RestClient::new(ClientConfig::default())?;
//!     let store = CollectionStore::new(Arc::new(client));
//!
//!     // List names, then fetch every collection
//!     let report = store.refresh_all().await?;
//!     for (name, error) in &report.failed {
//!         eprintln!("{} failed: {}", name, error);
//!     }
//!
//!     let snapshot = store.snapshot().await;
//!     if let Some(active) = &snapshot.active {
//!         println!("{} -> {:?}", active, snapshot.payload(active));
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod logging;
pub mod payload;
pub mod store;
pub mod theme;
pub mod view;

// Re-export top-level types for convenience
pub use client::{ClientConfig, ClientError, ClientResult, CollectionSource, RestClient};

pub use payload::CollectionPayload;

pub use store::{
    CollectionStore, EntryStatus, RefreshReport, StoreError, StoreEvent, StoreResult,
    StoreSnapshot,
};

pub use theme::{Theme, ThemeError, ThemePreference};

pub use config::{Config, ConfigError, LoggingConfig, ServerConfig, ThemeConfig};
