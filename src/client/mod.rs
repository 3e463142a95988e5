//! Collection Sources
//!
//! Read-only access to the collections a server exposes.
//!
//! ## Architecture
//!
//! - **CollectionSource**: the async seam the store talks to
//! - **RestClient**: `reqwest` implementation against the REST endpoint
//!
//! ## Endpoints
//!
//! - `GET {prefix}/{list_resource}` returns a JSON array of names
//! - `GET {prefix}/{name}` returns the collection as arbitrary JSON

mod error;
mod rest;

pub use error::{ClientError, ClientResult};
pub use rest::{ClientConfig, RestClient};

use async_trait::async_trait;

use crate::payload::CollectionPayload;

/// Anything that can list and fetch named collections
#[async_trait]
pub trait CollectionSource: Send + Sync {
    /// Names of every collection, in server order
    async fn list_collection_names(&self) -> ClientResult<Vec<String>>;

    /// Contents of a single collection
    async fn fetch_collection(&self, name: &str) -> ClientResult<CollectionPayload>;
}
