//! Collection Store
//!
//! Client-side cache of the server's collections and the protocol that
//! keeps it in sync.
//!
//! ## Data Flow
//!
//! 1. `refresh_all` lists the collection names and replaces the list
//! 2. The first name becomes the active one
//! 3. Every name is fetched concurrently and committed as it resolves
//! 4. Each commit bumps the version and publishes a [`StoreEvent`]
//!
//! Responses are tagged with a per-name request generation; one that is
//! older than the payload already stored is dropped.

mod collections;
mod error;
mod state;

pub use collections::{CollectionStore, DEFAULT_EVENT_CAPACITY};
pub use error::{StoreError, StoreResult};
pub use state::{EntryStatus, RefreshReport, StoreEvent, StoreSnapshot};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientConfig, ClientError, RestClient};
    use crate::payload::CollectionPayload;
    use axum::{extract::Path, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
    use std::sync::Arc;

    async fn spawn_browser() -> String {
        let router = Router::new()
            .route(
                "/rest/collNames",
                get(|| async { Json(vec!["users", "orders"]) }),
            )
            .route(
                "/rest/:coll",
                get(|Path(coll): Path<String>| async move {
                    match coll.as_str() {
                        "users" => Json(serde_json::json!([{ "id": 1 }])).into_response(),
                        _ => StatusCode::NOT_FOUND.into_response(),
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_refresh_against_http_server() {
        let base_url = spawn_browser().await;
        let client = RestClient::new(ClientConfig {
            base_url,
            ..ClientConfig::default()
        })
        .unwrap();
        let store = CollectionStore::new(Arc::new(client));

        let report = store.refresh_all().await.unwrap();
        assert_eq!(report.loaded, vec!["users"]);
        assert_eq!(
            report.failed,
            vec![("orders".to_string(), ClientError::NotFound("orders".to_string()))]
        );

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.active.as_deref(), Some("users"));
        assert_eq!(snapshot.collections.len(), 1);
        assert_eq!(
            snapshot.payload("users"),
            Some(&CollectionPayload::from_json(r#"[{"id":1}]"#).unwrap())
        );
        assert!(snapshot.payload("orders").is_none());
        assert!(matches!(
            snapshot.status("orders"),
            Some(EntryStatus::Failed(_))
        ));
    }
}
