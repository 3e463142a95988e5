//! REST Collection Client
//!
//! HTTP client for the collection browser endpoints.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::error::{ClientError, ClientResult};
use super::CollectionSource;
use crate::payload::CollectionPayload;

/// Configuration for the REST client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server root (e.g., "http://localhost:9595")
    pub base_url: String,
    /// Fixed REST prefix prepended to every resource
    pub prefix: String,
    /// Resource that lists the collection names
    pub list_resource: String,
    /// Overall request timeout; `None` leaves it to the HTTP layer
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9595".to_string(),
            prefix: "/rest".to_string(),
            list_resource: "collNames".to_string(),
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Base URL joined with the normalized prefix, no trailing slash
    pub fn root(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, prefix)
        }
    }
}

/// Read-only REST client for collections
pub struct RestClient {
    client: Client,
    config: ClientConfig,
}

impl RestClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// URL of the name list resource
    pub fn list_url(&self) -> String {
        format!(
            "{}/{}",
            self.config.root(),
            self.config.list_resource.trim_matches('/')
        )
    }

    /// URL of a single collection; the name is encoded as one path segment
    ///
    /// Empty names and the dot segments `.` and `..` are rejected. URL
    /// parsing resolves dot segments even when percent-encoded, so they
    /// would address a different resource.
    pub fn collection_url(&self, name: &str) -> ClientResult<String> {
        if matches!(name, "" | "." | "..") {
            return Err(ClientError::InvalidName(name.to_string()));
        }
        Ok(format!("{}/{}", self.config.root(), urlencoding::encode(name)))
    }

    /// Check that the list endpoint answers with a valid name list
    pub async fn health_check(&self) -> ClientResult<usize> {
        self.list_names().await.map(|names| names.len())
    }

    async fn list_names(&self) -> ClientResult<Vec<String>> {
        let url = self.list_url();
        tracing::debug!(url = %url, "Listing collections");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Transport(format!(
                "{} returned HTTP {}",
                url, status
            )));
        }

        let body = response.bytes().await?;
        serde_json::from_slice::<Vec<String>>(&body).map_err(|e| {
            ClientError::Decode(format!("{} did not return an array of strings: {}", url, e))
        })
    }

    async fn fetch(&self, name: &str) -> ClientResult<CollectionPayload> {
        let url = self.collection_url(name)?;
        tracing::debug!(collection = %name, url = %url, "Fetching collection");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(name.to_string()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::Transport(format!(
                "{} returned HTTP {}: {}",
                url,
                status,
                text.trim()
            )));
        }

        let body = response.bytes().await?;
        CollectionPayload::from_slice(&body)
            .map_err(|e| ClientError::Decode(format!("{} returned invalid JSON: {}", url, e)))
    }
}

#[async_trait]
impl CollectionSource for RestClient {
    async fn list_collection_names(&self) -> ClientResult<Vec<String>> {
        self.list_names().await
    }

    async fn fetch_collection(&self, name: &str) -> ClientResult<CollectionPayload> {
        self.fetch(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::get,
        Json, Router,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn collection(Path(coll): Path<String>) -> Response {
        match coll.as_str() {
            "users" => Json(serde_json::json!([{ "id": 1 }])).into_response(),
            "broken" => "{not json".into_response(),
            "fails" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
            "orders" => StatusCode::NOT_FOUND.into_response(),
            other => Json(serde_json::json!({ "name": other })).into_response(),
        }
    }

    fn browser_router() -> Router {
        Router::new()
            .route(
                "/rest/collNames",
                get(|| async { Json(vec!["users", "orders"]) }),
            )
            .route(
                "/rest/klassNames",
                get(|| async { Json(vec!["Legacy"]) }),
            )
            .route("/rest/:coll", get(collection))
    }

    async fn client_for(router: Router) -> RestClient {
        let base_url = spawn_server(router).await;
        RestClient::new(ClientConfig {
            base_url,
            ..ClientConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:9595");
        assert_eq!(config.root(), "http://localhost:9595/rest");
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_urls_are_normalized() {
        let client = RestClient::new(ClientConfig {
            base_url: "http://db.local:9595/".to_string(),
            prefix: "rest/".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();

        assert_eq!(client.list_url(), "http://db.local:9595/rest/collNames");
        assert_eq!(
            client.collection_url("users").unwrap(),
            "http://db.local:9595/rest/users"
        );
        assert_eq!(
            client.collection_url("a b/c").unwrap(),
            "http://db.local:9595/rest/a%20b%2Fc"
        );
        assert_eq!(
            client.collection_url("..."),
            Ok("http://db.local:9595/rest/...".to_string())
        );

        let bare = RestClient::new(ClientConfig {
            prefix: String::new(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(bare.list_url(), "http://localhost:9595/collNames");
    }

    #[tokio::test]
    async fn test_list_collection_names() {
        let client = client_for(browser_router()).await;
        let names = client.list_collection_names().await.unwrap();
        assert_eq!(names, vec!["users", "orders"]);
        assert_eq!(client.health_check().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_legacy_list_resource() {
        let base_url = spawn_server(browser_router()).await;
        let client = RestClient::new(ClientConfig {
            base_url,
            list_resource: "klassNames".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();

        assert_eq!(client.list_collection_names().await.unwrap(), vec!["Legacy"]);
    }

    #[tokio::test]
    async fn test_list_rejects_wrong_shape() {
        let router = Router::new().route(
            "/rest/collNames",
            get(|| async { Json(serde_json::json!({ "names": ["a"] })) }),
        );
        let client = client_for(router).await;

        let err = client.list_collection_names().await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_list_non_success_is_transport() {
        let router = Router::new().route(
            "/rest/collNames",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let client = client_for(router).await;

        let err = client.list_collection_names().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_fetch_collection() {
        let client = client_for(browser_router()).await;
        let payload = client.fetch_collection("users").await.unwrap();
        assert_eq!(payload, CollectionPayload::from_json(r#"[{"id":1}]"#).unwrap());
    }

    #[tokio::test]
    async fn test_fetch_encodes_name() {
        let client = client_for(browser_router()).await;
        let payload = client.fetch_collection("two words").await.unwrap();
        assert_eq!(
            payload.get("name"),
            Some(&CollectionPayload::String("two words".to_string()))
        );
    }

    #[tokio::test]
    async fn test_fetch_error_mapping() {
        let client = client_for(browser_router()).await;

        let err = client.fetch_collection("orders").await.unwrap_err();
        assert_eq!(err, ClientError::NotFound("orders".to_string()));

        let err = client.fetch_collection("broken").await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)), "got {:?}", err);

        let err = client.fetch_collection("fails").await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_dot_segment_names_are_rejected() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new().fallback({
            let hits = Arc::clone(&hits);
            move || async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(vec!["users"])
            }
        });
        let client = client_for(router).await;

        for name in ["..", ".", ""] {
            let err = client.fetch_collection(name).await.unwrap_err();
            assert_eq!(err, ClientError::InvalidName(name.to_string()));
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        // Dots inside a longer name are an ordinary segment
        client.fetch_collection("..a").await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = RestClient::new(ClientConfig {
            base_url: format!("http://{}", addr),
            ..ClientConfig::default()
        })
        .unwrap();

        let err = client.list_collection_names().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)), "got {:?}", err);
    }
}
