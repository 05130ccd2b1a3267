//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, enabling E2E testing without a real
//! catalog host or image CDN.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use arcpace_core::{
    config::{ArtworkConfig, CatalogConfig, MatcherConfig, ServerConfig},
    testing::{MockCatalogSource, MockImageFetcher},
    ArcIdentifier, ArcRepository, ArtworkPreferences, CatalogSourceKind, CatalogStore, Config,
    ImageFetcher, ImageResolutionService, TitleNormalizer,
};

/// Re-export fixtures for test convenience
pub use arcpace_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for:
/// - Catalog source (MockCatalogSource)
/// - Image fetcher (MockImageFetcher)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_identify() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.get("/api/v1/identify?name=Water%20Seven").await;
///
///     assert_eq!(response.body["match"]["number"], 18);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock catalog source - serve catalog documents
    pub source: Arc<MockCatalogSource>,
    /// Mock image fetcher - configure image responses
    pub fetcher: Arc<MockImageFetcher>,
    /// Catalog store behind the router
    pub store: Arc<CatalogStore>,
    /// Cancelled to simulate shutdown
    pub shutdown: CancellationToken,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Raw (non-JSON) response from a test request
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl TestFixture {
    /// Create a new test fixture with the sample catalog loaded.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        // Create mocks
        let source = Arc::new(MockCatalogSource::new());
        source
            .set_document(fixtures::catalog_json(&fixtures::sample_arcs()))
            .await;
        let fetcher = Arc::new(MockImageFetcher::new());

        // Create config
        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            catalog: CatalogConfig {
                source: CatalogSourceKind::File,
                path: Some(PathBuf::from("arcs.json")),
                url: None,
                timeout_secs: 5,
                refresh_interval_secs: 0,
            },
            artwork: ArtworkConfig {
                prefer_community_art: test_config.prefer_community_art,
                ..Default::default()
            },
            matcher: MatcherConfig::default(),
        };

        let store = Arc::new(CatalogStore::new(
            Arc::clone(&source) as Arc<dyn arcpace_core::CatalogSource>,
            Arc::new(TitleNormalizer::default()),
        ));
        if test_config.load_catalog {
            store
                .refresh(&CancellationToken::new())
                .await
                .expect("Failed to load sample catalog");
        }

        let service = ImageResolutionService::new(
            config.artwork.provider_name.clone(),
            Arc::new(ArcRepository::new(Arc::clone(&store))),
            ArcIdentifier::new(),
            Arc::clone(&fetcher) as Arc<dyn ImageFetcher>,
            Arc::new(ArtworkPreferences::new(config.artwork.prefer_community_art)),
        );

        let shutdown = CancellationToken::new();

        // Create app state with mocks
        let state = Arc::new(arcpace_server::state::AppState::new(
            config,
            service,
            shutdown.clone(),
        ));

        // Create router
        let router = arcpace_server::api::create_router(state);

        Self {
            router,
            source,
            fetcher,
            store,
            shutdown,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a GET request and keep the raw body.
    pub async fn get_raw(&self, path: &str) -> RawResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        RawResponse {
            status,
            content_type,
            bytes,
        }
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Load the sample catalog before building the router
    pub load_catalog: bool,
    /// Initial artwork preference
    pub prefer_community_art: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            load_catalog: true,
            prefer_community_art: false,
        }
    }
}

impl TestConfig {
    /// Create config that starts with no catalog loaded.
    pub fn unloaded() -> Self {
        Self {
            load_catalog: false,
            ..Default::default()
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
