//! Mock image fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::images::{FetchError, ImageFetcher, ImageResponse};

/// A recorded fetch for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedFetch {
    /// The URL that was fetched.
    pub url: String,
    /// When the fetch was made.
    pub timestamp: Instant,
}

/// Mock implementation of the ImageFetcher trait.
///
/// Provides controllable behavior for testing:
/// - Serve configured responses by URL (unknown URLs return 404)
/// - Track fetched URLs for assertions
/// - Simulate failures and slow hosts
///
/// # Example
///
/// ```rust,ignore
/// use arcpace_core::testing::{fixtures, MockImageFetcher};
///
/// let fetcher = MockImageFetcher::new();
/// fetcher.set_response(fixtures::image_response("https://img.example/18.png")).await;
///
/// let response = fetcher.fetch("https://img.example/18.png").await?;
/// assert_eq!(response.status, 200);
/// assert_eq!(fetcher.recorded_fetches().await.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockImageFetcher {
    /// Configured responses keyed by URL.
    responses: Arc<RwLock<HashMap<String, ImageResponse>>>,
    /// Recorded fetches.
    fetches: Arc<RwLock<Vec<RecordedFetch>>>,
    /// If set, the next fetch will fail with this error.
    next_error: Arc<RwLock<Option<FetchError>>>,
    /// Artificial latency applied to each fetch.
    delay: Arc<RwLock<Option<Duration>>>,
}

impl Default for MockImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockImageFetcher {
    /// Create a new mock fetcher with no responses.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            fetches: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(None)),
        }
    }

    /// Serve `response` for its URL.
    pub async fn set_response(&self, response: ImageResponse) {
        self.responses
            .write()
            .await
            .insert(response.url.clone(), response);
    }

    /// Get all recorded fetches.
    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.read().await.clone()
    }

    /// Clear recorded fetches.
    pub async fn clear_recorded(&self) {
        self.fetches.write().await.clear();
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: FetchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Delay every fetch by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }
}

#[async_trait]
impl ImageFetcher for MockImageFetcher {
    async fn fetch(&self, url: &str) -> Result<ImageResponse, FetchError> {
        self.fetches.write().await.push(RecordedFetch {
            url: url.to_string(),
            timestamp: Instant::now(),
        });

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .read()
            .await
            .get(url)
            .cloned()
            .ok_or(FetchError::Status { status: 404 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_serves_configured_response() {
        let fetcher = MockImageFetcher::new();
        fetcher
            .set_response(fixtures::image_response("https://img.example/a.png"))
            .await;

        let response = fetcher.fetch("https://img.example/a.png").await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn test_unknown_url_is_not_found() {
        let fetcher = MockImageFetcher::new();
        let result = fetcher.fetch("https://img.example/missing.png").await;
        assert!(matches!(result, Err(FetchError::Status { status: 404 })));
    }

    #[tokio::test]
    async fn test_next_error_applies_once() {
        let fetcher = MockImageFetcher::new();
        fetcher
            .set_response(fixtures::image_response("https://img.example/a.png"))
            .await;
        fetcher.set_next_error(FetchError::Status { status: 503 }).await;

        assert!(fetcher.fetch("https://img.example/a.png").await.is_err());
        assert!(fetcher.fetch("https://img.example/a.png").await.is_ok());
        assert_eq!(fetcher.recorded_fetches().await.len(), 2);
    }
}
