//! Mock catalog source for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::catalog::{CatalogSource, LoadError};

/// Mock implementation of the CatalogSource trait.
///
/// Provides controllable behavior for testing:
/// - Serve configurable catalog bytes
/// - Count fetches for assertions
/// - Simulate slow sources and failures
///
/// # Example
///
/// ```rust,ignore
/// use arcpace_core::testing::{fixtures, MockCatalogSource};
///
/// let source = MockCatalogSource::new();
/// source.set_document(fixtures::catalog_json(&fixtures::sample_arcs())).await;
///
/// let store = CatalogStore::new(Arc::new(source), Arc::new(TitleNormalizer::default()));
/// store.refresh(&CancellationToken::new()).await?;
/// ```
#[derive(Debug)]
pub struct MockCatalogSource {
    /// Bytes returned by the next fetch.
    document: Arc<RwLock<Vec<u8>>>,
    /// Artificial latency applied to each fetch.
    delay: Arc<RwLock<Option<Duration>>>,
    /// Number of fetches performed.
    fetch_count: Arc<RwLock<u32>>,
    /// If set, the next fetch will fail with this error.
    next_error: Arc<RwLock<Option<LoadError>>>,
}

impl Default for MockCatalogSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalogSource {
    /// Create a source serving an empty catalog.
    pub fn new() -> Self {
        Self {
            document: Arc::new(RwLock::new(br#"{"arcs": []}"#.to_vec())),
            delay: Arc::new(RwLock::new(None)),
            fetch_count: Arc::new(RwLock::new(0)),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Replace the served catalog bytes.
    pub async fn set_document(&self, bytes: Vec<u8>) {
        *self.document.write().await = bytes;
    }

    /// Delay every fetch by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Remove any fetch delay.
    pub async fn clear_delay(&self) {
        *self.delay.write().await = None;
    }

    /// Get the number of fetches performed.
    pub async fn fetch_count(&self) -> u32 {
        *self.fetch_count.read().await
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: LoadError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }
}

#[async_trait]
impl CatalogSource for MockCatalogSource {
    fn describe(&self) -> String {
        "mock".to_string()
    }

    async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        *self.fetch_count.write().await += 1;

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(self.document.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_document_and_counts() {
        let source = MockCatalogSource::new();
        source.set_document(b"abc".to_vec()).await;

        assert_eq!(source.fetch().await.unwrap(), b"abc".to_vec());
        assert_eq!(source.fetch_count().await, 1);
    }

    #[tokio::test]
    async fn test_error_injection_is_one_shot() {
        let source = MockCatalogSource::new();
        source.set_next_error(LoadError::Status { status: 500 }).await;

        assert!(source.fetch().await.is_err());
        assert!(source.fetch().await.is_ok());
    }
}
