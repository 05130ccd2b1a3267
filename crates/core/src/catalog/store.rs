//! Publishes the active catalog snapshot.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{CatalogSnapshot, CatalogSource, LoadError};
use crate::identifier::TitleNormalizer;
use crate::metrics::{
    CATALOG_ARCS, CATALOG_GENERATION, CATALOG_REFRESHES, CATALOG_REFRESH_DURATION,
};

/// Holds the active catalog snapshot and replaces it on refresh.
///
/// - Readers get cheap snapshots (`Arc` clone under a short read lock)
/// - Refreshes build a complete new snapshot, then swap the pointer
/// - A failed or cancelled refresh leaves the active snapshot untouched
pub struct CatalogStore {
    source: Arc<dyn CatalogSource>,
    normalizer: Arc<TitleNormalizer>,
    current: RwLock<Arc<CatalogSnapshot>>,
    /// Serializes refreshes so generations increase monotonically.
    refresh_lock: tokio::sync::Mutex<()>,
}

impl CatalogStore {
    /// Create a store with an empty (generation 0) snapshot.
    pub fn new(source: Arc<dyn CatalogSource>, normalizer: Arc<TitleNormalizer>) -> Self {
        let empty = Arc::new(CatalogSnapshot::empty(Arc::clone(&normalizer)));
        Self {
            source,
            normalizer,
            current: RwLock::new(empty),
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Whether at least one load has been published.
    pub fn is_loaded(&self) -> bool {
        self.snapshot().generation() > 0
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Fetch, parse and index the catalog without publishing it.
    ///
    /// The returned snapshot carries the generation it would get if published next.
    pub async fn load(&self, cancel: &CancellationToken) -> Result<CatalogSnapshot, LoadError> {
        let generation = self.snapshot().generation() + 1;
        self.load_generation(generation, cancel).await
    }

    /// Load the catalog and atomically publish it.
    ///
    /// On error the previous snapshot stays active and the error is returned.
    pub async fn refresh(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<CatalogSnapshot>, LoadError> {
        let _guard = self.refresh_lock.lock().await;
        let start = Instant::now();
        let generation = self.snapshot().generation() + 1;

        let result = self.load_generation(generation, cancel).await;
        let elapsed = start.elapsed().as_secs_f64();

        let snapshot = match result {
            Ok(snapshot) if !cancel.is_cancelled() => Arc::new(snapshot),
            Ok(_) | Err(LoadError::Cancelled) => {
                CATALOG_REFRESHES.with_label_values(&["cancelled"]).inc();
                CATALOG_REFRESH_DURATION
                    .with_label_values(&["cancelled"])
                    .observe(elapsed);
                debug!("Catalog refresh from {} cancelled", self.source.describe());
                return Err(LoadError::Cancelled);
            }
            Err(e) => {
                CATALOG_REFRESHES.with_label_values(&["failed"]).inc();
                CATALOG_REFRESH_DURATION
                    .with_label_values(&["failed"])
                    .observe(elapsed);
                warn!(
                    "Catalog refresh from {} failed, keeping generation {}: {}",
                    self.source.describe(),
                    generation - 1,
                    e
                );
                return Err(e);
            }
        };

        {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            *current = Arc::clone(&snapshot);
        }

        CATALOG_REFRESHES.with_label_values(&["success"]).inc();
        CATALOG_REFRESH_DURATION
            .with_label_values(&["success"])
            .observe(elapsed);
        CATALOG_ARCS.set(snapshot.len() as i64);
        CATALOG_GENERATION.set(snapshot.generation() as i64);

        info!(
            "Catalog generation {} published: {} arcs (version {:?}, sha256 {})",
            snapshot.generation(),
            snapshot.len(),
            snapshot.version(),
            &snapshot.fingerprint()[..12.min(snapshot.fingerprint().len())]
        );

        Ok(snapshot)
    }

    /// Refresh on a fixed interval until `cancel` fires.
    ///
    /// The first refresh happens one interval after spawning; callers do the
    /// initial load themselves. Failures are logged by `refresh` and retried
    /// on the next tick.
    pub fn spawn_refresh_loop(
        self: Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Skip the immediate first tick
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("Catalog refresh loop stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let _ = self.refresh(&cancel).await;
                    }
                }
            }
        })
    }

    async fn load_generation(
        &self,
        generation: u64,
        cancel: &CancellationToken,
    ) -> Result<CatalogSnapshot, LoadError> {
        let bytes = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LoadError::Cancelled),
            result = self.source.fetch() => result?,
        };

        CatalogSnapshot::from_bytes(&bytes, generation, Arc::clone(&self.normalizer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockCatalogSource};

    fn store_with(source: Arc<MockCatalogSource>) -> CatalogStore {
        CatalogStore::new(source, Arc::new(TitleNormalizer::default()))
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let store = store_with(Arc::new(MockCatalogSource::new()));
        assert!(!store.is_loaded());
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_publishes_snapshot() {
        let source = Arc::new(MockCatalogSource::new());
        source.set_document(fixtures::catalog_json(&fixtures::sample_arcs())).await;
        let store = store_with(Arc::clone(&source));

        let published = store.refresh(&CancellationToken::new()).await.unwrap();
        assert_eq!(published.generation(), 1);
        assert!(store.is_loaded());
        assert_eq!(store.snapshot().len(), fixtures::sample_arcs().len());
    }

    #[tokio::test]
    async fn test_generations_increase() {
        let source = Arc::new(MockCatalogSource::new());
        source.set_document(fixtures::catalog_json(&fixtures::sample_arcs())).await;
        let store = store_with(Arc::clone(&source));
        let cancel = CancellationToken::new();

        tokio_test::assert_ok!(store.refresh(&cancel).await);
        tokio_test::assert_ok!(store.refresh(&cancel).await);
        assert_eq!(store.snapshot().generation(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let source = Arc::new(MockCatalogSource::new());
        source.set_document(fixtures::catalog_json(&fixtures::sample_arcs())).await;
        let store = store_with(Arc::clone(&source));
        let cancel = CancellationToken::new();

        let first = store.refresh(&cancel).await.unwrap();

        source.set_document(b"{ broken".to_vec()).await;
        let result = store.refresh(&cancel).await;
        assert!(matches!(result, Err(LoadError::Parse(_))));

        let current = store.snapshot();
        assert!(Arc::ptr_eq(&first, &current));
        assert_eq!(current.get(18).unwrap().canonical_title, "Water Seven");
    }

    #[tokio::test]
    async fn test_source_error_is_reported() {
        let source = Arc::new(MockCatalogSource::new());
        source
            .set_next_error(LoadError::Status { status: 502 })
            .await;
        let store = store_with(Arc::clone(&source));

        let result = store.refresh(&CancellationToken::new()).await;
        assert!(matches!(result, Err(LoadError::Status { status: 502 })));
        assert!(!store.is_loaded());
    }

    #[tokio::test]
    async fn test_cancelled_refresh_does_not_publish() {
        let source = Arc::new(MockCatalogSource::new());
        source.set_document(fixtures::catalog_json(&fixtures::sample_arcs())).await;
        source.set_delay(Duration::from_secs(30)).await;
        let store = store_with(Arc::clone(&source));

        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = store.refresh(&cancel).await;
        assert!(matches!(result, Err(LoadError::Cancelled)));
        assert_eq!(store.snapshot().generation(), 0);
    }

    #[tokio::test]
    async fn test_load_does_not_publish() {
        let source = Arc::new(MockCatalogSource::new());
        source.set_document(fixtures::catalog_json(&fixtures::sample_arcs())).await;
        let store = store_with(Arc::clone(&source));

        let loaded = store.load(&CancellationToken::new()).await.unwrap();
        assert_eq!(loaded.generation(), 1);
        assert!(!store.is_loaded());
    }

    #[tokio::test]
    async fn test_refresh_loop_stops_on_cancel() {
        let source = Arc::new(MockCatalogSource::new());
        source.set_document(fixtures::catalog_json(&fixtures::sample_arcs())).await;
        let store = Arc::new(store_with(Arc::clone(&source)));

        let cancel = CancellationToken::new();
        let handle = Arc::clone(&store).spawn_refresh_loop(Duration::from_millis(10), cancel.clone());

        tokio::time::sleep(Duration::from_millis(60)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert!(store.snapshot().generation() >= 1);
        assert!(source.fetch_count().await >= 1);
    }
}
