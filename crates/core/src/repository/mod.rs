//! Query facade over the active catalog snapshot.
//!
//! Lookups are synchronous and in-memory. Ranked cover art is cached for the
//! published snapshot; publishing a newer generation drops the cache.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::catalog::{
    ArcRecord, CatalogSnapshot, CatalogStore, CoverArtCandidate, LoadError, SourcePreference,
};

#[derive(Debug, Default)]
struct ArtCache {
    generation: u64,
    entries: HashMap<(u32, SourcePreference), Arc<[CoverArtCandidate]>>,
}

/// Arc and cover art lookups against the store's active snapshot.
pub struct ArcRepository {
    store: Arc<CatalogStore>,
    dedupe_urls: bool,
    cache: Mutex<ArtCache>,
}

impl ArcRepository {
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self {
            store,
            dedupe_urls: false,
            cache: Mutex::new(ArtCache::default()),
        }
    }

    /// Drop repeated URLs when ranking cover art (first occurrence wins).
    pub fn with_dedupe(mut self, dedupe_urls: bool) -> Self {
        self.dedupe_urls = dedupe_urls;
        self
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    /// The snapshot queries currently run against.
    pub fn current_snapshot(&self) -> Arc<CatalogSnapshot> {
        self.store.snapshot()
    }

    /// Look up an arc by number on the active snapshot.
    pub fn find_arc(&self, number: u32) -> Option<ArcRecord> {
        self.current_snapshot().get(number).cloned()
    }

    /// Ranked cover art for an arc, website art first.
    ///
    /// Empty when the arc is unknown or has no art.
    pub fn find_all_arc_cover_art(&self, number: u32) -> Vec<CoverArtCandidate> {
        let snapshot = self.current_snapshot();
        self.cover_art_in(&snapshot, number, SourcePreference::default())
            .to_vec()
    }

    /// Ranked cover art for an arc on a specific snapshot.
    ///
    /// Results are cached only while `snapshot` is the store's published one.
    pub fn cover_art_in(
        &self,
        snapshot: &CatalogSnapshot,
        number: u32,
        preference: SourcePreference,
    ) -> Arc<[CoverArtCandidate]> {
        let key = (number, preference);
        let generation = snapshot.generation();
        // Only the published snapshot is cached; an unpublished load can share
        // its generation with a later, different publish
        let published = std::ptr::eq(snapshot, Arc::as_ptr(&self.store.snapshot()));

        if published {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if cache.generation == generation {
                if let Some(hit) = cache.entries.get(&key) {
                    return Arc::clone(hit);
                }
            }
        }

        let ranked: Arc<[CoverArtCandidate]> = match snapshot.get(number) {
            Some(arc) => rank_cover_art(&arc.cover_art, preference, self.dedupe_urls).into(),
            None => Arc::from(Vec::new()),
        };

        if !published {
            return ranked;
        }

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if generation > cache.generation {
            debug!(
                "Cover art cache reset for generation {} (was {})",
                generation, cache.generation
            );
            cache.generation = generation;
            cache.entries.clear();
        }
        if generation == cache.generation {
            cache.entries.insert(key, Arc::clone(&ranked));
        }

        ranked
    }

    /// Reload the catalog through the store.
    pub async fn refresh(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<CatalogSnapshot>, LoadError> {
        self.store.refresh(cancel).await
    }
}

/// Order candidates by source preference, then descending width.
///
/// The sort is stable, so equal candidates keep their stored order.
pub fn rank_cover_art(
    candidates: &[CoverArtCandidate],
    preference: SourcePreference,
    dedupe_urls: bool,
) -> Vec<CoverArtCandidate> {
    let mut ranked = candidates.to_vec();
    ranked.sort_by_key(|c| (preference.rank(c.source), Reverse(c.width)));

    if dedupe_urls {
        let mut seen = HashSet::new();
        ranked.retain(|c| seen.insert(c.url.clone()));
    }

    ranked
}
