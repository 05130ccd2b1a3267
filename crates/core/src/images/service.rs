//! Image resolution service.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{
    ArtworkPreferences, FetchError, ImageDescriptor, ImageFetcher, ImageKind, ImageResponse,
    RemoteImageProvider,
};
use crate::catalog::{ArtSource, CatalogSnapshot};
use crate::identifier::{ArcIdentifier, LookupInfo, LookupKind, MatchResult};
use crate::metrics::{IDENTIFICATIONS, IMAGES_RESOLVED, IMAGE_FETCHES};
use crate::repository::ArcRepository;

/// Which art sources a provider returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderScope {
    /// Art from every source, ranked by the current preference.
    #[default]
    All,
    /// Only art from one source.
    Source(ArtSource),
}

impl ProviderScope {
    /// Parse a scope tag (`all` or a source tag).
    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Some(ProviderScope::All);
        }
        ArtSource::parse(value).map(ProviderScope::Source)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderScope::All => "all",
            ProviderScope::Source(source) => source.as_str(),
        }
    }

    /// The source this provider represents when ranked against other providers.
    fn own_source(&self) -> ArtSource {
        match self {
            ProviderScope::All => ArtSource::Website,
            ProviderScope::Source(source) => *source,
        }
    }

    fn includes(&self, source: ArtSource) -> bool {
        match self {
            ProviderScope::All => true,
            ProviderScope::Source(own) => *own == source,
        }
    }
}

/// Resolves library entries to ranked cover art.
///
/// Identification and cover art lookup run against one snapshot, so a
/// concurrent refresh never mixes two catalog versions in one answer.
pub struct ImageResolutionService {
    name: String,
    scope: ProviderScope,
    repository: Arc<ArcRepository>,
    identifier: ArcIdentifier,
    fetcher: Arc<dyn ImageFetcher>,
    preferences: Arc<ArtworkPreferences>,
}

impl ImageResolutionService {
    pub fn new(
        name: impl Into<String>,
        repository: Arc<ArcRepository>,
        identifier: ArcIdentifier,
        fetcher: Arc<dyn ImageFetcher>,
        preferences: Arc<ArtworkPreferences>,
    ) -> Self {
        Self {
            name: name.into(),
            scope: ProviderScope::All,
            repository,
            identifier,
            fetcher,
            preferences,
        }
    }

    /// Restrict this provider to one art source.
    pub fn with_scope(mut self, scope: ProviderScope) -> Self {
        self.scope = scope;
        self
    }

    /// A provider sharing this one's catalog, fetcher and preferences.
    pub fn clone_with_scope(&self, scope: ProviderScope) -> Self {
        Self {
            name: self.name.clone(),
            scope,
            repository: Arc::clone(&self.repository),
            identifier: self.identifier.clone(),
            fetcher: Arc::clone(&self.fetcher),
            preferences: Arc::clone(&self.preferences),
        }
    }

    pub fn scope(&self) -> ProviderScope {
        self.scope
    }

    pub fn repository(&self) -> &Arc<ArcRepository> {
        &self.repository
    }

    pub fn preferences(&self) -> &Arc<ArtworkPreferences> {
        &self.preferences
    }

    /// Identify the arc for `lookup` on the active snapshot.
    pub fn identify(&self, lookup: &LookupInfo) -> Option<MatchResult> {
        let snapshot = self.repository.current_snapshot();
        self.identify_in(&snapshot, lookup)
    }

    /// Ranked image descriptors for `lookup`. Empty when nothing matches.
    pub fn resolve_images(&self, lookup: &LookupInfo) -> Vec<ImageDescriptor> {
        let snapshot = self.repository.current_snapshot();
        self.resolve_in(&snapshot, lookup)
    }

    /// Ranked image descriptors for `lookup` on a specific snapshot.
    pub fn resolve_in(&self, snapshot: &CatalogSnapshot, lookup: &LookupInfo) -> Vec<ImageDescriptor> {
        if !self.supports(lookup) {
            return Vec::new();
        }

        let Some(matched) = self.identify_in(snapshot, lookup) else {
            IMAGES_RESOLVED
                .with_label_values(&[self.scope.as_str()])
                .observe(0.0);
            return Vec::new();
        };

        let preference = self.preferences.source_preference();
        let art = self
            .repository
            .cover_art_in(snapshot, matched.number, preference);

        let images: Vec<ImageDescriptor> = art
            .iter()
            .filter(|candidate| self.scope.includes(candidate.source))
            .map(|candidate| ImageDescriptor {
                kind: ImageKind::Primary,
                url: candidate.url.clone(),
                width: candidate.width,
                provider_name: self.name.clone(),
                source: candidate.source,
            })
            .collect();

        IMAGES_RESOLVED
            .with_label_values(&[self.scope.as_str()])
            .observe(images.len() as f64);
        debug!(
            "Resolved {} image(s) for '{}' via arc {} (generation {})",
            images.len(),
            lookup.name,
            matched.number,
            snapshot.generation()
        );

        images
    }

    /// Provider ordering: 0 when this provider's source is the preferred one.
    pub fn priority(&self) -> u32 {
        let preferred = self.preferences.source_preference().preferred();
        if self.scope.own_source() == preferred {
            0
        } else {
            1
        }
    }

    /// Fetch image bytes, abandoning the request if `cancel` fires.
    pub async fn fetch_bytes(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<ImageResponse, FetchError> {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            result = self.fetcher.fetch(url) => result,
        };

        let label = match &result {
            Ok(_) => "success",
            Err(FetchError::Cancelled) => "cancelled",
            Err(_) => "failed",
        };
        IMAGE_FETCHES.with_label_values(&[label]).inc();

        if let Err(e) = &result {
            debug!("Image fetch for {} failed: {}", url, e);
        }

        result
    }

    fn identify_in(&self, snapshot: &CatalogSnapshot, lookup: &LookupInfo) -> Option<MatchResult> {
        let result = self.identifier.identify(lookup, snapshot);
        let method = result.as_ref().map_or("none", |m| m.method.as_str());
        IDENTIFICATIONS.with_label_values(&[method]).inc();

        match &result {
            Some(m) => debug!(
                "Identified '{}' as arc {} ({})",
                lookup.name,
                m.number,
                m.method.as_str()
            ),
            None => debug!("No arc matches '{}'", lookup.name),
        }

        result
    }
}

#[async_trait]
impl RemoteImageProvider for ImageResolutionService {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u32 {
        ImageResolutionService::priority(self)
    }

    fn supports(&self, lookup: &LookupInfo) -> bool {
        lookup.kind == LookupKind::Season
    }

    fn supported_images(&self, lookup: &LookupInfo) -> Vec<ImageKind> {
        if self.supports(lookup) {
            vec![ImageKind::Primary]
        } else {
            Vec::new()
        }
    }

    async fn get_images(&self, lookup: &LookupInfo) -> Vec<ImageDescriptor> {
        self.resolve_images(lookup)
    }

    async fn fetch_bytes(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<ImageResponse, FetchError> {
        ImageResolutionService::fetch_bytes(self, url, cancel).await
    }
}
