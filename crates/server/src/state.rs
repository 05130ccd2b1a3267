use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use arcpace_core::{
    ArcRepository, ArtSource, ArtworkPreferences, CatalogStore, Config, ImageResolutionService,
    ProviderScope, SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    repository: Arc<ArcRepository>,
    preferences: Arc<ArtworkPreferences>,
    /// One provider per scope: all sources, then each single source.
    providers: Vec<Arc<ImageResolutionService>>,
    shutdown: CancellationToken,
}

impl AppState {
    /// Build state around a provider for [`ProviderScope::All`].
    ///
    /// Single-source providers share its repository, identifier, fetcher and
    /// preferences.
    pub fn new(config: Config, service: ImageResolutionService, shutdown: CancellationToken) -> Self {
        let repository = Arc::clone(service.repository());
        let preferences = Arc::clone(service.preferences());

        let mut providers = vec![Arc::new(service.clone_with_scope(ProviderScope::All))];
        providers.extend(ArtSource::ALL.iter().map(|&source| {
            Arc::new(service.clone_with_scope(ProviderScope::Source(source)))
        }));

        Self {
            config,
            repository,
            preferences,
            providers,
            shutdown,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        self.repository.store()
    }

    pub fn repository(&self) -> &ArcRepository {
        self.repository.as_ref()
    }

    pub fn preferences(&self) -> &ArtworkPreferences {
        self.preferences.as_ref()
    }

    /// The provider serving `scope`.
    pub fn provider(&self, scope: ProviderScope) -> &ImageResolutionService {
        self.providers
            .iter()
            .find(|p| p.scope() == scope)
            .unwrap_or(&self.providers[0])
    }

    /// Token cancelled when the server shuts down.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }
}
