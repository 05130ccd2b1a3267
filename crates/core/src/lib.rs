pub mod catalog;
pub mod config;
pub mod identifier;
pub mod images;
pub mod metrics;
pub mod repository;
pub mod testing;

pub use catalog::{
    create_catalog_source, ArcRecord, ArtSource, CatalogSnapshot, CatalogSource, CatalogStore,
    CoverArtCandidate, LoadError, SnapshotInfo, SourcePreference,
};
pub use config::{
    load_config, load_config_from_str, validate_config, CatalogSourceKind, Config, ConfigError,
    SanitizedConfig,
};
pub use identifier::{
    ArcIdentifier, LookupInfo, LookupKind, MatchMethod, MatchResult, TitleNormalizer,
};
pub use images::{
    ArtworkPreferences, FetchError, HttpImageFetcher, ImageDescriptor, ImageFetcher, ImageKind,
    ImageResolutionService, ImageResponse, ProviderScope, RemoteImageProvider,
};
pub use repository::ArcRepository;
