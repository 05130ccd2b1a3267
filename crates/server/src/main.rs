use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arcpace_core::{
    create_catalog_source, identifier::ArcIdentifier, load_config, validate_config,
    ArcRepository, ArtworkPreferences, CatalogStore, HttpImageFetcher, ImageFetcher,
    ImageResolutionService,
};
use arcpace_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("arcpace {} starting", VERSION);

    // Determine config path
    let config_path = std::env::var("ARCPACE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Catalog source: {:?}", config.catalog.source);
    info!(
        "Artwork: provider '{}', prefer community art: {}",
        config.artwork.provider_name, config.artwork.prefer_community_art
    );

    // Build the catalog store
    let normalizer = Arc::new(
        config
            .matcher
            .build_normalizer()
            .context("Failed to compile matcher prefix patterns")?,
    );
    let source = create_catalog_source(&config.catalog).context("Failed to create catalog source")?;
    let store = Arc::new(CatalogStore::new(source, normalizer));
    info!("Catalog store initialized ({})", store.source_description());

    let shutdown = CancellationToken::new();

    // Initial load. The server still starts on failure and keeps retrying on schedule.
    match store.refresh(&shutdown).await {
        Ok(snapshot) => info!("Initial catalog loaded: {} arcs", snapshot.len()),
        Err(e) => error!("Initial catalog load failed, serving empty catalog: {}", e),
    }

    let refresh_handle = match config.catalog.refresh_interval() {
        Some(interval) => {
            info!("Catalog refresh every {:?}", interval);
            Some(Arc::clone(&store).spawn_refresh_loop(interval, shutdown.clone()))
        }
        None => {
            info!("Catalog background refresh disabled");
            None
        }
    };

    // Build the image resolution service
    let repository =
        Arc::new(ArcRepository::new(Arc::clone(&store)).with_dedupe(config.artwork.dedupe_urls));
    let fetcher: Arc<dyn ImageFetcher> = Arc::new(
        HttpImageFetcher::new(config.artwork.fetch_timeout())
            .context("Failed to create image fetcher")?,
    );
    let preferences = Arc::new(ArtworkPreferences::new(config.artwork.prefer_community_art));
    let service = ImageResolutionService::new(
        config.artwork.provider_name.clone(),
        repository,
        ArcIdentifier::with_config(config.matcher.identifier_config()),
        fetcher,
        preferences,
    );

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), service, shutdown.clone()));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    shutdown.cancel();

    if let Some(handle) = refresh_handle {
        if let Err(e) = handle.await {
            warn!("Catalog refresh task ended abnormally: {}", e);
        }
        info!("Catalog refresh loop stopped");
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM), then cancel in-flight work
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    shutdown.cancel();
}
