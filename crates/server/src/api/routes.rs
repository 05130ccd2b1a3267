use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{arcs, catalog, handlers, images, middleware::metrics_middleware, preferences};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Catalog
        .route("/catalog", get(catalog::get_catalog))
        .route("/catalog/refresh", post(catalog::refresh_catalog))
        // Arcs
        .route("/arcs/{number}", get(arcs::get_arc))
        .route("/arcs/{number}/cover-art", get(arcs::get_cover_art))
        // Identification and images
        .route("/identify", get(images::identify))
        .route("/images", get(images::get_images))
        .route("/images/fetch", get(images::fetch_image))
        // Preferences
        .route(
            "/preferences",
            get(preferences::get_preferences).put(preferences::update_preferences),
        )
        .with_state(Arc::clone(&state));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
