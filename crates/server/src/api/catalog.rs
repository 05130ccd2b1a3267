//! Catalog API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use arcpace_core::{LoadError, SnapshotInfo};

use super::handlers::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub loaded: bool,
    pub source: String,
    pub snapshot: SnapshotInfo,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/catalog
///
/// Describe the active catalog snapshot.
pub async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    let store = state.store();
    Json(CatalogResponse {
        loaded: store.is_loaded(),
        source: store.source_description(),
        snapshot: store.snapshot().info(),
    })
}

/// POST /api/v1/catalog/refresh
///
/// Reload the catalog now. On failure the previous snapshot stays active.
pub async fn refresh_catalog(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CatalogResponse>, impl IntoResponse> {
    let store = state.store();
    let cancel = state.shutdown_token().child_token();

    match store.refresh(&cancel).await {
        Ok(snapshot) => Ok(Json(CatalogResponse {
            loaded: true,
            source: store.source_description(),
            snapshot: snapshot.info(),
        })),
        Err(e) => {
            let status = match e {
                LoadError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                LoadError::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            };
            Err((
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}
