//! Artwork preference handlers.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct PreferencesBody {
    pub prefer_community_art: bool,
}

/// GET /api/v1/preferences
pub async fn get_preferences(State(state): State<Arc<AppState>>) -> Json<PreferencesBody> {
    Json(PreferencesBody {
        prefer_community_art: state.preferences().prefer_community_art(),
    })
}

/// PUT /api/v1/preferences
///
/// Takes effect on the next lookup.
pub async fn update_preferences(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PreferencesBody>,
) -> Json<PreferencesBody> {
    state
        .preferences()
        .set_prefer_community_art(body.prefer_community_art);
    info!(
        "Artwork preference updated: prefer_community_art = {}",
        body.prefer_community_art
    );
    Json(body)
}
