//! Arc lookup handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use arcpace_core::{ArcRecord, CoverArtCandidate, SourcePreference};

use super::handlers::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CoverArtResponse {
    pub number: u32,
    pub preference: SourcePreference,
    pub cover_art: Vec<CoverArtCandidate>,
}

fn arc_not_found(number: u32) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Arc not found: {}", number),
        }),
    )
}

/// GET /api/v1/arcs/{number}
pub async fn get_arc(
    State(state): State<Arc<AppState>>,
    Path(number): Path<u32>,
) -> Result<Json<ArcRecord>, impl IntoResponse> {
    state
        .repository()
        .find_arc(number)
        .map(Json)
        .ok_or_else(|| arc_not_found(number))
}

/// GET /api/v1/arcs/{number}/cover-art
///
/// Cover art ranked by the current artwork preference.
pub async fn get_cover_art(
    State(state): State<Arc<AppState>>,
    Path(number): Path<u32>,
) -> Result<Json<CoverArtResponse>, impl IntoResponse> {
    let repository = state.repository();
    let snapshot = repository.current_snapshot();
    if snapshot.get(number).is_none() {
        return Err(arc_not_found(number));
    }

    let preference = state.preferences().source_preference();
    let cover_art = repository.cover_art_in(&snapshot, number, preference);

    Ok(Json(CoverArtResponse {
        number,
        preference,
        cover_art: cover_art.to_vec(),
    }))
}
