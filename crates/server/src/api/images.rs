//! Identification and image resolution handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use arcpace_core::{
    FetchError, ImageDescriptor, LookupInfo, LookupKind, MatchResult, ProviderScope,
    RemoteImageProvider,
};

use super::handlers::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub name: String,
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub kind: Option<LookupKind>,
    /// `all`, `website` or `community_chat` (images only)
    #[serde(default)]
    pub scope: Option<String>,
}

impl LookupParams {
    fn lookup(&self) -> LookupInfo {
        LookupInfo::season(self.name.clone(), self.index).with_kind(self.kind.unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
pub struct FetchParams {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct IdentifyResponse {
    pub lookup: LookupInfo,
    #[serde(rename = "match")]
    pub matched: Option<MatchResult>,
}

#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    pub provider: String,
    pub scope: String,
    pub priority: u32,
    pub images: Vec<ImageDescriptor>,
}

fn bad_request(error: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/identify?name=&index=
///
/// Which arc a library entry maps to. A missing match is `null`, not an error.
pub async fn identify(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupParams>,
) -> Json<IdentifyResponse> {
    let lookup = params.lookup();
    let matched = state.provider(ProviderScope::All).identify(&lookup);
    Json(IdentifyResponse { lookup, matched })
}

/// GET /api/v1/images?name=&index=&scope=
///
/// Ranked image descriptors for a library entry.
pub async fn get_images(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupParams>,
) -> Result<Json<ImagesResponse>, Response> {
    let scope = match params.scope.as_deref() {
        None => ProviderScope::All,
        Some(raw) => ProviderScope::parse(raw)
            .ok_or_else(|| bad_request(format!("Unknown scope: {}", raw)))?,
    };

    let provider = state.provider(scope);
    let images = provider.resolve_images(&params.lookup());

    Ok(Json(ImagesResponse {
        provider: provider.name().to_string(),
        scope: scope.as_str().to_string(),
        priority: provider.priority(),
        images,
    }))
}

/// GET /api/v1/images/fetch?url=
///
/// Proxy the bytes behind a cover art URL of the active catalog.
///
/// URLs the catalog does not list are rejected with 404.
pub async fn fetch_image(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FetchParams>,
) -> Response {
    if !state.store().snapshot().has_cover_art_url(&params.url) {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Not a catalog cover art URL: {}", params.url),
            }),
        )
            .into_response();
    }

    let cancel = state.shutdown_token().child_token();
    let provider = state.provider(ProviderScope::All);

    match provider.fetch_bytes(&params.url, &cancel).await {
        Ok(image) => {
            let content_type = image
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string());
            ([(header::CONTENT_TYPE, content_type)], image.bytes).into_response()
        }
        Err(e) => {
            let status = match e {
                FetchError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
                FetchError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                FetchError::Status { .. } | FetchError::Http(_) => StatusCode::BAD_GATEWAY,
            };
            (
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
