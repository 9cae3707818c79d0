//! Search operation handlers
//!
//! The search family accepts the same request shape as query parameters
//! (GET) and as a JSON body (POST); both route into `SearchService`.

use crate::db::search::SearchRequest;
use crate::services::search::{CountResponse, SearchResponse};
use crate::state::AppState;
use crate::Result;
use axum::{
    extract::{Query, State},
    Json,
};

/// Standard search: free text, tags, region, and geospatial filters with
/// cursor pagination (GET /api/places/search).
pub async fn search_places(
    State(state): State<AppState>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    Ok(Json(state.search_service.search(request).await?))
}

/// Same operation with a JSON body (POST /api/places/search).
pub async fn search_places_body(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    Ok(Json(state.search_service.search(request).await?))
}

/// Count-only variant: how many rows the filter matches, without
/// materializing a page (GET /api/places/search/count).
pub async fn count_places(
    State(state): State<AppState>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<CountResponse>> {
    Ok(Json(state.search_service.count(request).await?))
}

/// Popularity shortcut (GET /api/places/popular).
pub async fn popular_places(
    State(state): State<AppState>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    Ok(Json(state.search_service.search_popular(request).await?))
}

/// Recency shortcut (GET /api/places/recent).
pub async fn recent_places(
    State(state): State<AppState>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    Ok(Json(state.search_service.search_recent(request).await?))
}
