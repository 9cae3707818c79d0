//! Place CRUD handlers

use crate::models::{ActivateRequest, RegisterPlaceRequest, UpdatePlaceRequest};
use crate::services::places::{PlaceDetail, RegisteredPlace};
use crate::state::AppState;
use crate::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

/// Register a new place (POST /api/places). New places start PENDING and
/// inactive; they surface in search after moderation and activation.
pub async fn register_place(
    State(state): State<AppState>,
    Json(request): Json<RegisterPlaceRequest>,
) -> Result<(StatusCode, Json<RegisteredPlace>)> {
    let registered = state.place_service.register(request).await?;
    Ok((StatusCode::CREATED, Json(registered)))
}

/// Read a place (GET /api/places/:id).
pub async fn get_place(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PlaceDetail>> {
    Ok(Json(state.place_service.get(id).await?))
}

/// Replace the mutable sections of a place (PUT /api/places/:id).
pub async fn update_place(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdatePlaceRequest>,
) -> Result<StatusCode> {
    state.place_service.update(id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Soft delete (DELETE /api/places/:id); the row stays for audit but
/// never appears in reads again.
pub async fn delete_place(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.place_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Toggle the activation flag (POST /api/places/:id/activate).
pub async fn activate_place(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ActivateRequest>,
) -> Result<StatusCode> {
    state.place_service.set_active(id, request.active).await?;
    Ok(StatusCode::NO_CONTENT)
}
