//! Moderation handlers
//!
//! These routes assume a trusted caller; authentication sits in the
//! gateway in front of this service.

use crate::models::{ApprovalRequest, RegistrationUpdateRequest};
use crate::state::AppState;
use crate::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

/// Approve or reject a pending place (POST /api/admin/places/:id/approval).
pub async fn set_approval(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ApprovalRequest>,
) -> Result<StatusCode> {
    state.place_service.set_approval(id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark a place registered/unregistered
/// (POST /api/admin/places/:id/registration).
pub async fn set_registration(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<RegistrationUpdateRequest>,
) -> Result<StatusCode> {
    state
        .place_service
        .set_registration(id, &request.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
