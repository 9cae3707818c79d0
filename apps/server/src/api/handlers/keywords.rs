//! Keyword master-data handler

use crate::models::Keyword;
use crate::state::AppState;
use crate::Result;
use axum::{extract::State, Json};

/// List all keywords (GET /api/keywords).
pub async fn list_keywords(State(state): State<AppState>) -> Result<Json<Vec<Keyword>>> {
    Ok(Json(state.place_service.keywords().await?))
}
