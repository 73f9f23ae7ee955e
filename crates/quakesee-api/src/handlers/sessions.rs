use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::dto::{DeleteResponse, SessionResponse};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SessionResponse>) {
    let id = state.create_session();
    tracing::info!(session = %id, "Session created");
    (StatusCode::CREATED, Json(SessionResponse { id }))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    if !state.drop_session(id) {
        return Err(ApiError::not_found(format!("Unknown session {id}")));
    }
    tracing::info!(session = %id, "Session discarded");
    Ok(Json(DeleteResponse { success: true, id }))
}
