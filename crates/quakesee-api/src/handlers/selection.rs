use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::dto::{GeographicSelectionRequest, MercatorSelectionRequest, SelectionResponse, SessionQuery};
use crate::error::ApiError;
use crate::state::AppState;

/// Replace the selection with numeric bounds; the mercator side is
/// re-derived. Invalid bounds leave the stored selection untouched.
pub async fn put_geographic_selection(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GeographicSelectionRequest>,
) -> Result<Json<SelectionResponse>, ApiError> {
    state.with_session_mut(request.session, |session| {
        session.selection.set_geographic(request.rect)?;
        Ok(Json(SelectionResponse {
            geographic: session.selection.geographic(),
            mercator: session.selection.mercator(),
        }))
    })
}

/// Replace the selection with a box drawn on the map; the geographic
/// side is re-derived, latitudes clamped to the valid range.
pub async fn put_mercator_selection(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MercatorSelectionRequest>,
) -> Result<Json<SelectionResponse>, ApiError> {
    state.with_session_mut(request.session, |session| {
        session.selection.set_mercator(request.rect);
        Ok(Json(SelectionResponse {
            geographic: session.selection.geographic(),
            mercator: session.selection.mercator(),
        }))
    })
}

pub async fn get_selection(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<SelectionResponse>, ApiError> {
    state.with_session(query.session, |session| {
        Ok(Json(SelectionResponse {
            geographic: session.selection.geographic(),
            mercator: session.selection.mercator(),
        }))
    })
}
