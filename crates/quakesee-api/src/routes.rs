use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health + About
        .route("/health", get(handlers::health_check))
        .route("/api/v1/about", get(handlers::about))

        // Sessions
        .route("/api/v1/sessions", post(handlers::create_session))
        .route("/api/v1/sessions/{id}", delete(handlers::delete_session))

        // Event catalog
        .route("/api/v1/events/fetch", post(handlers::fetch_events))
        .route("/api/v1/events/import", post(handlers::import_events))
        .route("/api/v1/events", get(handlers::list_events))
        .route("/api/v1/events/geojson", get(handlers::events_geojson))
        .route("/api/v1/events/select", post(handlers::select_event))
        .route("/api/v1/events/export", get(handlers::export_events))
        .route("/api/v1/events/plot/time-magnitude", get(handlers::time_magnitude))

        // Stations
        .route("/api/v1/stations/search", post(handlers::search_stations))
        .route("/api/v1/stations/import", post(handlers::import_stations))
        .route("/api/v1/stations", get(handlers::list_stations))
        .route("/api/v1/stations/geojson", get(handlers::stations_geojson))
        .route("/api/v1/stations/export/{format}", get(handlers::export_stations))

        // Waveforms
        .route("/api/v1/waveforms/import", post(handlers::import_waveforms))
        .route("/api/v1/waveforms", get(handlers::list_waveforms))
        .route("/api/v1/waveforms/export/mseed", get(handlers::export_mseed))
        .route("/api/v1/waveforms/export/sac", get(handlers::export_sac))
        .route("/api/v1/waveforms/plot/{station}", get(handlers::plot_station))

        // Selection rectangle
        .route("/api/v1/selection/geographic", put(handlers::put_geographic_selection))
        .route("/api/v1/selection/mercator", put(handlers::put_mercator_selection))
        .route("/api/v1/selection", get(handlers::get_selection))

        // Bulk catalog download
        .route("/api/v1/bulk/download", post(handlers::bulk_download))
        .route("/api/v1/bulk/status", get(handlers::bulk_status))

        .with_state(state)
}
