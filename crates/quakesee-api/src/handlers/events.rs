use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Value as JsonValue};

use quakesee_core::catalog::events_csv;
use quakesee_fdsn::event::{EventClient, EventQuery};
use quakesee_fdsn::ReqwestHttp;

use crate::dto::{
    CatalogResponse, FetchEventsRequest, ImportQuery, ImportResponse, IndexedEvent, SelectEventRequest,
    SessionQuery, TimeMagnitudeResponse,
};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn fetch_events(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FetchEventsRequest>,
) -> Result<Json<CatalogResponse>, ApiError> {
    // membership check up front; the fetch itself runs without the lock
    state.with_session(request.session, |_| Ok(()))?;

    let query = EventQuery {
        start: request.start.and_time(chrono::NaiveTime::MIN).and_utc(),
        end: request.end.and_time(chrono::NaiveTime::MIN).and_utc(),
        min_magnitude: request.min_magnitude,
        limit: request.limit,
    };
    let client = EventClient::new(ReqwestHttp::new(), state.config.fdsn_url.clone());
    let events = client.fetch(&query).await?;

    tracing::info!(session = %request.session, count = events.len(), "Catalog fetched");

    state.with_session_mut(request.session, |session| {
        session.events = events;
        session.selected = None;
        Ok(Json(CatalogResponse::from_events(&session.events)))
    })
}

pub async fn import_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImportQuery>,
    body: String,
) -> Result<Json<ImportResponse>, ApiError> {
    let events = events_csv::read(&body)?;
    let count = events.len();

    state.with_session_mut(query.session, |session| {
        session.events = events;
        session.selected = None;
        Ok(())
    })?;

    Ok(Json(ImportResponse {
        success: true,
        count,
        message: format!("Imported {count} events"),
    }))
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<CatalogResponse>, ApiError> {
    state.with_session(query.session, |session| {
        Ok(Json(CatalogResponse::from_events(&session.events)))
    })
}

pub async fn select_event(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectEventRequest>,
) -> Result<Json<IndexedEvent>, ApiError> {
    state.with_session_mut(request.session, |session| {
        let event = session.events.get(request.index).cloned().ok_or_else(|| {
            ApiError::bad_request(format!(
                "Event index {} out of range ({} events)",
                request.index,
                session.events.len()
            ))
        })?;
        session.selected = Some(request.index);
        Ok(Json(IndexedEvent {
            index: request.index,
            event,
        }))
    })
}

pub async fn export_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let body = state.with_session(query.session, |session| Ok(events_csv::write(&session.events)))?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"catalog.events\""),
        ],
        body,
    ))
}

/// Map payload: one point feature per event.
pub async fn events_geojson(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<FeatureCollection>, ApiError> {
    state.with_session(query.session, |session| {
        let features = session
            .events
            .iter()
            .enumerate()
            .map(|(index, event)| {
                let mut properties = Map::new();
                properties.insert("index".to_string(), JsonValue::from(index));
                properties.insert("time".to_string(), JsonValue::from(event.time.to_rfc3339()));
                properties.insert("depth_km".to_string(), JsonValue::from(event.depth_km));
                properties.insert("magnitude".to_string(), JsonValue::from(event.magnitude));
                properties.insert(
                    "magnitude_type".to_string(),
                    JsonValue::from(event.magnitude_type.clone()),
                );

                Feature {
                    geometry: Some(Geometry::new(Value::Point(vec![
                        event.longitude,
                        event.latitude,
                    ]))),
                    properties: Some(properties),
                    id: None,
                    bbox: None,
                    foreign_members: None,
                }
            })
            .collect();

        Ok(Json(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        }))
    })
}

/// Time-magnitude series of the session catalog.
pub async fn time_magnitude(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<TimeMagnitudeResponse>, ApiError> {
    state.with_session(query.session, |session| {
        Ok(Json(TimeMagnitudeResponse {
            times: session.events.iter().map(|e| e.time).collect(),
            magnitudes: session.events.iter().map(|e| e.magnitude).collect(),
        }))
    })
}
