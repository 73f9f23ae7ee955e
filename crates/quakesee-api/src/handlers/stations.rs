use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Duration;
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Value as JsonValue};

use quakesee_core::models::Inventory;
use quakesee_core::station::{csv, kml, seisan, stationxml, text};
use quakesee_fdsn::dataselect::{WaveformClient, WaveformPlan};
use quakesee_fdsn::station::{StationClient, StationQuery};
use quakesee_fdsn::ReqwestHttp;

use crate::dto::{ImportQuery, ImportResponse, SessionQuery, StationSearchRequest, StationSearchResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// Annular station search around the selected event, optionally pulling
/// the seismograms in the same pass.
pub async fn search_stations(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StationSearchRequest>,
) -> Result<Json<StationSearchResponse>, ApiError> {
    // snapshot what the search needs, then release the lock for the awaits
    let (event, existing) = state.with_session(request.session, |session| {
        let event = session.selected_event()?.clone();
        let existing = if session.inventory.is_empty() {
            None
        } else {
            Some(session.inventory.clone())
        };
        Ok((event, existing))
    })?;

    let start = event.time + Duration::seconds(request.start_offset_s);
    let end = event.time + Duration::seconds(request.end_offset_s);

    let mut inventory = match existing {
        Some(existing) if !request.reset_stations => existing,
        _ => {
            let client = StationClient::new(ReqwestHttp::new(), state.config.fdsn_url.clone());
            client
                .search(&StationQuery {
                    latitude: event.latitude,
                    longitude: event.longitude,
                    min_radius_deg: request.min_radius_deg,
                    max_radius_deg: request.max_radius_deg,
                    start,
                    end,
                    channel: request.channel.clone(),
                })
                .await?
        }
    };

    let mut messages = Vec::new();
    let stream = if request.fetch_waveforms {
        let client = WaveformClient::new(ReqwestHttp::new(), state.config.fdsn_url.clone());
        let plan = WaveformPlan {
            start,
            end,
            channel: request.channel.clone(),
            limit: request.limit,
            merge: request.merge,
            prune_inventory: request.prune_inventory,
        };
        Some(client.fetch(&mut inventory, &plan, |line| messages.push(line)).await?)
    } else {
        None
    };

    tracing::info!(
        session = %request.session,
        stations = inventory.len(),
        traces = stream.as_ref().map(|s| s.len()).unwrap_or(0),
        "Station search finished"
    );

    state.with_session_mut(request.session, |session| {
        let traces = stream.as_ref().map(|s| s.len()).unwrap_or(0);
        session.inventory = inventory;
        if let Some(stream) = stream {
            session.stream = stream;
        }
        Ok(Json(StationSearchResponse {
            stations: session.inventory.len(),
            traces,
            messages,
        }))
    })
}

pub async fn import_stations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImportQuery>,
    body: String,
) -> Result<Json<ImportResponse>, ApiError> {
    let inventory = match query.format.as_deref() {
        Some("xml") => stationxml::read(&body)?,
        Some("csv") | None => csv::read(&body)?,
        Some(other) => {
            return Err(ApiError::bad_request(format!(
                "Unknown station import format '{other}' (expected csv or xml)"
            )))
        }
    };
    let count = inventory.len();

    state.with_session_mut(query.session, |session| {
        session.inventory = inventory;
        Ok(())
    })?;

    Ok(Json(ImportResponse {
        success: true,
        count,
        message: format!("Imported {count} stations"),
    }))
}

pub async fn list_stations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<Inventory>, ApiError> {
    state.with_session(query.session, |session| Ok(Json(session.inventory.clone())))
}

pub async fn stations_geojson(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<FeatureCollection>, ApiError> {
    state.with_session(query.session, |session| {
        let features = session
            .inventory
            .iter()
            .map(|station| {
                let mut properties = Map::new();
                properties.insert("code".to_string(), JsonValue::from(station.code()));
                properties.insert("network".to_string(), JsonValue::from(station.network.clone()));
                properties.insert("station".to_string(), JsonValue::from(station.station.clone()));
                properties.insert("elevation_m".to_string(), JsonValue::from(station.elevation_m));

                Feature {
                    geometry: Some(Geometry::new(Value::Point(vec![
                        station.longitude,
                        station.latitude,
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

/// Station metadata export in one of the five supported formats.
pub async fn export_stations(
    State(state): State<Arc<AppState>>,
    Path(format): Path<String>,
    Query(query): Query<SessionQuery>,
) -> Result<Response, ApiError> {
    let inventory = state.with_session(query.session, |session| Ok(session.inventory.clone()))?;

    let (body, content_type, file_name) = match format.as_str() {
        "csv" => (csv::write(&inventory), "text/csv", "stations.csv"),
        "xml" => (stationxml::write(&inventory)?, "application/xml", "stations.xml"),
        "txt" => (text::write(&inventory), "text/plain", "stations.txt"),
        "hyp" => (seisan::write(&inventory), "text/plain", "stations.hyp"),
        "kml" => (kml::write(&inventory)?, "application/vnd.google-earth.kml+xml", "stations.kml"),
        other => {
            return Err(ApiError::bad_request(format!(
                "Unknown station export format '{other}' (expected csv, xml, txt, hyp or kml)"
            )))
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response())
}
