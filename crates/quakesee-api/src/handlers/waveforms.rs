use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};

use quakesee_core::waveform::{mseed, sac};

use crate::dto::{ImportResponse, PlotResponse, PlotTrace, SessionQuery, TraceHeader};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn import_waveforms(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
    body: Bytes,
) -> Result<Json<ImportResponse>, ApiError> {
    let stream = mseed::read(&body)?;
    let count = stream.len();

    state.with_session_mut(query.session, |session| {
        session.stream = stream;
        Ok(())
    })?;

    Ok(Json(ImportResponse {
        success: true,
        count,
        message: format!("Imported {count} traces"),
    }))
}

pub async fn list_waveforms(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<Vec<TraceHeader>>, ApiError> {
    state.with_session(query.session, |session| {
        Ok(Json(session.stream.iter().map(TraceHeader::from_trace).collect()))
    })
}

pub async fn export_mseed(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.with_session(query.session, |session| Ok(mseed::write(&session.stream)))??;
    Ok((
        [
            (header::CONTENT_TYPE, "application/vnd.fdsn.mseed"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"waveforms.mseed\""),
        ],
        bytes,
    ))
}

/// One SAC file per trace, zipped.
pub async fn export_sac(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.with_session(query.session, |session| Ok(sac::write_zip(&session.stream)))??;
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"waveforms_sac.zip\""),
        ],
        bytes,
    ))
}

/// Seismogram payload for one station, with prev/next paging over the
/// sorted station codes.
pub async fn plot_station(
    State(state): State<Arc<AppState>>,
    Path(station): Path<String>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<PlotResponse>, ApiError> {
    state.with_session(query.session, |session| {
        let codes = session.stream.station_codes();
        let position = codes
            .iter()
            .position(|code| code == &station)
            .ok_or_else(|| ApiError::not_found(format!("No waveforms for station {station}")))?;

        let traces = session
            .stream
            .select_station(&station)
            .into_iter()
            .map(|trace| PlotTrace {
                channel: trace.channel.clone(),
                start_time: trace.start_time,
                delta_s: if trace.sample_rate > 0.0 {
                    1.0 / trace.sample_rate
                } else {
                    0.0
                },
                amplitudes: trace.data.clone(),
            })
            .collect();

        Ok(Json(PlotResponse {
            station,
            prev: position.checked_sub(1).map(|i| codes[i].clone()),
            next: codes.get(position + 1).cloned(),
            traces,
        }))
    })
}
