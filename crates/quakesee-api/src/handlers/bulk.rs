use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};

use quakesee_fdsn::isc::{BulkProgress, BulkRequest, IscClient};
use quakesee_fdsn::ReqwestHttp;

use crate::dto::{BulkDownloadRequest, SessionQuery};
use crate::error::ApiError;
use crate::state::AppState;

/// Chunked bulk catalog download over the session's selection rectangle.
///
/// The handler awaits the whole download and returns the zip; a second
/// request on the same session can poll `bulk_status` meanwhile.
pub async fn bulk_download(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BulkDownloadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let rect = state.with_session_mut(request.session, |session| {
        session.bulk = BulkProgress::default();
        Ok(session.selection.geographic())
    })?;

    let bulk = BulkRequest {
        rect,
        start: request.start,
        end: request.end,
        step_days: request.step_days,
        min_depth_km: request.min_depth_km,
        max_depth_km: request.max_depth_km,
        min_magnitude: request.min_magnitude,
        max_magnitude: request.max_magnitude,
        write_events_csv: request.events_table,
        write_quakeml: request.quakeml,
    };

    let begun = Instant::now();
    let client = IscClient::new(ReqwestHttp::new(), state.config.isc_url.clone());
    let session = request.session;
    let archive = client
        .download(&bulk, |progress| {
            // keep the polled copy current; the session may have been
            // dropped mid-download, which is fine
            let _ = state.with_session_mut(session, |s| {
                s.bulk = progress.clone();
                Ok(())
            });
        })
        .await?;

    let duration = begun.elapsed().as_secs_f64();
    let completion = format!(
        "Status: Download complete! Duration {duration:.6} s, Automatically downloading the ZIP file."
    );
    tracing::info!(session = %session, chunks = archive.messages.len(), "Bulk download finished");

    let _ = state.with_session_mut(session, |s| {
        s.bulk.messages.push(completion.clone());
        Ok(())
    });

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"earthquake_catalog.zip\""),
        ],
        archive.zip,
    ))
}

pub async fn bulk_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<BulkProgress>, ApiError> {
    state.with_session(query.session, |session| Ok(Json(session.bulk.clone())))
}
