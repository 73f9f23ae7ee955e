use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use quakesee_core::geo::{GeoRect, MercatorRect};
use quakesee_core::models::Event;
use quakesee_core::waveform::Trace;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self { status: "ok", service: "quakesee-api" }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub id: Uuid,
}

/// Catalog response; events keep their array index so the client can
/// select one later.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub count: usize,
    pub events: Vec<IndexedEvent>,
}

#[derive(Debug, Serialize)]
pub struct IndexedEvent {
    pub index: usize,
    #[serde(flatten)]
    pub event: Event,
}

impl CatalogResponse {
    pub fn from_events(events: &[Event]) -> Self {
        Self {
            count: events.len(),
            events: events
                .iter()
                .enumerate()
                .map(|(index, event)| IndexedEvent {
                    index,
                    event: event.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub count: usize,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StationSearchResponse {
    pub stations: usize,
    pub traces: usize,
    /// Per-station download status lines, per-station mode only.
    pub messages: Vec<String>,
}

/// Header of one trace, without the samples.
#[derive(Debug, Serialize)]
pub struct TraceHeader {
    pub id: String,
    pub network: String,
    pub station: String,
    pub location: String,
    pub channel: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub sample_rate: f64,
    pub samples: usize,
}

impl TraceHeader {
    pub fn from_trace(trace: &Trace) -> Self {
        Self {
            id: trace.id(),
            network: trace.network.clone(),
            station: trace.station.clone(),
            location: trace.location.clone(),
            channel: trace.channel.clone(),
            start_time: trace.start_time,
            end_time: trace.end_time(),
            sample_rate: trace.sample_rate,
            samples: trace.data.len(),
        }
    }
}

/// One channel's series for the seismogram screen.
#[derive(Debug, Serialize)]
pub struct PlotTrace {
    pub channel: String,
    pub start_time: DateTime<Utc>,
    /// Sample spacing in seconds.
    pub delta_s: f64,
    pub amplitudes: Vec<f64>,
}

/// Per-station seismogram payload with prev/next paging over the sorted
/// station codes.
#[derive(Debug, Serialize)]
pub struct PlotResponse {
    pub station: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    pub traces: Vec<PlotTrace>,
}

/// Time-magnitude series of the session catalog.
#[derive(Debug, Serialize)]
pub struct TimeMagnitudeResponse {
    pub times: Vec<DateTime<Utc>>,
    pub magnitudes: Vec<f64>,
}

/// Always carries both representations of the selection rectangle.
#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub geographic: GeoRect,
    pub mercator: MercatorRect,
}

#[derive(Debug, Serialize)]
pub struct ComponentVersion {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
}

/// The About screen: program blurb plus a component version table.
#[derive(Debug, Serialize)]
pub struct AboutResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub disclaimer: &'static str,
    pub developer: &'static str,
    pub contact: &'static str,
    pub components: Vec<ComponentVersion>,
}
