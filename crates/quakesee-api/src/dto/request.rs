use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use quakesee_core::geo::{GeoRect, MercatorRect};

/// Session selector carried as a query parameter.
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session: Uuid,
}

/// Import body selector: session plus an optional format tag.
#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    pub session: Uuid,
    pub format: Option<String>,
}

/// Catalog fetch from the FDSN event service.
#[derive(Debug, Deserialize)]
pub struct FetchEventsRequest {
    pub session: Uuid,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default = "default_min_magnitude")]
    pub min_magnitude: f64,
    /// Cap on the number of events; absent means unlimited.
    #[serde(default)]
    pub limit: Option<u32>,
}

fn default_min_magnitude() -> f64 {
    5.0
}

#[derive(Debug, Deserialize)]
pub struct SelectEventRequest {
    pub session: Uuid,
    pub index: usize,
}

/// Station search around the selected event, optionally pulling
/// waveforms in the same pass.
#[derive(Debug, Deserialize)]
pub struct StationSearchRequest {
    pub session: Uuid,
    #[serde(default)]
    pub min_radius_deg: f64,
    #[serde(default = "default_max_radius")]
    pub max_radius_deg: f64,
    /// Window start, seconds relative to the event origin time.
    #[serde(default = "default_start_offset")]
    pub start_offset_s: i64,
    /// Window end, seconds relative to the event origin time.
    #[serde(default = "default_end_offset")]
    pub end_offset_s: i64,
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Search again even when the session already holds an inventory.
    #[serde(default)]
    pub reset_stations: bool,
    /// Also retrieve seismograms for the found stations.
    #[serde(default = "default_true")]
    pub fetch_waveforms: bool,
    /// -1 bulk, 0 every station, > 0 stop after that many stations.
    #[serde(default = "default_wave_limit")]
    pub limit: i32,
    #[serde(default = "default_true")]
    pub merge: bool,
    #[serde(default = "default_true")]
    pub prune_inventory: bool,
}

fn default_max_radius() -> f64 {
    5.0
}

fn default_start_offset() -> i64 {
    -300
}

fn default_end_offset() -> i64 {
    3600
}

fn default_channel() -> String {
    "BH?,EH?,HH?".to_string()
}

fn default_wave_limit() -> i32 {
    -1
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct GeographicSelectionRequest {
    pub session: Uuid,
    #[serde(flatten)]
    pub rect: GeoRect,
}

#[derive(Debug, Deserialize)]
pub struct MercatorSelectionRequest {
    pub session: Uuid,
    #[serde(flatten)]
    pub rect: MercatorRect,
}

/// Chunked bulk catalog download from the ISC bulletin.
#[derive(Debug, Deserialize)]
pub struct BulkDownloadRequest {
    pub session: Uuid,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default = "default_step_days")]
    pub step_days: u32,
    #[serde(default)]
    pub min_magnitude: f64,
    #[serde(default = "default_max_magnitude")]
    pub max_magnitude: f64,
    #[serde(default)]
    pub min_depth_km: f64,
    #[serde(default = "default_max_depth")]
    pub max_depth_km: f64,
    /// Also write the accumulated `.events` table into the archive.
    #[serde(default = "default_true")]
    pub events_table: bool,
    /// Also write the accumulated QuakeML document into the archive.
    #[serde(default)]
    pub quakeml: bool,
}

fn default_step_days() -> u32 {
    30
}

fn default_max_magnitude() -> f64 {
    10.0
}

fn default_max_depth() -> f64 {
    700.0
}
