//! ISC CATCSV catalog dump parser
//!
//! The ISC bulletin service returns a plain-text page: free-form preamble,
//! a `DATA_TYPE EVENT_CATALOGUE` header, comma-separated rows (with
//! inconsistent spacing after the commas), and a terminating blank line.
//! Column positions are fixed; malformed rows are dropped, never raised.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use crate::models::Event;

/// Marker present in a response body only when at least one event matched.
pub const EVENT_SENTINEL: &str = "----EVENT-----";

/// Header line that opens the tabular section.
const CATALOGUE_HEADER: &str = "DATA_TYPE EVENT_CATALOGUE";

/// Whether a response body carries at least one event.
pub fn has_events(body: &str) -> bool {
    body.contains(EVENT_SENTINEL)
}

/// Parse the tabular section of a CATCSV response into event records.
///
/// Rows with fewer than 8 columns, a literal `EVENTID` header value, or an
/// unparsable timestamp or numeric field are logged and skipped.
pub fn parse_catcsv(body: &str) -> Vec<Event> {
    let mut events = Vec::new();
    let mut in_table = false;

    for line in body.lines() {
        if line.contains(CATALOGUE_HEADER) {
            in_table = true;
            continue;
        }
        if !in_table {
            continue;
        }
        if line.trim().is_empty() {
            break;
        }

        if let Some(event) = parse_row(line) {
            events.push(event);
        }
    }

    events
}

fn parse_row(line: &str) -> Option<Event> {
    let columns: Vec<&str> = line.trim().split(',').map(str::trim).collect();
    if columns.len() < 8 {
        return None;
    }

    let event_id = columns[0];
    if event_id == "EVENTID" {
        return None;
    }

    let time = match parse_timestamp(columns[3], columns[4]) {
        Some(t) => t,
        None => {
            warn!(event_id, date = columns[3], time = columns[4], "dropping row with unparsable timestamp");
            return None;
        }
    };

    if columns.len() < 12 {
        warn!(event_id, columns = columns.len(), "dropping row without magnitude columns");
        return None;
    }

    let numeric = |idx: usize| -> Option<f64> {
        match columns[idx].parse::<f64>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(event_id, column = idx, value = columns[idx], "dropping row with unparsable numeric field");
                None
            }
        }
    };

    Some(Event {
        event_id: Some(event_id.to_string()),
        time,
        latitude: numeric(5)?,
        longitude: numeric(6)?,
        depth_km: numeric(7)?,
        magnitude: numeric(11)?,
        magnitude_type: columns[10].to_string(),
    })
}

/// Join the date and time columns and parse them as a UTC timestamp.
/// Fractional seconds are optional.
fn parse_timestamp(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let stamp = format!("{date}T{time}");
    NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
