//! FDSN event web-service text format
//!
//! `format=text` responses are pipe-separated:
//! `#EventID|Time|Latitude|Longitude|Depth/km|Author|Catalog|Contributor|ContributorID|MagType|Magnitude|MagAuthor|EventLocationName`

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use crate::models::Event;

/// Parse an FDSN event text response into event records.
///
/// Header/comment lines start with `#`. Rows with missing or unparsable
/// required fields are dropped with a warning.
pub fn parse_events(body: &str) -> Vec<Event> {
    let mut events = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_row(line) {
            Some(ev) => events.push(ev),
            None => warn!(line, "dropping unparsable event text row"),
        }
    }
    events
}

fn parse_row(line: &str) -> Option<Event> {
    let cols: Vec<&str> = line.split('|').map(str::trim).collect();
    if cols.len() < 11 {
        return None;
    }
    Some(Event {
        event_id: Some(cols[0].to_string()),
        time: parse_time(cols[1])?,
        latitude: cols[2].parse().ok()?,
        longitude: cols[3].parse().ok()?,
        depth_km: cols[4].parse().ok()?,
        magnitude: cols[10].parse().ok()?,
        magnitude_type: cols[9].to_string(),
    })
}

fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
