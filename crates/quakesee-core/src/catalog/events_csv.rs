//! Flattened `.events` catalog table
//!
//! Comma-separated with a fixed header, one row per event. Depth stays in
//! kilometres on this path; only the QuakeML writer converts to metres.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;

use crate::error::{QuakeError, Result};
use crate::models::Event;

const HEADER: &str = "time,latitude,longitude,depth,magnitude,magnitude_type";

/// Serialize a catalog to the `.events` table.
pub fn write(events: &[Event]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for ev in events {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            ev.time.to_rfc3339_opts(SecondsFormat::Micros, true),
            ev.latitude,
            ev.longitude,
            ev.depth_km,
            ev.magnitude,
            ev.magnitude_type,
        ));
    }
    out
}

/// Parse an uploaded `.events` table.
///
/// The header line is required; rows that fail to parse are dropped with a
/// warning, matching the catalog error taxonomy.
pub fn read(body: &str) -> Result<Vec<Event>> {
    let mut lines = body.lines();
    let header = lines
        .next()
        .ok_or_else(|| QuakeError::CatalogFormat("empty .events file".to_string()))?;
    if header.trim() != HEADER {
        return Err(QuakeError::CatalogFormat(format!(
            "unexpected .events header: {header:?}"
        )));
    }

    let mut events = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        match parse_row(line) {
            Some(ev) => events.push(ev),
            None => warn!(line, "dropping unparsable .events row"),
        }
    }
    Ok(events)
}

fn parse_row(line: &str) -> Option<Event> {
    let cols: Vec<&str> = line.trim().split(',').map(str::trim).collect();
    if cols.len() < 6 {
        return None;
    }
    Some(Event {
        event_id: None,
        time: parse_time(cols[0])?,
        latitude: cols[1].parse().ok()?,
        longitude: cols[2].parse().ok()?,
        depth_km: cols[3].parse().ok()?,
        magnitude: cols[4].parse().ok()?,
        magnitude_type: cols[5].to_string(),
    })
}

fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn round_trips_a_catalog() {
        let events = vec![Event {
            event_id: None,
            time: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            latitude: 1.0,
            longitude: 2.0,
            depth_km: 10.0,
            magnitude: 5.5,
            magnitude_type: "mb".to_string(),
        }];

        let text = write(&events);
        assert!(text.starts_with(HEADER));
        // Depth is the kilometre value, unconverted
        assert!(text.contains(",10,"));

        let parsed = read(&text).unwrap();
        assert_eq!(parsed, events);
    }

    #[test]
    fn rejects_unknown_header() {
        assert!(read("lat,lon\n1,2\n").is_err());
    }

    #[test]
    fn drops_bad_rows() {
        let body = format!("{HEADER}\nnot-a-time,1,2,3,4,mb\n");
        assert!(read(&body).unwrap().is_empty());
    }
}
