//! FDSN station web-service text format (station level)
//!
//! `#Network|Station|Latitude|Longitude|Elevation|SiteName|StartTime|EndTime`
//!
//! The parser handles `format=text` service responses; the writer doubles
//! as the `.txt` station export.

use tracing::warn;

use crate::models::{Inventory, Station};

/// Parse an FDSN station text response.
pub fn parse_stations(body: &str) -> Inventory {
    let mut stations = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_row(line) {
            Some(station) => stations.push(station),
            None => warn!(line, "dropping unparsable station text row"),
        }
    }
    Inventory::new(stations)
}

fn parse_row(line: &str) -> Option<Station> {
    let cols: Vec<&str> = line.split('|').map(str::trim).collect();
    if cols.len() < 5 {
        return None;
    }
    Some(Station {
        network: cols[0].to_string(),
        station: cols[1].to_string(),
        latitude: cols[2].parse().ok()?,
        longitude: cols[3].parse().ok()?,
        elevation_m: cols[4].parse().ok()?,
    })
}

/// Serialize an inventory in the same pipe-separated layout.
pub fn write(inventory: &Inventory) -> String {
    let mut out = String::from("#Network|Station|Latitude|Longitude|Elevation|SiteName|StartTime|EndTime\n");
    for s in inventory.iter() {
        out.push_str(&format!(
            "{}|{}|{}|{}|{}|||\n",
            s.network, s.station, s.latitude, s.longitude, s.elevation_m
        ));
    }
    out
}
