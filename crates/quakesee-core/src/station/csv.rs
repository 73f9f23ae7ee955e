//! Tabular station import/export

use tracing::warn;

use crate::error::{QuakeError, Result};
use crate::models::{Inventory, Station};

const HEADER: &str = "network,station,latitude,longitude,elevation";

pub fn write(inventory: &Inventory) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for s in inventory.iter() {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            s.network, s.station, s.latitude, s.longitude, s.elevation_m
        ));
    }
    out
}

pub fn read(body: &str) -> Result<Inventory> {
    let mut lines = body.lines();
    let header = lines
        .next()
        .ok_or_else(|| QuakeError::StationFormat("empty station CSV".to_string()))?;
    if header.trim() != HEADER {
        return Err(QuakeError::StationFormat(format!(
            "unexpected station CSV header: {header:?}"
        )));
    }

    let mut stations = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        match parse_row(line) {
            Some(station) => stations.push(station),
            None => warn!(line, "dropping unparsable station CSV row"),
        }
    }
    Ok(Inventory::new(stations))
}

fn parse_row(line: &str) -> Option<Station> {
    let cols: Vec<&str> = line.trim().split(',').map(str::trim).collect();
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_an_inventory() {
        let inv = Inventory::new(vec![Station {
            network: "IU".to_string(),
            station: "ANMO".to_string(),
            latitude: 34.946,
            longitude: -106.457,
            elevation_m: 1671.0,
        }]);
        let text = write(&inv);
        let parsed = read(&text).unwrap();
        assert_eq!(parsed, inv);
    }

    #[test]
    fn drops_short_rows() {
        let body = format!("{HEADER}\nIU,ANMO\n");
        assert!(read(&body).unwrap().is_empty());
    }
}
