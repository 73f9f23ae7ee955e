//! SEISAN `.hyp` station-location lines
//!
//! Fixed-width: six-character station code field, latitude and longitude in
//! whole degrees plus decimal minutes with hemisphere letters, integer
//! elevation. Station codes longer than five characters cannot be
//! represented and are skipped; each station code is written once.

use std::collections::HashSet;

use crate::models::Inventory;

pub fn write(inventory: &Inventory) -> String {
    let mut out = String::new();
    let mut seen = HashSet::new();

    for s in inventory.iter() {
        if !seen.insert(s.station.clone()) {
            continue;
        }
        if s.station.len() > 5 {
            continue;
        }

        let code = if s.station.len() <= 4 {
            format!("  {:<4}", s.station)
        } else {
            format!(" {:<5}", s.station)
        };

        let (lat_deg, lat_min, lat_hemi) = degrees_minutes(s.latitude, 'N', 'S');
        let (lon_deg, lon_min, lon_hemi) = degrees_minutes(s.longitude, 'E', 'W');
        let elevation = s.elevation_m as i64;

        out.push_str(&format!(
            "{code}{lat_deg:2}{lat_min:5.2}{lat_hemi}{lon_deg:3}{lon_min:5.2}{lon_hemi}{elevation:4}\n"
        ));
    }

    out
}

fn degrees_minutes(value: f64, positive: char, negative: char) -> (i64, f64, char) {
    let hemisphere = if value >= 0.0 { positive } else { negative };
    let magnitude = value.abs();
    let degrees = magnitude.trunc();
    (degrees as i64, 60.0 * (magnitude - degrees), hemisphere)
}
