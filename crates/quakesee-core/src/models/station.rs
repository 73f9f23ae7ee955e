use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One recording station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// FDSN network code (e.g. "IU")
    pub network: String,

    /// Station code (e.g. "ANMO")
    pub station: String,

    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Elevation in metres
    pub elevation_m: f64,
}

impl Station {
    /// "NET.STA" key used to match stations against waveform traces.
    pub fn code(&self) -> String {
        format!("{}.{}", self.network, self.station)
    }
}

/// Ordered collection of station metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub stations: Vec<Station>,
}

impl Inventory {
    pub fn new(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Station> {
        self.stations.iter()
    }

    /// Drop duplicate (network, station) pairs, keeping the first occurrence.
    pub fn dedup(&mut self) {
        let mut seen = HashSet::new();
        self.stations.retain(|s| seen.insert(s.code()));
    }

    /// Unique network codes, sorted, for a combined dataselect request.
    pub fn network_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> =
            self.stations.iter().map(|s| s.network.clone()).collect::<HashSet<_>>().into_iter().collect();
        codes.sort();
        codes
    }

    /// Unique station codes, sorted, for a combined dataselect request.
    pub fn station_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> =
            self.stations.iter().map(|s| s.station.clone()).collect::<HashSet<_>>().into_iter().collect();
        codes.sort();
        codes
    }

    /// Set of "NET.STA" keys present in the inventory.
    pub fn code_set(&self) -> HashSet<String> {
        self.stations.iter().map(|s| s.code()).collect()
    }

    /// Prune the inventory down to stations whose "NET.STA" key appears in
    /// `with_data` (stations that actually yielded waveforms).
    pub fn retain_with_data(&mut self, with_data: &HashSet<String>) {
        self.stations.retain(|s| with_data.contains(&s.code()));
    }
}
