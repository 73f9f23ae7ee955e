use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One earthquake record of the catalog.
///
/// Depth is carried in kilometres everywhere in memory; the QuakeML writer
/// converts to metres on output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Catalog-assigned identifier, when the source provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,

    /// Origin time
    pub time: DateTime<Utc>,

    /// Epicentre latitude in degrees
    pub latitude: f64,

    /// Epicentre longitude in degrees
    pub longitude: f64,

    /// Hypocentre depth in kilometres
    pub depth_km: f64,

    /// Magnitude value
    pub magnitude: f64,

    /// Magnitude type (mb, Ms, Mw, ...)
    pub magnitude_type: String,
}

impl Event {
    /// Resource identifier used for QuakeML public IDs.
    pub fn resource_id(&self, index: usize) -> String {
        match &self.event_id {
            Some(id) => id.clone(),
            None => format!("event{index}"),
        }
    }
}
