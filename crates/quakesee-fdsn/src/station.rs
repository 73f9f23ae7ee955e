//! FDSN station service client

use chrono::{DateTime, Utc};
use tracing::info;

use quakesee_core::models::Inventory;
use quakesee_core::station::text;
use quakesee_core::Result;

use crate::http::HttpGet;

/// Annular station search around a selected event.
#[derive(Debug, Clone)]
pub struct StationQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Inner search radius in degrees.
    pub min_radius_deg: f64,
    /// Outer search radius in degrees.
    pub max_radius_deg: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Channel selector, e.g. `BH?,EH?,HH?`.
    pub channel: String,
}

/// Client for `fdsnws/station/1`
pub struct StationClient<H> {
    http: H,
    base_url: String,
}

impl<H: HttpGet> StationClient<H> {
    pub fn new(http: H, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn query_url(&self, query: &StationQuery) -> String {
        format!(
            "{}/fdsnws/station/1/query?network=*&station=*&channel={}\
             &starttime={}&endtime={}&latitude={}&longitude={}\
             &minradius={}&maxradius={}&level=station&format=text",
            self.base_url,
            encode_selector(&query.channel),
            query.start.format("%Y-%m-%dT%H:%M:%S"),
            query.end.format("%Y-%m-%dT%H:%M:%S"),
            query.latitude,
            query.longitude,
            query.min_radius_deg,
            query.max_radius_deg,
        )
    }

    /// Search for stations in the annulus; duplicates collapsed by
    /// `NET.STA` code.
    pub async fn search(&self, query: &StationQuery) -> Result<Inventory> {
        let body = self.http.get(&self.query_url(query)).await?;
        let mut inventory = text::parse_stations(&String::from_utf8_lossy(&body));
        inventory.dedup();
        info!(stations = inventory.len(), "station search finished");
        Ok(inventory)
    }
}

/// Percent-encode the wildcard characters of a channel selector.
fn encode_selector(selector: &str) -> String {
    selector.replace('?', "%3F").replace('*', "%2A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct OneShot(&'static str);

    #[async_trait]
    impl HttpGet for OneShot {
        async fn get(&self, _url: &str) -> Result<Vec<u8>> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    const BODY: &str = "\
#Network|Station|Latitude|Longitude|Elevation|SiteName|StartTime|EndTime
GE|UGM|-7.9125|110.5231|350.0|Yogyakarta|2006-01-01T00:00:00|
GE|UGM|-7.9125|110.5231|350.0|Yogyakarta|2006-01-01T00:00:00|
IA|JAGI|-8.4702|114.1521|171.0|Jajag|2009-01-01T00:00:00|
";

    fn query() -> StationQuery {
        StationQuery {
            latitude: -7.5,
            longitude: 110.0,
            min_radius_deg: 0.0,
            max_radius_deg: 5.0,
            start: Utc.with_ymd_and_hms(2023, 2, 6, 1, 17, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2023, 2, 6, 2, 17, 0).unwrap(),
            channel: "BH?,EH?,HH?".to_string(),
        }
    }

    #[test]
    fn wildcards_are_percent_encoded() {
        let client = StationClient::new(OneShot(BODY), "http://service.iris.edu");
        let url = client.query_url(&query());
        assert!(url.contains("channel=BH%3F,EH%3F,HH%3F"));
        assert!(url.contains("minradius=0&maxradius=5"));
        assert!(url.contains("level=station&format=text"));
    }

    #[tokio::test]
    async fn search_deduplicates_station_codes() {
        let client = StationClient::new(OneShot(BODY), "http://service.iris.edu");
        let inventory = client.search(&query()).await.unwrap();
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.station_codes(), vec!["JAGI", "UGM"]);
    }
}
