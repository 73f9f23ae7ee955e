//! FDSN event service client

use chrono::{DateTime, Utc};
use tracing::info;

use quakesee_core::catalog::fdsn_text;
use quakesee_core::models::Event;
use quakesee_core::Result;

use crate::http::HttpGet;

pub const DEFAULT_BASE_URL: &str = "http://service.iris.edu";

/// Parameters of an event catalog query.
#[derive(Debug, Clone)]
pub struct EventQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub min_magnitude: f64,
    /// Cap on the number of returned events; `None` means no cap.
    pub limit: Option<u32>,
}

/// Client for `fdsnws/event/1`
pub struct EventClient<H> {
    http: H,
    base_url: String,
}

impl<H: HttpGet> EventClient<H> {
    pub fn new(http: H, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn query_url(&self, query: &EventQuery) -> String {
        let mut url = format!(
            "{}/fdsnws/event/1/query?starttime={}&endtime={}&minmagnitude={}&orderby=time&format=text",
            self.base_url,
            query.start.format("%Y-%m-%dT%H:%M:%S"),
            query.end.format("%Y-%m-%dT%H:%M:%S"),
            query.min_magnitude,
        );
        if let Some(limit) = query.limit {
            url.push_str(&format!("&limit={limit}"));
        }
        url
    }

    /// Fetch the catalog matching `query`.
    ///
    /// An empty response body (a 204 from the service) is an empty
    /// catalog, not an error.
    pub async fn fetch(&self, query: &EventQuery) -> Result<Vec<Event>> {
        let body = self.http.get(&self.query_url(query)).await?;
        let events = fdsn_text::parse_events(&String::from_utf8_lossy(&body));
        info!(events = events.len(), "event catalog fetched");
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use quakesee_core::{QuakeError, Result};

    struct OneShot(&'static str);

    #[async_trait]
    impl HttpGet for OneShot {
        async fn get(&self, url: &str) -> Result<Vec<u8>> {
            if url.contains("minmagnitude=99") {
                return Err(QuakeError::Service {
                    status: 400,
                    url: url.to_string(),
                });
            }
            Ok(self.0.as_bytes().to_vec())
        }
    }

    const BODY: &str = "\
#EventID|Time|Latitude|Longitude|Depth/km|Author|Catalog|Contributor|ContributorID|MagType|Magnitude|MagAuthor|EventLocationName
11792176|2023-02-06T01:17:34|37.2256|37.0143|10.0|us|NEIC|us|us6000jllz|mww|7.8|us|Turkey
";

    fn query() -> EventQuery {
        EventQuery {
            start: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap(),
            min_magnitude: 6.0,
            limit: Some(50),
        }
    }

    #[test]
    fn url_carries_window_magnitude_and_limit() {
        let client = EventClient::new(OneShot(BODY), DEFAULT_BASE_URL);
        assert_eq!(
            client.query_url(&query()),
            "http://service.iris.edu/fdsnws/event/1/query?starttime=2023-01-01T00:00:00\
             &endtime=2023-03-01T00:00:00&minmagnitude=6&orderby=time&format=text&limit=50"
        );

        let mut unlimited = query();
        unlimited.limit = None;
        assert!(!client.query_url(&unlimited).contains("limit"));
    }

    #[tokio::test]
    async fn fetch_parses_text_rows() {
        let client = EventClient::new(OneShot(BODY), DEFAULT_BASE_URL);
        let events = client.fetch(&query()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].magnitude, 7.8);
        assert_eq!(events[0].magnitude_type, "mww");
        assert_eq!(events[0].depth_km, 10.0);
    }

    #[tokio::test]
    async fn empty_body_is_an_empty_catalog() {
        let client = EventClient::new(OneShot(""), DEFAULT_BASE_URL);
        assert!(client.fetch(&query()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn service_error_propagates() {
        let client = EventClient::new(OneShot(BODY), DEFAULT_BASE_URL);
        let mut bad = query();
        bad.min_magnitude = 99.0;
        assert!(matches!(
            client.fetch(&bad).await,
            Err(QuakeError::Service { status: 400, .. })
        ));
    }
}
