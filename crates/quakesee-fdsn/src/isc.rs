//! ISC bulletin client and chunked bulk downloader
//!
//! The ISC bulletin CGI serves CATCSV bulletins for a rectangular region
//! and date window. Long windows are split into chunks ([`crate::chunk`]);
//! each chunk's raw bulletin lands in a zip archive, and the parsed rows
//! accumulate into an optional flat CSV table and an optional QuakeML
//! document covering the full request range.

use std::io::{Cursor, Write as _};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use quakesee_core::catalog::{events_csv, isc, quakeml};
use quakesee_core::geo::GeoRect;
use quakesee_core::models::Event;
use quakesee_core::{QuakeError, Result};

use crate::chunk::{self, DateChunk};
use crate::http::HttpGet;

pub const DEFAULT_BASE_URL: &str = "http://www.isc.ac.uk/cgi-bin/web-db-run";

/// Parameters of one bulk catalog download.
#[derive(Debug, Clone)]
pub struct BulkRequest {
    pub rect: GeoRect,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Days per chunk.
    pub step_days: u32,
    pub min_depth_km: f64,
    pub max_depth_km: f64,
    pub min_magnitude: f64,
    pub max_magnitude: f64,
    /// Also write the accumulated `.events` CSV table.
    pub write_events_csv: bool,
    /// Also write the accumulated QuakeML document.
    pub write_quakeml: bool,
}

/// Progress of a running bulk download, suitable for polling.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkProgress {
    /// Whole percent, floor of done/total.
    pub percent: u8,
    /// One status line per finished chunk, newest last.
    pub messages: Vec<String>,
    pub finished: bool,
}

/// Finished bulk download: the zip archive plus the chunk status lines.
pub struct BulkArchive {
    pub zip: Vec<u8>,
    pub messages: Vec<String>,
}

/// Client for the ISC bulletin CGI
pub struct IscClient<H> {
    http: H,
    base_url: String,
}

impl<H: HttpGet> IscClient<H> {
    pub fn new(http: H, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Query URL for one chunk of a bulk request.
    pub fn chunk_url(&self, request: &BulkRequest, chunk: &DateChunk) -> String {
        let r = &request.rect;
        format!(
            "{}?request=COMPREHENSIVE&out_format=CATCSV&searchshape=RECT\
             &bot_lat={}&top_lat={}&left_lon={}&right_lon={}\
             &start_year={}&start_month={}&start_day={}&start_time=00%3A00%3A00\
             &end_year={}&end_month={}&end_day={}&end_time=23%3A59%3A59\
             &min_dep={}&max_dep={}&min_mag={}&max_mag={}",
            self.base_url,
            r.south,
            r.north,
            r.west,
            r.east,
            chunk.start.year(),
            chunk.start.month(),
            chunk.start.day(),
            chunk.end.year(),
            chunk.end.month(),
            chunk.end.day(),
            request.min_depth_km,
            request.max_depth_km,
            request.min_magnitude,
            request.max_magnitude,
        )
    }

    /// Download every chunk of `request` and assemble the zip archive.
    ///
    /// `on_progress` runs after each chunk with the updated percentage and
    /// status lines. A failed or empty chunk is reported and skipped, not
    /// fatal; only an unwritable archive aborts the download.
    pub async fn download<F>(&self, request: &BulkRequest, mut on_progress: F) -> Result<BulkArchive>
    where
        F: FnMut(&BulkProgress) + Send,
    {
        request.rect.validate()?;
        let chunks = chunk::partition(request.start, request.end, request.step_days)?;
        let total = chunks.len();

        let mut progress = BulkProgress::default();
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut all_events: Vec<Event> = Vec::new();

        for (done, chunk) in chunks.iter().enumerate() {
            let file_name = format!("{}.txt", chunk.name());
            let message = match self.http.get(&self.chunk_url(request, chunk)).await {
                Ok(body) => {
                    let body = String::from_utf8_lossy(&body);
                    if isc::has_events(&body) {
                        write_member(&mut zip, options, &file_name, body.as_bytes())?;
                        if request.write_events_csv || request.write_quakeml {
                            let events = isc::parse_catcsv(&body);
                            info!(chunk = %file_name, events = events.len(), "chunk downloaded");
                            all_events.extend(events);
                        }
                        format!("Downloaded: {file_name}")
                    } else {
                        format!("{file_name} doesn't have at least one event.")
                    }
                }
                Err(e) => {
                    warn!(chunk = %file_name, error = %e, "chunk download failed");
                    format!("Failed to download: {file_name}. Error: {e}")
                }
            };

            progress.messages.push(message);
            progress.percent = chunk::percent_complete(done + 1, total);
            on_progress(&progress);
        }

        if request.write_events_csv {
            let name = format!("{}_to_{}.events", request.start, request.end);
            write_member(&mut zip, options, &name, events_csv::write(&all_events).as_bytes())?;
            progress.messages.push(format!("Data successfully saved to {name}"));
        }
        if request.write_quakeml {
            let name = format!("{}_to_{}.xml", request.start, request.end);
            write_member(&mut zip, options, &name, quakeml::write(&all_events)?.as_bytes())?;
            progress.messages.push(format!("Data successfully saved to {name}"));
        }

        progress.finished = true;
        on_progress(&progress);

        let cursor = zip
            .finish()
            .map_err(|e| QuakeError::Archive(e.to_string()))?;
        Ok(BulkArchive {
            zip: cursor.into_inner(),
            messages: progress.messages,
        })
    }
}

fn write_member(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    name: &str,
    bytes: &[u8],
) -> Result<()> {
    zip.start_file(name, options)
        .map_err(|e| QuakeError::Archive(e.to_string()))?;
    zip.write_all(bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io::Read as _;
    use std::sync::Mutex;

    const BULLETIN: &str = "\
DATA_TYPE EVENT_CATALOGUE
EVENTID  ,TYPE     ,AUTHOR   ,DATE      ,TIME       ,LAT     ,LON      ,DEPTH ,DEPFIX ,AUTHOR   ,TYPE  ,MAG
----EVENT-----
610093212, ke, ISC, 2023-01-02, 01:02:03.40, -6.1750, 106.8270, 10.0, , ISC, mb, 4.5
";

    /// Serves canned bodies keyed by substring of the URL, recording
    /// every URL hit.
    struct FakeHttp {
        responses: Vec<(&'static str, Result<Vec<u8>>)>,
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpGet for FakeHttp {
        async fn get(&self, url: &str) -> Result<Vec<u8>> {
            self.urls.lock().unwrap().push(url.to_string());
            for (needle, response) in &self.responses {
                if url.contains(needle) {
                    return match response {
                        Ok(body) => Ok(body.clone()),
                        Err(QuakeError::Service { status, url }) => Err(QuakeError::Service {
                            status: *status,
                            url: url.clone(),
                        }),
                        Err(e) => panic!("fake cannot clone error {e}"),
                    };
                }
            }
            Ok(b"no events were found".to_vec())
        }
    }

    fn request() -> BulkRequest {
        BulkRequest {
            rect: GeoRect {
                south: -10.0,
                north: 6.0,
                west: 95.0,
                east: 141.0,
            },
            start: "2023-01-01".parse().unwrap(),
            end: "2023-01-10".parse().unwrap(),
            step_days: 3,
            min_depth_km: 0.0,
            max_depth_km: 700.0,
            min_magnitude: 4.0,
            max_magnitude: 9.0,
            write_events_csv: true,
            write_quakeml: true,
        }
    }

    #[test]
    fn chunk_urls_carry_every_query_parameter() {
        let client = IscClient::new(
            FakeHttp {
                responses: vec![],
                urls: Mutex::new(vec![]),
            },
            DEFAULT_BASE_URL,
        );
        let chunk = DateChunk {
            start: "2023-01-05".parse().unwrap(),
            end: "2023-01-08".parse().unwrap(),
        };
        let url = client.chunk_url(&request(), &chunk);
        assert!(url.starts_with("http://www.isc.ac.uk/cgi-bin/web-db-run?request=COMPREHENSIVE"));
        assert!(url.contains("out_format=CATCSV"));
        assert!(url.contains("searchshape=RECT"));
        assert!(url.contains("bot_lat=-10&top_lat=6&left_lon=95&right_lon=141"));
        assert!(url.contains("start_year=2023&start_month=1&start_day=5&start_time=00%3A00%3A00"));
        assert!(url.contains("end_year=2023&end_month=1&end_day=8&end_time=23%3A59%3A59"));
        assert!(url.contains("min_dep=0&max_dep=700&min_mag=4&max_mag=9"));
    }

    #[tokio::test]
    async fn bulk_download_mixes_ok_empty_and_failed_chunks() {
        let http = FakeHttp {
            responses: vec![
                ("start_day=1", Ok(BULLETIN.as_bytes().to_vec())),
                (
                    "start_day=5",
                    Err(QuakeError::Service {
                        status: 502,
                        url: "isc".to_string(),
                    }),
                ),
                // third chunk falls through to the empty default
            ],
            urls: Mutex::new(vec![]),
        };
        let client = IscClient::new(http, DEFAULT_BASE_URL);

        let mut snapshots = Vec::new();
        let archive = client
            .download(&request(), |p| snapshots.push(p.clone()))
            .await
            .unwrap();

        assert_eq!(
            archive.messages,
            vec![
                "Downloaded: 2023-01-01_to_2023-01-04.txt".to_string(),
                "Failed to download: 2023-01-05_to_2023-01-08.txt. Error: Service returned HTTP 502 for isc"
                    .to_string(),
                "2023-01-09_to_2023-01-10.txt doesn't have at least one event.".to_string(),
                "Data successfully saved to 2023-01-01_to_2023-01-10.events".to_string(),
                "Data successfully saved to 2023-01-01_to_2023-01-10.xml".to_string(),
            ]
        );

        // 3 per-chunk snapshots plus the finished one
        assert_eq!(snapshots.len(), 4);
        assert_eq!(snapshots[0].percent, 33);
        assert_eq!(snapshots[2].percent, 100);
        assert!(snapshots[3].finished);

        let mut zip = zip::ZipArchive::new(Cursor::new(archive.zip)).unwrap();
        let names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "2023-01-01_to_2023-01-04.txt",
                "2023-01-01_to_2023-01-10.events",
                "2023-01-01_to_2023-01-10.xml",
            ]
        );

        let mut events = String::new();
        zip.by_name("2023-01-01_to_2023-01-10.events")
            .unwrap()
            .read_to_string(&mut events)
            .unwrap();
        assert!(events.contains("-6.175,106.827,10,4.5,mb"));
    }

    #[tokio::test]
    async fn toggles_suppress_the_accumulated_members() {
        let http = FakeHttp {
            responses: vec![("start_day=", Ok(BULLETIN.as_bytes().to_vec()))],
            urls: Mutex::new(vec![]),
        };
        let client = IscClient::new(http, DEFAULT_BASE_URL);
        let mut request = request();
        request.write_events_csv = false;
        request.write_quakeml = false;

        let archive = client.download(&request, |_| {}).await.unwrap();
        let zip = zip::ZipArchive::new(Cursor::new(archive.zip)).unwrap();
        assert!(zip.file_names().all(|n| n.ends_with(".txt")));
        assert_eq!(zip.len(), 3);
    }
}
