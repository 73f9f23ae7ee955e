//! FDSN dataselect client with the two retrieval strategies
//!
//! `limit == -1` issues one bulk request covering every network and
//! station of the inventory and drops traces from stations outside it.
//! `limit >= 0` walks the inventory one station at a time, skipping
//! failures; a positive limit stops after that many stations returned
//! data.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use quakesee_core::models::Inventory;
use quakesee_core::waveform::{mseed, Stream};
use quakesee_core::Result;

use crate::http::HttpGet;

/// One waveform retrieval pass over an inventory.
#[derive(Debug, Clone)]
pub struct WaveformPlan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Channel selector, e.g. `BH?,EH?,HH?`.
    pub channel: String,
    /// `-1` bulk, `0` every station, `> 0` stop after that many hits.
    pub limit: i32,
    /// Merge contiguous traces per channel afterwards.
    pub merge: bool,
    /// Drop inventory stations that yielded no data.
    pub prune_inventory: bool,
}

/// Client for `fdsnws/dataselect/1`
pub struct WaveformClient<H> {
    http: H,
    base_url: String,
}

impl<H: HttpGet> WaveformClient<H> {
    pub fn new(http: H, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn query_url(&self, network: &str, station: &str, plan: &WaveformPlan) -> String {
        format!(
            "{}/fdsnws/dataselect/1/query?network={}&station={}&location=*&channel={}\
             &starttime={}&endtime={}",
            self.base_url,
            network,
            station,
            plan.channel.replace('?', "%3F").replace('*', "%2A"),
            plan.start.format("%Y-%m-%dT%H:%M:%S"),
            plan.end.format("%Y-%m-%dT%H:%M:%S"),
        )
    }

    /// Retrieve waveforms for `inventory` per `plan`.
    ///
    /// `on_progress` receives one status line per downloaded station in
    /// per-station mode.
    pub async fn fetch<F>(
        &self,
        inventory: &mut Inventory,
        plan: &WaveformPlan,
        mut on_progress: F,
    ) -> Result<Stream>
    where
        F: FnMut(String) + Send,
    {
        let mut stream = if plan.limit == -1 {
            self.fetch_bulk(inventory, plan).await?
        } else {
            self.fetch_per_station(inventory, plan, &mut on_progress).await
        };

        if plan.merge {
            stream.merge();
        }
        if plan.prune_inventory {
            inventory.retain_with_data(&stream.station_code_set());
        }

        info!(traces = stream.len(), "waveform retrieval finished");
        Ok(stream)
    }

    /// One request for the whole inventory; stations outside it can
    /// sneak in through wildcard matching, so traces are filtered by the
    /// inventory's code set afterwards.
    async fn fetch_bulk(&self, inventory: &Inventory, plan: &WaveformPlan) -> Result<Stream> {
        let networks = inventory.network_codes().join(",");
        let stations = inventory.station_codes().join(",");
        let body = self.http.get(&self.query_url(&networks, &stations, plan)).await?;

        let mut stream = mseed::read(&body)?;
        stream.retain_stations(&inventory.code_set());
        Ok(stream)
    }

    async fn fetch_per_station<F>(
        &self,
        inventory: &Inventory,
        plan: &WaveformPlan,
        on_progress: &mut F,
    ) -> Stream
    where
        F: FnMut(String) + Send,
    {
        let total = inventory.len();
        let mut stream = Stream::new();
        let mut hits = 0usize;

        for (visited, station) in inventory.iter().enumerate() {
            let url = self.query_url(&station.network, &station.station, plan);
            let piece = match self.http.get(&url).await {
                Ok(body) => match mseed::read(&body) {
                    Ok(piece) => piece,
                    Err(e) => {
                        debug!(station = %station.code(), error = %e, "undecodable waveform response");
                        continue;
                    }
                },
                Err(e) => {
                    debug!(station = %station.code(), error = %e, "station skipped");
                    continue;
                }
            };
            if piece.is_empty() {
                continue;
            }

            stream.extend(piece);
            hits += 1;
            let percent = if plan.limit > 0 {
                100 * hits / plan.limit as usize
            } else {
                100 * (visited + 1) / total
            };
            on_progress(format!("{hits}. {} downloaded ({percent}%)", station.code()));

            if plan.limit > 0 && hits >= plan.limit as usize {
                break;
            }
        }

        stream
    }
}
