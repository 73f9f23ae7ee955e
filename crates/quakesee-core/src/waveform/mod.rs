//! Waveform collection: traces, streams, merge and filter operations

pub mod mseed;
pub mod sac;
pub mod steim;

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One continuous time series for a single channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub network: String,
    pub station: String,
    pub location: String,
    pub channel: String,
    pub start_time: DateTime<Utc>,
    /// Samples per second
    pub sample_rate: f64,
    pub data: Vec<f64>,
}

impl Trace {
    /// "NET.STA.LOC.CHA" identifier.
    pub fn id(&self) -> String {
        format!("{}.{}.{}.{}", self.network, self.station, self.location, self.channel)
    }

    /// "NET.STA" key used for inventory matching.
    pub fn station_code(&self) -> String {
        format!("{}.{}", self.network, self.station)
    }

    /// Time of the last sample.
    pub fn end_time(&self) -> DateTime<Utc> {
        if self.data.is_empty() || self.sample_rate <= 0.0 {
            return self.start_time;
        }
        let span_us = (self.data.len() - 1) as f64 / self.sample_rate * 1e6;
        self.start_time + Duration::microseconds(span_us.round() as i64)
    }
}

/// A set of traces, the unit the dashboard moves around.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub traces: Vec<Trace>,
}

impl Stream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trace> {
        self.traces.iter()
    }

    pub fn push(&mut self, trace: Trace) {
        self.traces.push(trace);
    }

    pub fn extend(&mut self, other: Stream) {
        self.traces.extend(other.traces);
    }

    /// Drop traces whose "NET.STA" key is not in `keep`.
    pub fn retain_stations(&mut self, keep: &HashSet<String>) {
        self.traces.retain(|tr| keep.contains(&tr.station_code()));
    }

    /// Set of "NET.STA" keys present in the stream.
    pub fn station_code_set(&self) -> HashSet<String> {
        self.traces.iter().map(|tr| tr.station_code()).collect()
    }

    /// Sorted unique station codes, the ordering the seismogram pager uses.
    pub fn station_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> =
            self.traces.iter().map(|tr| tr.station.clone()).collect::<HashSet<_>>().into_iter().collect();
        codes.sort();
        codes
    }

    /// Traces for one station code, in stream order.
    pub fn select_station(&self, station: &str) -> Vec<&Trace> {
        self.traces.iter().filter(|tr| tr.station == station).collect()
    }

    /// Combine traces that share a channel id and sample rate.
    ///
    /// Within each group, traces are taken in start-time order. A gap is
    /// filled by linear interpolation between the bracketing samples; where
    /// traces overlap, the later trace's samples win.
    pub fn merge(&mut self) {
        let mut groups: BTreeMap<String, Vec<Trace>> = BTreeMap::new();
        for trace in self.traces.drain(..) {
            let key = format!("{}#{}", trace.id(), trace.sample_rate);
            groups.entry(key).or_default().push(trace);
        }

        for (_, mut group) in groups {
            group.sort_by_key(|tr| tr.start_time);
            let mut iter = group.into_iter();
            let mut merged = match iter.next() {
                Some(first) => first,
                None => continue,
            };
            for trace in iter {
                splice(&mut merged, trace);
            }
            self.traces.push(merged);
        }
    }
}

/// Append `next` onto `acc`, interpolating gaps and overwriting overlaps.
fn splice(acc: &mut Trace, next: Trace) {
    if acc.sample_rate <= 0.0 {
        acc.data.extend(next.data);
        return;
    }

    let offset_s = (next.start_time - acc.start_time).num_microseconds().unwrap_or(i64::MAX) as f64 / 1e6;
    let offset = (offset_s * acc.sample_rate).round();
    if offset < 0.0 {
        // Sorted input; a negative offset means identical start times
        return;
    }
    let offset = offset as usize;

    if offset > acc.data.len() {
        let gap = offset - acc.data.len();
        let last = acc.data.last().copied().unwrap_or(0.0);
        let first = next.data.first().copied().unwrap_or(last);
        for k in 1..=gap {
            let frac = k as f64 / (gap + 1) as f64;
            acc.data.push(last + (first - last) * frac);
        }
    }

    for (i, sample) in next.data.into_iter().enumerate() {
        let idx = offset + i;
        if idx < acc.data.len() {
            acc.data[idx] = sample;
        } else {
            acc.data.push(sample);
        }
    }
}
