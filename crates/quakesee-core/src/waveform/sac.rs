//! SAC binary writer (little-endian, evenly-sampled time series).
//!
//! The 632-byte header is 70 floats, 40 integers and 24 eight-character
//! string slots (KEVNM spans two). Unset fields carry the SAC undefined
//! markers.

use std::io::Write as _;

use chrono::{Datelike, Timelike};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{QuakeError, Result};
use crate::waveform::{Stream, Trace};

const UNDEF_F: f32 = -12345.0;
const UNDEF_I: i32 = -12345;
const UNDEF_K: &str = "-12345  ";

const NUM_FLOATS: usize = 70;
const NUM_INTS: usize = 40;
const NUM_STRINGS: usize = 24;

/// Serialize one trace as a SAC binary file.
pub fn write(trace: &Trace) -> Result<Vec<u8>> {
    if trace.sample_rate <= 0.0 {
        return Err(QuakeError::MseedFormat(format!(
            "trace {} has no sample rate, cannot write SAC",
            trace.id()
        )));
    }

    let mut floats = [UNDEF_F; NUM_FLOATS];
    let mut ints = [UNDEF_I; NUM_INTS];
    let mut strings = [UNDEF_K; NUM_STRINGS].map(|s| s.to_string());

    let delta = 1.0 / trace.sample_rate;
    floats[0] = delta as f32;
    floats[5] = 0.0; // B, relative to the reference time
    floats[6] = (delta * trace.data.len().saturating_sub(1) as f64) as f32;

    let t = trace.start_time;
    ints[0] = t.year();
    ints[1] = t.ordinal() as i32;
    ints[2] = t.hour() as i32;
    ints[3] = t.minute() as i32;
    ints[4] = t.second() as i32;
    ints[5] = (t.timestamp_subsec_millis()) as i32;
    ints[6] = 6; // NVHDR
    ints[9] = trace.data.len() as i32;
    ints[15] = 1; // IFTYPE: time series
    ints[35] = 1; // LEVEN

    strings[0] = pad_k(&trace.station);
    // KEVNM occupies slots 1 and 2
    strings[3] = pad_k(&trace.location);
    strings[20] = pad_k(&trace.channel);
    strings[21] = pad_k(&trace.network);

    let mut out = Vec::with_capacity(632 + trace.data.len() * 4);
    for v in floats {
        out.extend_from_slice(&v.to_le_bytes());
    }
    for v in ints {
        out.extend_from_slice(&v.to_le_bytes());
    }
    for s in &strings {
        out.extend_from_slice(s.as_bytes());
    }
    for sample in &trace.data {
        out.extend_from_slice(&(*sample as f32).to_le_bytes());
    }
    Ok(out)
}

/// File name for one trace, `NET_STA_CHA_YYYYmmdd_HHMMSS.sac`.
pub fn file_name(trace: &Trace) -> String {
    format!(
        "{}_{}_{}_{}.sac",
        trace.network,
        trace.station,
        trace.channel,
        trace.start_time.format("%Y%m%d_%H%M%S")
    )
}

/// Pack every trace of a stream into a zip archive, one SAC file each.
pub fn write_zip(stream: &Stream) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for trace in stream.iter() {
        let bytes = write(trace)?;
        zip.start_file(file_name(trace), options).map_err(archive_err)?;
        zip.write_all(&bytes)?;
    }

    let cursor = zip.finish().map_err(archive_err)?;
    Ok(cursor.into_inner())
}

fn archive_err(e: zip::result::ZipError) -> QuakeError {
    QuakeError::Archive(e.to_string())
}

fn pad_k(value: &str) -> String {
    if value.is_empty() {
        UNDEF_K.to_string()
    } else {
        format!("{:<8.8}", value)
    }
}
