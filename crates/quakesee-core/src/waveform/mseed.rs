//! miniSEED (SEED 2.4 data records) reader and writer
//!
//! Reader: fixed 48-byte header, Blockette 1000 for encoding and record
//! length, byte order detected from the BTIME year. Supported encodings:
//! INT16, INT32, FLOAT32, FLOAT64, Steim-1, Steim-2. Contiguous records of
//! the same channel are coalesced into one trace.
//!
//! Writer: big-endian 512-byte records, FLOAT32 encoding, one Blockette
//! 1000 per record.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use tracing::{debug, warn};

use crate::error::{QuakeError, Result};
use crate::waveform::{steim, Stream, Trace};

const FIXED_HEADER_LEN: usize = 48;
const WRITE_RECORD_LEN: usize = 512;
const WRITE_DATA_OFFSET: usize = 64;
/// FLOAT32 samples per 512-byte record.
const WRITE_SAMPLES_PER_RECORD: usize = (WRITE_RECORD_LEN - WRITE_DATA_OFFSET) / 4;

mod encoding {
    pub const INT16: u8 = 1;
    pub const INT32: u8 = 3;
    pub const FLOAT32: u8 = 4;
    pub const FLOAT64: u8 = 5;
    pub const STEIM1: u8 = 10;
    pub const STEIM2: u8 = 11;
}

/// Parse a miniSEED byte buffer into a stream.
pub fn read(bytes: &[u8]) -> Result<Stream> {
    if bytes.is_empty() {
        return Ok(Stream::new());
    }

    let mut stream = Stream::new();
    let mut offset = 0usize;

    while offset + FIXED_HEADER_LEN <= bytes.len() {
        let (record_len, trace) = read_record(&bytes[offset..])?;
        if let Some(trace) = trace {
            append_coalescing(&mut stream, trace);
        }
        offset += record_len;
    }

    Ok(stream)
}

/// Parse one record; returns its length and the decoded trace (None for
/// header-only records with no samples).
fn read_record(record: &[u8]) -> Result<(usize, Option<Trace>)> {
    let header = &record[..FIXED_HEADER_LEN];

    let station = ascii_field(&header[8..13]);
    let location = ascii_field(&header[13..15]);
    let channel = ascii_field(&header[15..18]);
    let network = ascii_field(&header[18..20]);

    // BTIME year decides the record's byte order
    let year_be = u16::from_be_bytes([header[20], header[21]]);
    let big_endian = (1900..=2100).contains(&year_be);
    let read_u16 = |b: &[u8], at: usize| -> u16 {
        let pair = [b[at], b[at + 1]];
        if big_endian { u16::from_be_bytes(pair) } else { u16::from_le_bytes(pair) }
    };
    let read_i16 = |b: &[u8], at: usize| read_u16(b, at) as i16;

    let year = read_u16(header, 20);
    let day_of_year = read_u16(header, 22);
    let fract = read_u16(header, 28);
    let nsamples = read_u16(header, 30) as usize;
    let factor = read_i16(header, 32);
    let multiplier = read_i16(header, 34);
    let data_offset = read_u16(header, 44) as usize;
    let blockette_offset = read_u16(header, 46) as usize;

    let start_time = btime_to_datetime(year, day_of_year, header[24], header[25], header[26], fract)
        .ok_or_else(|| {
            QuakeError::MseedFormat(format!("invalid record start time: year {year} day {day_of_year}"))
        })?;

    // Walk the blockette chain for Blockette 1000
    let mut b1000: Option<(u8, u8)> = None; // (encoding, record length power)
    let mut next = blockette_offset;
    while next != 0 && next + 8 <= record.len() {
        let blockette_type = read_u16(record, next);
        let chain = read_u16(record, next + 2) as usize;
        if blockette_type == 1000 {
            b1000 = Some((record[next + 4], record[next + 6]));
            break;
        }
        if chain <= next {
            break;
        }
        next = chain;
    }

    let (data_encoding, record_power) = b1000.ok_or_else(|| {
        QuakeError::MseedFormat(format!("record for {network}.{station} has no Blockette 1000"))
    })?;
    if !(7..=20).contains(&record_power) {
        return Err(QuakeError::MseedFormat(format!("implausible record length 2^{record_power}")));
    }
    let record_len = 1usize << record_power;
    if record_len > record.len() {
        return Err(QuakeError::MseedFormat(format!(
            "truncated record: {} of {record_len} bytes",
            record.len()
        )));
    }

    if nsamples == 0 {
        return Ok((record_len, None));
    }
    if data_offset < FIXED_HEADER_LEN || data_offset >= record_len {
        return Err(QuakeError::MseedFormat(format!("data offset {data_offset} outside record")));
    }

    let payload = &record[data_offset..record_len];
    let data = decode_payload(payload, data_encoding, nsamples, big_endian)?;

    Ok((
        record_len,
        Some(Trace {
            network,
            station,
            location,
            channel,
            start_time,
            sample_rate: nominal_sample_rate(factor, multiplier),
            data,
        }),
    ))
}

fn decode_payload(payload: &[u8], enc: u8, nsamples: usize, big_endian: bool) -> Result<Vec<f64>> {
    let need = |width: usize| -> Result<()> {
        if payload.len() < nsamples * width {
            Err(QuakeError::MseedFormat(format!(
                "payload of {} bytes too short for {nsamples} samples",
                payload.len()
            )))
        } else {
            Ok(())
        }
    };

    match enc {
        encoding::INT16 => {
            need(2)?;
            Ok(payload
                .chunks_exact(2)
                .take(nsamples)
                .map(|b| {
                    let pair = [b[0], b[1]];
                    let v = if big_endian { i16::from_be_bytes(pair) } else { i16::from_le_bytes(pair) };
                    v as f64
                })
                .collect())
        }
        encoding::INT32 => {
            need(4)?;
            Ok(payload
                .chunks_exact(4)
                .take(nsamples)
                .map(|b| {
                    let quad = [b[0], b[1], b[2], b[3]];
                    let v = if big_endian { i32::from_be_bytes(quad) } else { i32::from_le_bytes(quad) };
                    v as f64
                })
                .collect())
        }
        encoding::FLOAT32 => {
            need(4)?;
            Ok(payload
                .chunks_exact(4)
                .take(nsamples)
                .map(|b| {
                    let quad = [b[0], b[1], b[2], b[3]];
                    let v = if big_endian { f32::from_be_bytes(quad) } else { f32::from_le_bytes(quad) };
                    v as f64
                })
                .collect())
        }
        encoding::FLOAT64 => {
            need(8)?;
            Ok(payload
                .chunks_exact(8)
                .take(nsamples)
                .map(|b| {
                    let oct: [u8; 8] = b.try_into().expect("chunks_exact yields 8 bytes");
                    if big_endian { f64::from_be_bytes(oct) } else { f64::from_le_bytes(oct) }
                })
                .collect())
        }
        encoding::STEIM1 => Ok(steim::decode_steim1(payload, nsamples)?.into_iter().map(|v| v as f64).collect()),
        encoding::STEIM2 => Ok(steim::decode_steim2(payload, nsamples)?.into_iter().map(|v| v as f64).collect()),
        other => Err(QuakeError::MseedFormat(format!("unsupported data encoding {other}"))),
    }
}

/// Append a record's trace, extending the previous trace when it continues
/// the same channel without a gap.
fn append_coalescing(stream: &mut Stream, trace: Trace) {
    if let Some(last) = stream.traces.last_mut() {
        if last.id() == trace.id() && last.sample_rate == trace.sample_rate && last.sample_rate > 0.0 {
            let expected = last.end_time() + Duration::microseconds((1e6 / last.sample_rate).round() as i64);
            let jitter = (trace.start_time - expected).num_microseconds().unwrap_or(i64::MAX).abs() as f64;
            if jitter <= 0.5e6 / last.sample_rate {
                last.data.extend(trace.data);
                return;
            }
            debug!(id = %trace.id(), jitter_us = jitter, "gap between records, starting a new trace");
        }
    }
    stream.push(trace);
}

fn btime_to_datetime(
    year: u16,
    day_of_year: u16,
    hour: u8,
    minute: u8,
    second: u8,
    fract: u16,
) -> Option<DateTime<Utc>> {
    let date = NaiveDate::from_yo_opt(year as i32, day_of_year as u32)?;
    let time = date.and_hms_micro_opt(hour as u32, minute as u32, second as u32, fract as u32 * 100)?;
    Some(Utc.from_utc_datetime(&time))
}

fn nominal_sample_rate(factor: i16, multiplier: i16) -> f64 {
    let f = factor as f64;
    let m = multiplier as f64;
    if factor == 0 {
        0.0
    } else if factor > 0 && multiplier > 0 {
        f * m
    } else if factor > 0 && multiplier < 0 {
        -f / m
    } else if factor < 0 && multiplier > 0 {
        -m / f
    } else {
        1.0 / (f * m)
    }
}

fn ascii_field(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

/// Serialize a stream as big-endian 512-byte FLOAT32 records.
pub fn write(stream: &Stream) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut sequence = 1u32;

    for trace in stream.iter() {
        if trace.sample_rate <= 0.0 {
            warn!(id = %trace.id(), "skipping trace without a sample rate");
            continue;
        }
        for (chunk_index, chunk) in trace.data.chunks(WRITE_SAMPLES_PER_RECORD).enumerate() {
            let offset_us =
                (chunk_index * WRITE_SAMPLES_PER_RECORD) as f64 / trace.sample_rate * 1e6;
            let record_start = trace.start_time + Duration::microseconds(offset_us.round() as i64);
            out.extend_from_slice(&build_record(trace, chunk, record_start, sequence)?);
            sequence = (sequence % 999_999) + 1;
        }
    }

    Ok(out)
}

fn build_record(
    trace: &Trace,
    samples: &[f64],
    start: DateTime<Utc>,
    sequence: u32,
) -> Result<Vec<u8>> {
    let mut record = vec![0u8; WRITE_RECORD_LEN];

    record[0..6].copy_from_slice(format!("{sequence:06}").as_bytes());
    record[6] = b'D';
    record[7] = b' ';
    write_ascii(&mut record[8..13], &trace.station);
    write_ascii(&mut record[13..15], &trace.location);
    write_ascii(&mut record[15..18], &trace.channel);
    write_ascii(&mut record[18..20], &trace.network);

    // BTIME
    record[20..22].copy_from_slice(&(start.year() as u16).to_be_bytes());
    record[22..24].copy_from_slice(&(start.ordinal() as u16).to_be_bytes());
    record[24] = start.hour() as u8;
    record[25] = start.minute() as u8;
    record[26] = start.second() as u8;
    record[27] = 0;
    record[28..30].copy_from_slice(&((start.timestamp_subsec_micros() / 100) as u16).to_be_bytes());

    record[30..32].copy_from_slice(&(samples.len() as u16).to_be_bytes());
    let (factor, multiplier) = encode_sample_rate(trace.sample_rate)?;
    record[32..34].copy_from_slice(&factor.to_be_bytes());
    record[34..36].copy_from_slice(&multiplier.to_be_bytes());

    record[39] = 1; // one blockette follows
    record[44..46].copy_from_slice(&(WRITE_DATA_OFFSET as u16).to_be_bytes());
    record[46..48].copy_from_slice(&(FIXED_HEADER_LEN as u16).to_be_bytes());

    // Blockette 1000
    record[48..50].copy_from_slice(&1000u16.to_be_bytes());
    record[50..52].copy_from_slice(&0u16.to_be_bytes());
    record[52] = encoding::FLOAT32;
    record[53] = 1; // big-endian
    record[54] = 9; // 2^9 = 512
    record[55] = 0;

    for (i, sample) in samples.iter().enumerate() {
        let at = WRITE_DATA_OFFSET + i * 4;
        record[at..at + 4].copy_from_slice(&(*sample as f32).to_be_bytes());
    }

    Ok(record)
}

fn encode_sample_rate(rate: f64) -> Result<(i16, i16)> {
    if rate >= 1.0 {
        if rate > i16::MAX as f64 {
            return Err(QuakeError::MseedFormat(format!("sample rate {rate} not representable")));
        }
        Ok((rate.round() as i16, 1))
    } else {
        let period = (1.0 / rate).round();
        if period > i16::MAX as f64 {
            return Err(QuakeError::MseedFormat(format!("sample rate {rate} not representable")));
        }
        Ok((-(period as i16), 1))
    }
}

fn write_ascii(field: &mut [u8], value: &str) {
    field.fill(b' ');
    let bytes = value.as_bytes();
    let n = bytes.len().min(field.len());
    field[..n].copy_from_slice(&bytes[..n]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trace(n: usize) -> Trace {
        Trace {
            network: "IU".to_string(),
            station: "ANMO".to_string(),
            location: "00".to_string(),
            channel: "BHZ".to_string(),
            start_time: Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap(),
            sample_rate: 20.0,
            data: (0..n).map(|i| (i as f64).sin()).collect(),
        }
    }

    #[test]
    fn writer_output_reads_back() {
        let mut stream = Stream::new();
        stream.push(sample_trace(300)); // spans three records

        let bytes = write(&stream).unwrap();
        assert_eq!(bytes.len() % WRITE_RECORD_LEN, 0);
        assert_eq!(bytes.len() / WRITE_RECORD_LEN, 3);

        let parsed = read(&bytes).unwrap();
        assert_eq!(parsed.len(), 1);
        let tr = &parsed.traces[0];
        assert_eq!(tr.id(), "IU.ANMO.00.BHZ");
        assert_eq!(tr.sample_rate, 20.0);
        assert_eq!(tr.start_time, stream.traces[0].start_time);
        assert_eq!(tr.data.len(), 300);
        for (a, b) in tr.data.iter().zip(stream.traces[0].data.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn distinct_channels_stay_separate() {
        let mut stream = Stream::new();
        let mut north = sample_trace(10);
        north.channel = "BHN".to_string();
        stream.push(sample_trace(10));
        stream.push(north);

        let parsed = read(&write(&stream).unwrap()).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn sub_hertz_sample_rate_round_trips() {
        let mut trace = sample_trace(5);
        trace.sample_rate = 0.1;
        let mut stream = Stream::new();
        stream.push(trace);

        let parsed = read(&write(&stream).unwrap()).unwrap();
        assert_eq!(parsed.traces[0].sample_rate, 0.1);
    }

    #[test]
    fn record_without_blockette_1000_is_rejected() {
        let mut record = vec![0u8; 512];
        record[0..6].copy_from_slice(b"000001");
        record[6] = b'D';
        record[20..22].copy_from_slice(&2024u16.to_be_bytes());
        record[22..24].copy_from_slice(&1u16.to_be_bytes());
        assert!(read(&record).is_err());
    }

    #[test]
    fn empty_input_is_an_empty_stream() {
        assert!(read(&[]).unwrap().is_empty());
    }
}
