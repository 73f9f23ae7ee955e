//! Date-range partitioning for bulk catalog downloads

use chrono::{Duration, NaiveDate};
use quakesee_core::{QuakeError, Result};

/// One inclusive date range of a partitioned bulk request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateChunk {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateChunk {
    /// Stem used for the files of this chunk, `YYYY-mm-dd_to_YYYY-mm-dd`.
    pub fn name(&self) -> String {
        format!("{}_to_{}", self.start, self.end)
    }
}

/// Split `[start, end]` into consecutive inclusive chunks of at most
/// `step_days` days between chunk start and chunk end.
///
/// Chunks never overlap: each one begins the day after its predecessor
/// ends, and the final chunk is clipped to `end`.
pub fn partition(start: NaiveDate, end: NaiveDate, step_days: u32) -> Result<Vec<DateChunk>> {
    if step_days == 0 {
        return Err(QuakeError::Selection(
            "chunk length must be at least one day".to_string(),
        ));
    }
    if start > end {
        return Err(QuakeError::Selection(format!(
            "start date {start} is after end date {end}"
        )));
    }

    let step = Duration::days(step_days as i64);
    let mut chunks = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        let chunk_end = (cursor + step).min(end);
        chunks.push(DateChunk {
            start: cursor,
            end: chunk_end,
        });
        cursor = chunk_end + Duration::days(1);
    }
    Ok(chunks)
}

/// Whole-percent completion after `done` of `total` chunks.
pub fn percent_complete(done: usize, total: usize) -> u8 {
    if total == 0 {
        100
    } else {
        (done * 100 / total) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn ten_days_in_steps_of_three() {
        let chunks = partition(d("2023-01-01"), d("2023-01-10"), 3).unwrap();
        assert_eq!(
            chunks,
            vec![
                DateChunk { start: d("2023-01-01"), end: d("2023-01-04") },
                DateChunk { start: d("2023-01-05"), end: d("2023-01-08") },
                DateChunk { start: d("2023-01-09"), end: d("2023-01-10") },
            ]
        );
    }

    #[test]
    fn single_day_range_is_one_chunk() {
        let chunks = partition(d("2023-06-15"), d("2023-06-15"), 30).unwrap();
        assert_eq!(chunks, vec![DateChunk { start: d("2023-06-15"), end: d("2023-06-15") }]);
    }

    #[test]
    fn step_larger_than_range_clips_to_end() {
        let chunks = partition(d("2023-01-01"), d("2023-01-05"), 365).unwrap();
        assert_eq!(chunks, vec![DateChunk { start: d("2023-01-01"), end: d("2023-01-05") }]);
    }

    #[test]
    fn zero_step_is_rejected() {
        assert!(partition(d("2023-01-01"), d("2023-01-10"), 0).is_err());
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(partition(d("2023-01-10"), d("2023-01-01"), 3).is_err());
    }

    #[test]
    fn chunks_are_contiguous_and_cover_the_range() {
        let start = d("2020-02-25");
        let end = d("2020-12-31");
        let chunks = partition(start, end, 7).unwrap();
        assert_eq!(chunks.first().unwrap().start, start);
        assert_eq!(chunks.last().unwrap().end, end);
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end + Duration::days(1), pair[1].start);
        }
    }

    #[test]
    fn progress_rounds_down() {
        assert_eq!(percent_complete(3, 7), 42);
        assert_eq!(percent_complete(0, 7), 0);
        assert_eq!(percent_complete(7, 7), 100);
        assert_eq!(percent_complete(0, 0), 100);
    }

    #[test]
    fn chunk_names_carry_both_dates() {
        let chunk = DateChunk { start: d("2023-01-05"), end: d("2023-01-08") };
        assert_eq!(chunk.name(), "2023-01-05_to_2023-01-08");
    }
}
