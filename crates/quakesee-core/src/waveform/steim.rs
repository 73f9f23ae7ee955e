//! Steim-1 and Steim-2 difference decompression
//!
//! Both schemes pack first differences into 64-byte frames of sixteen
//! 32-bit words. Word 0 of each frame holds a 2-bit code per word; frame 0
//! additionally carries the forward (x0) and reverse (xn) integration
//! constants in words 1 and 2.

use tracing::warn;

use crate::error::{QuakeError, Result};

const FRAME_LEN: usize = 64;
const WORDS_PER_FRAME: usize = 16;

pub fn decode_steim1(payload: &[u8], expected: usize) -> Result<Vec<i32>> {
    decode(payload, expected, decode_word_steim1)
}

pub fn decode_steim2(payload: &[u8], expected: usize) -> Result<Vec<i32>> {
    decode(payload, expected, decode_word_steim2)
}

fn decode(
    payload: &[u8],
    expected: usize,
    decode_word: fn(u8, u32, &mut Vec<i32>),
) -> Result<Vec<i32>> {
    if expected == 0 {
        return Ok(Vec::new());
    }
    if payload.len() < FRAME_LEN {
        return Err(QuakeError::MseedFormat(format!(
            "Steim payload of {} bytes has no complete frame",
            payload.len()
        )));
    }

    let mut diffs: Vec<i32> = Vec::with_capacity(expected);
    let mut x0 = 0i32;
    let mut xn = 0i32;

    for (frame_index, frame) in payload.chunks_exact(FRAME_LEN).enumerate() {
        let control = read_u32(frame, 0);
        for word_index in 1..WORDS_PER_FRAME {
            if frame_index == 0 && word_index == 1 {
                x0 = read_u32(frame, 1) as i32;
                continue;
            }
            if frame_index == 0 && word_index == 2 {
                xn = read_u32(frame, 2) as i32;
                continue;
            }
            let code = ((control >> (2 * (WORDS_PER_FRAME - 1 - word_index))) & 0x3) as u8;
            let word = read_u32(frame, word_index);
            decode_word(code, word, &mut diffs);
            if diffs.len() >= expected {
                break;
            }
        }
        if diffs.len() >= expected {
            break;
        }
    }

    if diffs.len() < expected {
        return Err(QuakeError::MseedFormat(format!(
            "Steim payload yielded {} of {} samples",
            diffs.len(),
            expected
        )));
    }
    diffs.truncate(expected);

    // The first difference is relative to the preceding record; x0 replaces it
    let mut samples = Vec::with_capacity(expected);
    samples.push(x0);
    for diff in diffs.iter().skip(1) {
        let prev = *samples.last().expect("samples starts non-empty");
        samples.push(prev.wrapping_add(*diff));
    }

    if let Some(last) = samples.last() {
        if *last != xn {
            warn!(last, xn, "Steim reverse integration constant mismatch");
        }
    }

    Ok(samples)
}

fn decode_word_steim1(code: u8, word: u32, diffs: &mut Vec<i32>) {
    match code {
        1 => {
            for shift in [24, 16, 8, 0] {
                diffs.push(sign_extend(word >> shift, 8));
            }
        }
        2 => {
            for shift in [16, 0] {
                diffs.push(sign_extend(word >> shift, 16));
            }
        }
        3 => diffs.push(word as i32),
        _ => {}
    }
}

fn decode_word_steim2(code: u8, word: u32, diffs: &mut Vec<i32>) {
    match code {
        1 => {
            for shift in [24, 16, 8, 0] {
                diffs.push(sign_extend(word >> shift, 8));
            }
        }
        2 => match word >> 30 {
            1 => diffs.push(sign_extend(word, 30)),
            2 => {
                for shift in [15, 0] {
                    diffs.push(sign_extend(word >> shift, 15));
                }
            }
            3 => {
                for shift in [20, 10, 0] {
                    diffs.push(sign_extend(word >> shift, 10));
                }
            }
            _ => {}
        },
        3 => match word >> 30 {
            0 => {
                for shift in [24, 18, 12, 6, 0] {
                    diffs.push(sign_extend(word >> shift, 6));
                }
            }
            1 => {
                for shift in [25, 20, 15, 10, 5, 0] {
                    diffs.push(sign_extend(word >> shift, 5));
                }
            }
            2 => {
                for shift in [24, 20, 16, 12, 8, 4, 0] {
                    diffs.push(sign_extend(word >> shift, 4));
                }
            }
            _ => {}
        },
        _ => {}
    }
}

fn sign_extend(value: u32, bits: u32) -> i32 {
    ((value << (32 - bits)) as i32) >> (32 - bits)
}

fn read_u32(frame: &[u8], word: usize) -> u32 {
    let offset = word * 4;
    u32::from_be_bytes([frame[offset], frame[offset + 1], frame[offset + 2], frame[offset + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a single Steim-1 frame: x0, xn, then data words with codes.
    fn frame_steim1(x0: i32, xn: i32, words: &[(u8, u32)]) -> Vec<u8> {
        assert!(words.len() <= 13);
        let mut control = 0u32;
        let mut frame = vec![0u8; FRAME_LEN];
        frame[4..8].copy_from_slice(&(x0 as u32).to_be_bytes());
        frame[8..12].copy_from_slice(&(xn as u32).to_be_bytes());
        for (i, (code, word)) in words.iter().enumerate() {
            let word_index = 3 + i;
            control |= (*code as u32) << (2 * (WORDS_PER_FRAME - 1 - word_index));
            let offset = word_index * 4;
            frame[offset..offset + 4].copy_from_slice(&word.to_be_bytes());
        }
        frame[0..4].copy_from_slice(&control.to_be_bytes());
        frame
    }

    #[test]
    fn steim1_four_byte_differences() {
        // Samples 10, 11, 13, 10: diffs after x0 are +1, +2, -3.
        // Word holds four i8 diffs: [ignored-first, 1, 2, -3]
        let word = u32::from_be_bytes([0u8, 1, 2, (-3i8) as u8]);
        let frame = frame_steim1(10, 10, &[(1, word)]);
        let samples = decode_steim1(&frame, 4).unwrap();
        assert_eq!(samples, vec![10, 11, 13, 10]);
    }

    #[test]
    fn steim1_mixed_widths() {
        // diffs: [x, -300] as two i16, then one i32 diff of 70000
        let halves = u32::from_be_bytes({
            let mut b = [0u8; 4];
            b[0..2].copy_from_slice(&0i16.to_be_bytes());
            b[2..4].copy_from_slice(&(-300i16).to_be_bytes());
            b
        });
        let full = 70_000u32;
        let frame = frame_steim1(500, 70_200, &[(2, halves), (3, full)]);
        let samples = decode_steim1(&frame, 3).unwrap();
        assert_eq!(samples, vec![500, 200, 70_200]);
    }

    #[test]
    fn steim2_seven_four_bit_differences() {
        // code 3, dnib 2: seven 4-bit diffs in the low 28 bits
        let mut word: u32 = 2 << 30;
        let diffs: [i32; 7] = [0, 1, -1, 7, -8, 3, 2];
        for (i, d) in diffs.iter().enumerate() {
            word |= ((*d as u32) & 0xF) << (4 * (6 - i));
        }
        let mut expected = vec![100];
        for d in &diffs[1..] {
            expected.push(expected.last().unwrap() + d);
        }
        let frame = frame_steim1(100, *expected.last().unwrap(), &[(3, word)]);
        let samples = decode_steim2(&frame, 7).unwrap();
        assert_eq!(samples, expected);
    }

    #[test]
    fn steim2_thirty_bit_difference() {
        let diff = -123_456_789i32;
        let word = (1u32 << 30) | ((diff as u32) & 0x3FFF_FFFF);
        // First word burns the record-relative diff slot
        let first = u32::from_be_bytes([0, 0, 0, 0]);
        let frame = frame_steim1(42, 42 + diff, &[(1, first), (2, word)]);
        // code 1 yields 4 diffs, the 30-bit word the 5th
        let samples = decode_steim2(&frame, 5).unwrap();
        assert_eq!(samples[0], 42);
        assert_eq!(samples[4], 42 + diff);
    }

    #[test]
    fn truncated_payload_is_an_error() {
        assert!(decode_steim1(&[0u8; 32], 4).is_err());
    }
}
