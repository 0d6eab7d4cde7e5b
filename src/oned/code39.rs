//! Code 39 reader
//!
//! Nine-element characters, three wide out of nine. The asterisk serves as
//! both start and stop. Optionally verifies a trailing mod-43 check digit
//! and expands extended sequences (+A, $A, %A, /A) to full ASCII.

use crate::common::BitArray;
use crate::format::BarcodeFormat;
use crate::hints::DecodeHints;
use crate::oned::{record_pattern, OneDReader};
use crate::symbol::{Point, Symbol};
use crate::{Error, Result};

const ALPHABET: &[u8; 44] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. *$/+%";

/// Wide/narrow layout per character: bit 8..0 map to the nine elements,
/// set bits are wide.
const CHARACTER_ENCODINGS: [u16; 44] = [
    0x034, 0x121, 0x061, 0x160, 0x031, 0x130, 0x070, 0x025, 0x124, 0x064, // 0-9
    0x109, 0x049, 0x148, 0x019, 0x118, 0x058, 0x00D, 0x10C, 0x04C, 0x01C, // A-J
    0x103, 0x043, 0x142, 0x013, 0x112, 0x052, 0x007, 0x106, 0x046, 0x016, // K-T
    0x181, 0x0C1, 0x1C0, 0x091, 0x190, 0x0D0, 0x085, 0x184, 0x0C4, 0x094, // U-*
    0x0A8, 0x0A2, 0x08A, 0x02A, // $-%
];

const ASTERISK_ENCODING: u16 = CHARACTER_ENCODINGS[39];

pub struct Code39Reader {
    using_check_digit: bool,
    extended_mode: bool,
}

impl Code39Reader {
    pub fn new(using_check_digit: bool, extended_mode: bool) -> Self {
        Self {
            using_check_digit,
            extended_mode,
        }
    }
}

impl OneDReader for Code39Reader {
    fn decode_row(
        &self,
        row_number: usize,
        row: &BitArray,
        _hints: &DecodeHints,
    ) -> Result<Symbol> {
        let (start, start_end) = find_asterisk_pattern(row)?;

        let end = row.len();
        let mut next_start = row.next_set(start_end);
        let mut counters = [0usize; 9];
        let mut text = String::new();
        let mut last_start;
        loop {
            record_pattern(row, next_start, &mut counters)?;
            let pattern = to_narrow_wide_pattern(&counters).ok_or(Error::NotFound)?;
            let decoded = pattern_to_char(pattern)?;
            text.push(decoded);
            last_start = next_start;
            next_start += counters.iter().sum::<usize>();
            next_start = row.next_set(next_start).min(end);
            if decoded == '*' {
                break;
            }
            if next_start >= end {
                return Err(Error::NotFound);
            }
        }
        text.pop(); // trailing asterisk

        if self.using_check_digit {
            let Some(check) = text.pop() else {
                return Err(Error::NotFound);
            };
            let total: usize = text
                .bytes()
                .map(|b| ALPHABET.iter().position(|&a| a == b).unwrap_or(0))
                .sum();
            let expected = ALPHABET[total % 43];
            if check != char::from(expected) {
                return Err(Error::Checksum);
            }
        }

        let text = if self.extended_mode {
            decode_extended(&text)?
        } else {
            text
        };
        if text.is_empty() {
            return Err(Error::NotFound);
        }

        let left = (start + start_end) as f32 / 2.0;
        let right = (last_start + next_start) as f32 / 2.0;
        Ok(Symbol::new(
            text,
            vec![
                Point::new(left, row_number as f32),
                Point::new(right, row_number as f32),
            ],
            BarcodeFormat::Code39,
        ))
    }
}

fn find_asterisk_pattern(row: &BitArray) -> Result<(usize, usize)> {
    let width = row.len();
    let row_offset = row.next_set(0);

    let mut counter_position = 0usize;
    let mut counters = [0usize; 9];
    let mut pattern_start = row_offset;
    let mut is_white = false;
    for i in row_offset..width {
        if row.get(i) != is_white {
            counters[counter_position] += 1;
        } else {
            if counter_position == 8 {
                if to_narrow_wide_pattern(&counters) == Some(ASTERISK_ENCODING)
                    && quiet_zone_ok(row, pattern_start, &counters)
                {
                    return Ok((pattern_start, i));
                }
                pattern_start += counters[0] + counters[1];
                counters.copy_within(2.., 0);
                counters[7] = 0;
                counters[8] = 0;
                counter_position -= 1;
            } else {
                counter_position += 1;
            }
            counters[counter_position] = 1;
            is_white = !is_white;
        }
    }
    Err(Error::NotFound)
}

/// The start asterisk must be preceded by a quiet zone at least half its
/// own width.
fn quiet_zone_ok(row: &BitArray, pattern_start: usize, counters: &[usize; 9]) -> bool {
    let pattern_width: usize = counters.iter().sum();
    match pattern_start.checked_sub(pattern_width / 2) {
        Some(quiet_start) => row.is_range(quiet_start, pattern_start, false),
        None => false,
    }
}

/// Classify the nine runs into exactly three wide elements; the threshold
/// is lowered until that works or proves impossible.
fn to_narrow_wide_pattern(counters: &[usize; 9]) -> Option<u16> {
    let mut max_narrow = 0usize;
    loop {
        let min_above = counters.iter().copied().filter(|&c| c > max_narrow).min()?;
        max_narrow = min_above;
        let mut wide_count = 0;
        let mut pattern = 0u16;
        for (i, &counter) in counters.iter().enumerate() {
            if counter > max_narrow {
                pattern |= 1 << (8 - i);
                wide_count += 1;
            }
        }
        match wide_count {
            3 => return Some(pattern),
            n if n > 3 => continue,
            _ => return None,
        }
    }
}

fn pattern_to_char(pattern: u16) -> Result<char> {
    CHARACTER_ENCODINGS
        .iter()
        .position(|&enc| enc == pattern)
        .map(|i| char::from(ALPHABET[i]))
        .ok_or(Error::NotFound)
}

/// Expand extended Code 39 pairs to ASCII.
fn decode_extended(encoded: &str) -> Result<String> {
    let bytes = encoded.as_bytes();
    let mut decoded = String::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if matches!(c, b'+' | b'$' | b'%' | b'/') {
            let next = *bytes
                .get(i + 1)
                .ok_or(Error::Format("dangling extended code 39 escape"))?;
            let decoded_char = match c {
                // +A..+Z are a..z
                b'+' if next.is_ascii_uppercase() => next + 32,
                // $A..$Z are control codes SOH..SUB
                b'$' if next.is_ascii_uppercase() => next - 64,
                // %A..%E are ESC..US, %F..%W the remaining punctuation
                b'%' if (b'A'..=b'E').contains(&next) => next - 38,
                b'%' if (b'F'..=b'W').contains(&next) => next - 11,
                // /A../O are ! to , and /Z is :
                b'/' if (b'A'..=b'O').contains(&next) => next - 32,
                b'/' if next == b'Z' => b':',
                _ => return Err(Error::Format("invalid extended code 39 sequence")),
            };
            decoded.push(char::from(decoded_char));
            i += 2;
        } else {
            decoded.push(char::from(c));
            i += 1;
        }
    }
    Ok(decoded)
}
