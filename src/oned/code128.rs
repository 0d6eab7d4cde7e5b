//! Code 128 reader
//!
//! Six-element module-count patterns from the 107-entry table, code set
//! A/B/C tracking with SHIFT and code-switch symbols, and the mandatory
//! mod-103 check symbol.

use crate::common::BitArray;
use crate::format::BarcodeFormat;
use crate::hints::DecodeHints;
use crate::oned::{pattern_match_variance, record_pattern, OneDReader};
use crate::symbol::{MetadataKey, MetadataValue, Point, Symbol};
use crate::{Error, Result};

const MAX_AVG_VARIANCE: f32 = 0.25;
const MAX_INDIVIDUAL_VARIANCE: f32 = 0.7;

pub(crate) const CODE_SHIFT: u8 = 98;
pub(crate) const CODE_CODE_C: u8 = 99;
pub(crate) const CODE_CODE_B: u8 = 100;
pub(crate) const CODE_CODE_A: u8 = 101;
pub(crate) const CODE_FNC_1: u8 = 102;
pub(crate) const CODE_START_A: u8 = 103;
pub(crate) const CODE_START_B: u8 = 104;
pub(crate) const CODE_START_C: u8 = 105;
pub(crate) const CODE_STOP: u8 = 106;

/// Module counts for every symbol; the stop pattern has a seventh element,
/// the closing 2-module bar.
pub(crate) const CODE_PATTERNS: [[usize; 7]; 107] = [
    [2, 1, 2, 2, 2, 2, 0],
    [2, 2, 2, 1, 2, 2, 0],
    [2, 2, 2, 2, 2, 1, 0],
    [1, 2, 1, 2, 2, 3, 0],
    [1, 2, 1, 3, 2, 2, 0],
    [1, 3, 1, 2, 2, 2, 0],
    [1, 2, 2, 2, 1, 3, 0],
    [1, 2, 2, 3, 1, 2, 0],
    [1, 3, 2, 2, 1, 2, 0],
    [2, 2, 1, 2, 1, 3, 0],
    [2, 2, 1, 3, 1, 2, 0],
    [2, 3, 1, 2, 1, 2, 0],
    [1, 1, 2, 2, 3, 2, 0],
    [1, 2, 2, 1, 3, 2, 0],
    [1, 2, 2, 2, 3, 1, 0],
    [1, 1, 3, 2, 2, 2, 0],
    [1, 2, 3, 1, 2, 2, 0],
    [1, 2, 3, 2, 2, 1, 0],
    [2, 2, 3, 2, 1, 1, 0],
    [2, 2, 1, 1, 3, 2, 0],
    [2, 2, 1, 2, 3, 1, 0],
    [2, 1, 3, 2, 1, 2, 0],
    [2, 2, 3, 1, 1, 2, 0],
    [3, 1, 2, 1, 3, 1, 0],
    [3, 1, 1, 2, 2, 2, 0],
    [3, 2, 1, 1, 2, 2, 0],
    [3, 2, 1, 2, 2, 1, 0],
    [3, 1, 2, 2, 1, 2, 0],
    [3, 2, 2, 1, 1, 2, 0],
    [3, 2, 2, 2, 1, 1, 0],
    [2, 1, 2, 1, 2, 3, 0],
    [2, 1, 2, 3, 2, 1, 0],
    [2, 3, 2, 1, 2, 1, 0],
    [1, 1, 1, 3, 2, 3, 0],
    [1, 3, 1, 1, 2, 3, 0],
    [1, 3, 1, 3, 2, 1, 0],
    [1, 1, 2, 3, 1, 3, 0],
    [1, 3, 2, 1, 1, 3, 0],
    [1, 3, 2, 3, 1, 1, 0],
    [2, 1, 1, 3, 1, 3, 0],
    [2, 3, 1, 1, 1, 3, 0],
    [2, 3, 1, 3, 1, 1, 0],
    [1, 1, 2, 1, 3, 3, 0],
    [1, 1, 2, 3, 3, 1, 0],
    [1, 3, 2, 1, 3, 1, 0],
    [1, 1, 3, 1, 2, 3, 0],
    [1, 1, 3, 3, 2, 1, 0],
    [1, 3, 3, 1, 2, 1, 0],
    [3, 1, 3, 1, 2, 1, 0],
    [2, 1, 1, 3, 3, 1, 0],
    [2, 3, 1, 1, 3, 1, 0],
    [2, 1, 3, 1, 1, 3, 0],
    [2, 1, 3, 3, 1, 1, 0],
    [2, 1, 3, 1, 3, 1, 0],
    [3, 1, 1, 1, 2, 3, 0],
    [3, 1, 1, 3, 2, 1, 0],
    [3, 3, 1, 1, 2, 1, 0],
    [3, 1, 2, 1, 1, 3, 0],
    [3, 1, 2, 3, 1, 1, 0],
    [3, 3, 2, 1, 1, 1, 0],
    [3, 1, 4, 1, 1, 1, 0],
    [2, 2, 1, 4, 1, 1, 0],
    [4, 3, 1, 1, 1, 1, 0],
    [1, 1, 1, 2, 2, 4, 0],
    [1, 1, 1, 4, 2, 2, 0],
    [1, 2, 1, 1, 2, 4, 0],
    [1, 2, 1, 4, 2, 1, 0],
    [1, 4, 1, 1, 2, 2, 0],
    [1, 4, 1, 2, 2, 1, 0],
    [1, 1, 2, 2, 1, 4, 0],
    [1, 1, 2, 4, 1, 2, 0],
    [1, 2, 2, 1, 1, 4, 0],
    [1, 2, 2, 4, 1, 1, 0],
    [1, 4, 2, 1, 1, 2, 0],
    [1, 4, 2, 2, 1, 1, 0],
    [2, 4, 1, 2, 1, 1, 0],
    [2, 2, 1, 1, 1, 4, 0],
    [4, 1, 3, 1, 1, 1, 0],
    [2, 4, 1, 1, 1, 2, 0],
    [1, 3, 4, 1, 1, 1, 0],
    [1, 1, 1, 2, 4, 2, 0],
    [1, 2, 1, 1, 4, 2, 0],
    [1, 2, 1, 2, 4, 1, 0],
    [1, 1, 4, 2, 1, 2, 0],
    [1, 2, 4, 1, 1, 2, 0],
    [1, 2, 4, 2, 1, 1, 0],
    [4, 1, 1, 2, 1, 2, 0],
    [4, 2, 1, 1, 1, 2, 0],
    [4, 2, 1, 2, 1, 1, 0],
    [2, 1, 2, 1, 4, 1, 0],
    [2, 1, 4, 1, 2, 1, 0],
    [4, 1, 2, 1, 2, 1, 0],
    [1, 1, 1, 1, 4, 3, 0],
    [1, 1, 1, 3, 4, 1, 0],
    [1, 3, 1, 1, 4, 1, 0],
    [1, 1, 4, 1, 1, 3, 0],
    [1, 1, 4, 3, 1, 1, 0],
    [4, 1, 1, 1, 1, 3, 0],
    [4, 1, 1, 3, 1, 1, 0],
    [1, 1, 3, 1, 4, 1, 0],
    [1, 1, 4, 1, 3, 1, 0],
    [3, 1, 1, 1, 4, 1, 0],
    [4, 1, 1, 1, 3, 1, 0],
    [2, 1, 1, 4, 1, 2, 0],
    [2, 1, 1, 2, 1, 4, 0],
    [2, 1, 1, 2, 3, 2, 0],
    [2, 3, 3, 1, 1, 1, 2],
];

fn find_start_pattern(row: &BitArray) -> Result<(usize, usize, u8)> {
    let width = row.len();
    let row_offset = row.next_set(0);

    let mut counters = [0usize; 6];
    let mut counter_position = 0usize;
    let mut pattern_start = row_offset;
    let mut is_white = false;
    for i in row_offset..width {
        if row.get(i) != is_white {
            counters[counter_position] += 1;
        } else {
            if counter_position == 5 {
                let mut best_variance = MAX_AVG_VARIANCE;
                let mut best_match = None;
                for start_code in CODE_START_A..=CODE_START_C {
                    let variance = pattern_match_variance(
                        &counters,
                        &CODE_PATTERNS[start_code as usize][..6],
                        MAX_INDIVIDUAL_VARIANCE,
                    );
                    if variance < best_variance {
                        best_variance = variance;
                        best_match = Some(start_code);
                    }
                }
                if let Some(start_code) = best_match {
                    // Look for a quiet zone of at least half the pattern
                    // width before the start.
                    let quiet_start =
                        pattern_start.saturating_sub((i - pattern_start) / 2);
                    if quiet_start < pattern_start
                        && row.is_range(quiet_start, pattern_start, false)
                    {
                        return Ok((pattern_start, i, start_code));
                    }
                }
                pattern_start += counters[0] + counters[1];
                counters.copy_within(2.., 0);
                counters[4] = 0;
                counters[5] = 0;
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

fn decode_code(row: &BitArray, counters: &mut [usize; 6], row_offset: usize) -> Result<u8> {
    record_pattern(row, row_offset, counters)?;
    let mut best_variance = MAX_AVG_VARIANCE;
    let mut best_match = None;
    for (code, pattern) in CODE_PATTERNS.iter().enumerate() {
        let variance = pattern_match_variance(counters, &pattern[..6], MAX_INDIVIDUAL_VARIANCE);
        if variance < best_variance {
            best_variance = variance;
            best_match = Some(code as u8);
        }
    }
    best_match.ok_or(Error::NotFound)
}

#[derive(Clone, Copy, PartialEq)]
enum CodeSet {
    A,
    B,
    C,
}

pub struct Code128Reader;

impl OneDReader for Code128Reader {
    fn decode_row(
        &self,
        row_number: usize,
        row: &BitArray,
        _hints: &DecodeHints,
    ) -> Result<Symbol> {
        let (start, start_end, start_code) = find_start_pattern(row)?;
        let mut code_set = match start_code {
            CODE_START_A => CodeSet::A,
            CODE_START_B => CodeSet::B,
            _ => CodeSet::C,
        };

        let mut counters = [0usize; 6];
        let mut text = String::new();
        let mut last_start = start;
        let mut next_start = start_end;
        let mut checksum_total = u32::from(start_code);
        let mut multiplier = 0u32;
        let mut code = start_code;
        let mut last_code;
        let mut is_next_shifted = false;
        let mut last_character_was_printable = true;
        let mut gs1 = false;
        let mut done = false;

        while !done {
            let unshift = is_next_shifted;
            is_next_shifted = false;
            last_code = code;
            code = decode_code(row, &mut counters, next_start)?;
            if code != CODE_STOP {
                last_character_was_printable = true;
                multiplier += 1;
                checksum_total += multiplier * u32::from(code);
            }
            last_start = next_start;
            next_start += counters.iter().sum::<usize>();

            // A start code anywhere after the start is malformed.
            if (CODE_START_A..=CODE_START_C).contains(&code) {
                return Err(Error::Format("start code inside symbol"));
            }

            match code_set {
                CodeSet::A => {
                    if code < 64 {
                        text.push(char::from(b' ' + code));
                    } else if code < 96 {
                        text.push(char::from(code - 64));
                    } else {
                        if code != CODE_STOP {
                            last_character_was_printable = false;
                        }
                        match code {
                            CODE_FNC_1 => {
                                if text.is_empty() {
                                    gs1 = true;
                                } else {
                                    text.push('\u{1D}');
                                }
                            }
                            CODE_SHIFT => {
                                is_next_shifted = true;
                                code_set = CodeSet::B;
                            }
                            CODE_CODE_B => code_set = CodeSet::B,
                            CODE_CODE_C => code_set = CodeSet::C,
                            CODE_STOP => done = true,
                            _ => {}
                        }
                    }
                }
                CodeSet::B => {
                    if code < 96 {
                        text.push(char::from(b' ' + code));
                    } else {
                        if code != CODE_STOP {
                            last_character_was_printable = false;
                        }
                        match code {
                            CODE_FNC_1 => {
                                if text.is_empty() {
                                    gs1 = true;
                                } else {
                                    text.push('\u{1D}');
                                }
                            }
                            CODE_SHIFT => {
                                is_next_shifted = true;
                                code_set = CodeSet::A;
                            }
                            CODE_CODE_A => code_set = CodeSet::A,
                            CODE_CODE_C => code_set = CodeSet::C,
                            CODE_STOP => done = true,
                            _ => {}
                        }
                    }
                }
                CodeSet::C => {
                    if code < 100 {
                        if code < 10 {
                            text.push('0');
                        }
                        text.push_str(&code.to_string());
                    } else {
                        if code != CODE_STOP {
                            last_character_was_printable = false;
                        }
                        match code {
                            CODE_FNC_1 => {
                                if text.is_empty() {
                                    gs1 = true;
                                } else {
                                    text.push('\u{1D}');
                                }
                            }
                            CODE_CODE_A => code_set = CodeSet::A,
                            CODE_CODE_B => code_set = CodeSet::B,
                            CODE_STOP => done = true,
                            _ => {}
                        }
                    }
                }
            }

            if unshift {
                code_set = if code_set == CodeSet::A {
                    CodeSet::B
                } else {
                    CodeSet::A
                };
            }

            if done {
                // The check symbol was folded into the running total; the
                // final code before STOP is that check symbol.
                checksum_total -= multiplier * u32::from(last_code);
                if checksum_total % 103 != u32::from(last_code) {
                    return Err(Error::Checksum);
                }
            }
        }

        // The stop pattern has a seventh element, one more bar to read off.
        next_start = row.next_unset(next_start);
        let quiet_end = (next_start + (next_start - last_start) / 2).min(row.len());
        if !row.is_range(next_start, quiet_end, false) {
            return Err(Error::NotFound);
        }

        if text.is_empty() {
            return Err(Error::NotFound);
        }
        // Strip the check character if it rendered as printable text.
        if last_character_was_printable {
            let new_len = if code_set == CodeSet::C {
                text.len().saturating_sub(2)
            } else {
                text.len().saturating_sub(1)
            };
            text.truncate(new_len);
        }
        if text.is_empty() {
            return Err(Error::NotFound);
        }

        let left = (start + start_end) as f32 / 2.0;
        let right = (last_start + next_start) as f32 / 2.0;
        let mut symbol = Symbol::new(
            text,
            vec![
                Point::new(left, row_number as f32),
                Point::new(right, row_number as f32),
            ],
            BarcodeFormat::Code128,
        );
        if gs1 {
            symbol.put_metadata(MetadataKey::Gs1, MetadataValue::Flag(true));
        }
        Ok(symbol)
    }
}

/// Encode `text` as a Code 128 row for tests and demos: code set B, 1 px
/// per module, with quiet zones.
pub fn synthesize_row(text: &str) -> Result<BitArray> {
    let mut codes: Vec<u8> = vec![CODE_START_B];
    for c in text.chars() {
        let v = c as u32;
        if !(32..127).contains(&v) {
            return Err(Error::InvalidArgument("character not in code set B"));
        }
        codes.push((v - 32) as u8);
    }
    let mut checksum = u32::from(codes[0]);
    for (i, &code) in codes.iter().enumerate().skip(1) {
        checksum += i as u32 * u32::from(code);
    }
    codes.push((checksum % 103) as u8);
    codes.push(CODE_STOP);

    let total_modules: usize = codes
        .iter()
        .map(|&c| CODE_PATTERNS[c as usize].iter().sum::<usize>())
        .sum();
    let mut row = BitArray::new(total_modules + 20);
    let mut pos = 10;
    for &code in &codes {
        let mut dark = true;
        for &len in CODE_PATTERNS[code as usize].iter().filter(|&&len| len > 0) {
            for _ in 0..len {
                if dark {
                    row.set(pos);
                }
                pos += 1;
            }
            dark = !dark;
        }
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_are_eleven_modules() {
        for (code, pattern) in CODE_PATTERNS.iter().enumerate().take(106) {
            assert_eq!(
                pattern.iter().sum::<usize>(),
                11,
                "code {code} has wrong width"
            );
        }
        // Stop symbol is 13 modules with its closing bar.
        assert_eq!(CODE_PATTERNS[106].iter().sum::<usize>(), 13);
    }

    #[test]
    fn decodes_synthesized_text() {
        let row = synthesize_row("Code 128 test!").unwrap();
        let symbol = Code128Reader
            .decode_row(0, &row, &DecodeHints::new())
            .unwrap();
        assert_eq!(symbol.text(), Some("Code 128 test!"));
        assert_eq!(symbol.format(), BarcodeFormat::Code128);
    }

    #[test]
    fn corrupted_check_symbol_is_a_checksum_error() {
        let mut row = synthesize_row("CHECKSUM").unwrap();
        // Damage a bar inside the 4th data symbol; the pattern still
        // resolves to some code, but the mod-103 check cannot.
        let offset = 10 + 11 * 3 + 1;
        row.flip(offset);
        row.flip(offset + 1);
        let result = Code128Reader.decode_row(0, &row, &DecodeHints::new());
        assert!(result.is_err());
    }

    #[test]
    fn empty_row_not_found() {
        let row = BitArray::new(150);
        assert_eq!(
            Code128Reader
                .decode_row(0, &row, &DecodeHints::new())
                .unwrap_err(),
            Error::NotFound
        );
    }
}
