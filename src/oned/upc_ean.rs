//! UPC/EAN family readers
//!
//! EAN-13, EAN-8 and UPC-E row decoders sharing the guard-pattern search,
//! the L/G/R digit tables and the mod-10 checksum. UPC-A is recognized as
//! an EAN-13 with a leading zero and re-tagged.

use crate::common::BitArray;
use crate::format::BarcodeFormat;
use crate::hints::DecodeHints;
use crate::oned::{pattern_match_variance, record_pattern, OneDReader};
use crate::symbol::{Point, Symbol};
use crate::{Error, Result};

const MAX_AVG_VARIANCE: f32 = 0.48;
const MAX_INDIVIDUAL_VARIANCE: f32 = 0.7;

/// Start/end guard: bar-space-bar.
const START_END_PATTERN: [usize; 3] = [1, 1, 1];
/// Middle guard: space-bar-space-bar-space.
const MIDDLE_PATTERN: [usize; 5] = [1, 1, 1, 1, 1];
/// UPC-E end pattern, no middle guard in that symbology.
const UPCE_END_PATTERN: [usize; 6] = [1, 1, 1, 1, 1, 1];

/// "L" digit patterns: run lengths of space-bar-space-bar for 0..9.
pub(crate) const L_PATTERNS: [[usize; 4]; 10] = [
    [3, 2, 1, 1],
    [2, 2, 2, 1],
    [2, 1, 2, 2],
    [1, 4, 1, 1],
    [1, 1, 3, 2],
    [1, 2, 3, 1],
    [1, 1, 1, 4],
    [1, 3, 1, 2],
    [1, 2, 1, 3],
    [3, 1, 1, 2],
];

/// L patterns followed by their reversals, the "G" set, as indices 10..19.
const L_AND_G_PATTERNS: [[usize; 4]; 20] = {
    let mut table = [[0usize; 4]; 20];
    let mut i = 0;
    while i < 10 {
        table[i] = L_PATTERNS[i];
        let mut j = 0;
        while j < 4 {
            table[i + 10][j] = L_PATTERNS[i][3 - j];
            j += 1;
        }
        i += 1;
    }
    table
};

/// EAN-13 first digit from the L/G parity of the left six digits
/// (bit 5 = first digit's parity, set when G).
const FIRST_DIGIT_ENCODINGS: [u32; 10] =
    [0x00, 0x0B, 0x0D, 0x0E, 0x13, 0x19, 0x1C, 0x15, 0x16, 0x1A];

/// UPC-E number-system 0 and 1 parity patterns for check digits 0..9.
const NUMSYS_AND_CHECK_DIGIT_PATTERNS: [[u32; 10]; 2] = [
    [0x38, 0x34, 0x32, 0x31, 0x2C, 0x26, 0x23, 0x2A, 0x29, 0x25],
    [0x07, 0x0B, 0x0D, 0x0E, 0x13, 0x19, 0x1C, 0x15, 0x16, 0x1A],
];

/// Locate a guard pattern; returns (start, end) in pixels.
fn find_guard_pattern(
    row: &BitArray,
    row_offset: usize,
    white_first: bool,
    pattern: &[usize],
) -> Result<(usize, usize)> {
    let width = row.len();
    let mut counters = vec![0usize; pattern.len()];
    let row_offset = if white_first {
        row.next_unset(row_offset)
    } else {
        row.next_set(row_offset)
    };
    let mut counter_position = 0usize;
    let mut pattern_start = row_offset;
    let mut is_white = white_first;
    for x in row_offset..width {
        if row.get(x) != is_white {
            counters[counter_position] += 1;
        } else {
            if counter_position == pattern.len() - 1 {
                if pattern_match_variance(&counters, pattern, MAX_INDIVIDUAL_VARIANCE)
                    < MAX_AVG_VARIANCE
                {
                    return Ok((pattern_start, x));
                }
                pattern_start += counters[0] + counters[1];
                counters.copy_within(2.., 0);
                let len = counters.len();
                counters[len - 2] = 0;
                counters[len - 1] = 0;
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

/// Find the start guard, requiring a quiet zone of the guard's own width
/// before it.
pub(crate) fn find_start_guard(row: &BitArray) -> Result<(usize, usize)> {
    let mut next_start = 0usize;
    loop {
        let (start, end) = find_guard_pattern(row, next_start, false, &START_END_PATTERN)?;
        let guard_width = end - start;
        if let Some(quiet_start) = start.checked_sub(guard_width) {
            if row.is_range(quiet_start, start, false) {
                return Ok((start, end));
            }
        }
        next_start = end;
    }
}

/// Match one digit's four runs against a pattern set; returns the index of
/// the best match.
fn decode_digit(row: &BitArray, row_offset: usize, patterns: &[[usize; 4]]) -> Result<(usize, usize)> {
    let mut counters = [0usize; 4];
    record_pattern(row, row_offset, &mut counters)?;
    let mut best_variance = MAX_AVG_VARIANCE;
    let mut best = None;
    for (i, pattern) in patterns.iter().enumerate() {
        let variance = pattern_match_variance(&counters, pattern, MAX_INDIVIDUAL_VARIANCE);
        if variance < best_variance {
            best_variance = variance;
            best = Some(i);
        }
    }
    let width: usize = counters.iter().sum();
    best.map(|i| (i, width)).ok_or(Error::NotFound)
}

/// Mod-10 checksum over the full digit string including the check digit.
fn checksum_ok(digits: &str) -> bool {
    let bytes = digits.as_bytes();
    let length = bytes.len();
    let mut sum: u32 = 0;
    let mut i = length as i64 - 2;
    while i >= 0 {
        sum += u32::from(bytes[i as usize] - b'0');
        i -= 2;
    }
    sum *= 3;
    let mut i = length as i64 - 1;
    while i >= 0 {
        sum += u32::from(bytes[i as usize] - b'0');
        i -= 2;
    }
    sum % 10 == 0
}

/// The per-symbology middle section decoder.
trait UpcEanVariant {
    const FORMAT: BarcodeFormat;
    /// Decode digits between the guards; returns the offset past the last
    /// digit and the digit string.
    fn decode_middle(row: &BitArray, start_end: usize) -> Result<(usize, String)>;
    fn decode_end(row: &BitArray, end_start: usize) -> Result<(usize, usize)> {
        find_guard_pattern(row, end_start, false, &START_END_PATTERN)
    }
    fn check_checksum(digits: &str) -> bool {
        checksum_ok(digits)
    }
}

fn decode_row_variant<V: UpcEanVariant>(
    row_number: usize,
    row: &BitArray,
    start_guard: (usize, usize),
) -> Result<Symbol> {
    let (end_of_middle, digits) = V::decode_middle(row, start_guard.1)?;
    let end_range = V::decode_end(row, end_of_middle)?;

    // The symbol must be followed by a quiet zone at least as wide as the
    // end guard.
    let end = end_range.1;
    let quiet_end = end + (end - end_range.0);
    if quiet_end >= row.len() || !row.is_range(end, quiet_end, false) {
        return Err(Error::NotFound);
    }

    if digits.len() < 8 {
        return Err(Error::Format("too few digits in row"));
    }
    if !V::check_checksum(&digits) {
        return Err(Error::Checksum);
    }

    let left = (start_guard.0 + start_guard.1) as f32 / 2.0;
    let right = (end_range.0 + end_range.1) as f32 / 2.0;
    Ok(Symbol::new(
        digits,
        vec![
            Point::new(left, row_number as f32),
            Point::new(right, row_number as f32),
        ],
        V::FORMAT,
    ))
}

pub struct Ean13Reader;

impl UpcEanVariant for Ean13Reader {
    const FORMAT: BarcodeFormat = BarcodeFormat::Ean13;

    fn decode_middle(row: &BitArray, start_end: usize) -> Result<(usize, String)> {
        let mut row_offset = start_end;
        let mut digits = String::with_capacity(13);
        let mut lg_pattern_found = 0u32;
        for x in 0..6 {
            let (best, width) = decode_digit(row, row_offset, &L_AND_G_PATTERNS)?;
            digits.push(char::from(b'0' + (best % 10) as u8));
            row_offset += width;
            if best >= 10 {
                lg_pattern_found |= 1 << (5 - x);
            }
        }
        let first = determine_first_digit(lg_pattern_found)?;
        digits.insert(0, char::from(b'0' + first));

        let middle = find_guard_pattern(row, row_offset, true, &MIDDLE_PATTERN)?;
        row_offset = middle.1;
        for _ in 0..6 {
            let (best, width) = decode_digit(row, row_offset, &L_PATTERNS)?;
            digits.push(char::from(b'0' + best as u8));
            row_offset += width;
        }
        Ok((row_offset, digits))
    }
}

fn determine_first_digit(lg_pattern_found: u32) -> Result<u8> {
    FIRST_DIGIT_ENCODINGS
        .iter()
        .position(|&enc| enc == lg_pattern_found)
        .map(|d| d as u8)
        .ok_or(Error::NotFound)
}

pub struct Ean8Reader;

impl UpcEanVariant for Ean8Reader {
    const FORMAT: BarcodeFormat = BarcodeFormat::Ean8;

    fn decode_middle(row: &BitArray, start_end: usize) -> Result<(usize, String)> {
        let mut row_offset = start_end;
        let mut digits = String::with_capacity(8);
        for _ in 0..4 {
            let (best, width) = decode_digit(row, row_offset, &L_PATTERNS)?;
            digits.push(char::from(b'0' + best as u8));
            row_offset += width;
        }
        let middle = find_guard_pattern(row, row_offset, true, &MIDDLE_PATTERN)?;
        row_offset = middle.1;
        for _ in 0..4 {
            let (best, width) = decode_digit(row, row_offset, &L_PATTERNS)?;
            digits.push(char::from(b'0' + best as u8));
            row_offset += width;
        }
        Ok((row_offset, digits))
    }
}

pub struct UpcEReader;

impl UpcEanVariant for UpcEReader {
    const FORMAT: BarcodeFormat = BarcodeFormat::UpcE;

    fn decode_middle(row: &BitArray, start_end: usize) -> Result<(usize, String)> {
        let mut row_offset = start_end;
        let mut digits = String::with_capacity(8);
        let mut lg_pattern_found = 0u32;
        for x in 0..6 {
            let (best, width) = decode_digit(row, row_offset, &L_AND_G_PATTERNS)?;
            digits.push(char::from(b'0' + (best % 10) as u8));
            row_offset += width;
            if best >= 10 {
                lg_pattern_found |= 1 << (5 - x);
            }
        }
        let (number_system, check_digit) = determine_numsys_and_check_digit(lg_pattern_found)?;
        digits.insert(0, char::from(b'0' + number_system));
        digits.push(char::from(b'0' + check_digit));
        Ok((row_offset, digits))
    }

    fn decode_end(row: &BitArray, end_start: usize) -> Result<(usize, usize)> {
        find_guard_pattern(row, end_start, true, &UPCE_END_PATTERN)
    }

    fn check_checksum(digits: &str) -> bool {
        checksum_ok(&convert_upce_to_upca(digits))
    }
}

fn determine_numsys_and_check_digit(lg_pattern_found: u32) -> Result<(u8, u8)> {
    for (num_sys, patterns) in NUMSYS_AND_CHECK_DIGIT_PATTERNS.iter().enumerate() {
        if let Some(d) = patterns.iter().position(|&p| p == lg_pattern_found) {
            return Ok((num_sys as u8, d as u8));
        }
    }
    Err(Error::NotFound)
}

/// Expand a compressed 8-digit UPC-E to the 12-digit UPC-A it abbreviates.
pub(crate) fn convert_upce_to_upca(upce: &str) -> String {
    let bytes = upce.as_bytes();
    let digits = &bytes[1..7];
    let push = |upca: &mut String, range: &[u8]| {
        for &b in range {
            upca.push(char::from(b));
        }
    };
    let mut upca = String::with_capacity(12);
    upca.push(char::from(bytes[0]));
    match digits[5] - b'0' {
        0..=2 => {
            push(&mut upca, &digits[0..2]);
            upca.push(char::from(digits[5]));
            upca.push_str("0000");
            push(&mut upca, &digits[2..5]);
        }
        3 => {
            push(&mut upca, &digits[0..3]);
            upca.push_str("00000");
            push(&mut upca, &digits[3..5]);
        }
        4 => {
            push(&mut upca, &digits[0..4]);
            upca.push_str("00000");
            upca.push(char::from(digits[4]));
        }
        _ => {
            push(&mut upca, &digits[0..5]);
            upca.push_str("0000");
            upca.push(char::from(digits[5]));
        }
    }
    upca.push(char::from(bytes[7]));
    upca
}

/// Tries the UPC/EAN variants over one row, sharing the start guard
/// position across them.
pub struct MultiFormatUpcEanReader;

impl OneDReader for MultiFormatUpcEanReader {
    fn decode_row(
        &self,
        row_number: usize,
        row: &BitArray,
        hints: &DecodeHints,
    ) -> Result<Symbol> {
        let start_guard = find_start_guard(row)?;
        let mut best_error = Error::NotFound;

        let attempts: [(bool, fn(usize, &BitArray, (usize, usize)) -> Result<Symbol>); 3] = [
            (
                hints.allows(BarcodeFormat::Ean13) || hints.allows(BarcodeFormat::UpcA),
                decode_row_variant::<Ean13Reader>,
            ),
            (hints.allows(BarcodeFormat::Ean8), decode_row_variant::<Ean8Reader>),
            (hints.allows(BarcodeFormat::UpcE), decode_row_variant::<UpcEReader>),
        ];
        for (enabled, attempt) in attempts {
            if !enabled {
                continue;
            }
            match attempt(row_number, row, start_guard) {
                Ok(symbol) => {
                    // A 12-digit UPC-A reads as an EAN-13 with leading zero.
                    if symbol.format() == BarcodeFormat::Ean13 && hints.allows(BarcodeFormat::UpcA)
                    {
                        if let Some(text) = symbol.text().and_then(|t| t.strip_prefix('0')) {
                            let upca =
                                Symbol::new(text, symbol.points().to_vec(), BarcodeFormat::UpcA);
                            return Ok(upca);
                        }
                    }
                    return Ok(symbol);
                }
                Err(Error::NotFound) => {}
                Err(error) => best_error = error,
            }
        }
        Err(best_error)
    }
}

fn append_runs(row: &mut BitArray, mut pos: usize, pattern: &[usize], mut dark: bool) -> usize {
    for &len in pattern {
        for _ in 0..len {
            if dark {
                row.set(pos);
            }
            pos += 1;
        }
        dark = !dark;
    }
    pos
}

/// Render 13 digits as an EAN-13 row at one pixel per module with quiet
/// zones, for tests and demos.
pub fn synthesize_row(digits: &str) -> Result<BitArray> {
    if digits.len() != 13 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidArgument("EAN-13 needs exactly 13 digits"));
    }
    let bytes = digits.as_bytes();
    let first = (bytes[0] - b'0') as usize;
    let mut row = BitArray::new(9 + 3 + 6 * 7 + 5 + 6 * 7 + 3 + 9);
    let mut pos = 9; // leading quiet zone
    pos = append_runs(&mut row, pos, &START_END_PATTERN, true);
    for (i, &b) in bytes[1..7].iter().enumerate() {
        let digit = (b - b'0') as usize;
        let g = (FIRST_DIGIT_ENCODINGS[first] >> (5 - i)) & 1 == 1;
        let pattern = if g {
            L_AND_G_PATTERNS[digit + 10]
        } else {
            L_PATTERNS[digit]
        };
        pos = append_runs(&mut row, pos, &pattern, false);
    }
    pos = append_runs(&mut row, pos, &MIDDLE_PATTERN, false);
    for &b in &bytes[7..13] {
        // Right-half digits are the R patterns: the same run lengths as L,
        // starting with a bar.
        let digit = (b - b'0') as usize;
        pos = append_runs(&mut row, pos, &L_PATTERNS[digit], true);
    }
    append_runs(&mut row, pos, &START_END_PATTERN, true);
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthesize_ean13(digits: &str) -> BitArray {
        synthesize_row(digits).unwrap()
    }

    #[test]
    fn checksum_accepts_valid_ean13() {
        assert!(checksum_ok("4006381333931"));
        assert!(checksum_ok("9780201379624"));
        assert!(!checksum_ok("4006381333932"));
    }

    #[test]
    fn upce_expansion() {
        // Known compressed/expanded pair.
        assert_eq!(convert_upce_to_upca("04252614"), "042100005264");
        // Last-digit 3 and 4 shapes.
        assert_eq!(convert_upce_to_upca("01234531"), "012300000451");
        assert_eq!(convert_upce_to_upca("01234541"), "012340000051");
    }

    #[test]
    fn decodes_synthesized_ean13_row() {
        let row = synthesize_ean13("4006381333931");
        let symbol = MultiFormatUpcEanReader
            .decode_row(0, &row, &DecodeHints::new())
            .unwrap();
        assert_eq!(symbol.format(), BarcodeFormat::Ean13);
        assert_eq!(symbol.text(), Some("4006381333931"));
        assert_eq!(symbol.points().len(), 2);
    }

    #[test]
    fn upca_retagged_from_ean13() {
        let row = synthesize_ean13("0012345678905");
        let symbol = MultiFormatUpcEanReader
            .decode_row(0, &row, &DecodeHints::new())
            .unwrap();
        assert_eq!(symbol.format(), BarcodeFormat::UpcA);
        assert_eq!(symbol.text(), Some("012345678905"));
    }

    #[test]
    fn bad_checksum_is_reported() {
        let row = synthesize_ean13("4006381333932");
        assert_eq!(
            MultiFormatUpcEanReader
                .decode_row(0, &row, &DecodeHints::new())
                .unwrap_err(),
            Error::Checksum
        );
    }

    #[test]
    fn blank_row_is_not_found() {
        let row = BitArray::new(200);
        assert_eq!(
            MultiFormatUpcEanReader
                .decode_row(0, &row, &DecodeHints::new())
                .unwrap_err(),
            Error::NotFound
        );
    }
}
