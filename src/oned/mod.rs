//! One-dimensional barcode readers
//!
//! Each symbology implements [`OneDReader::decode_row`] over a binarized
//! row; the shared machinery here measures bar-space runs, scores candidate
//! patterns, walks image rows middle-out, and dispatches across the
//! enabled symbologies.

pub mod code128;
pub mod code39;
pub mod upc_ean;

use crate::binarize::{Binarizer, GlobalHistogramBinarizer};
use crate::common::BitArray;
use crate::format::BarcodeFormat;
use crate::hints::DecodeHints;
use crate::luminance::LuminanceSource;
use crate::symbol::{MetadataKey, MetadataValue, Point, Symbol};
use crate::{Error, Result};

pub trait OneDReader {
    /// Attempt to decode one binarized row.
    fn decode_row(&self, row_number: usize, row: &BitArray, hints: &DecodeHints)
        -> Result<Symbol>;
}

/// Record `counters.len()` consecutive runs starting at `start`, first
/// counter matching the color of the pixel at `start`.
pub fn record_pattern(row: &BitArray, start: usize, counters: &mut [usize]) -> Result<()> {
    counters.fill(0);
    let end = row.len();
    if start >= end {
        return Err(Error::NotFound);
    }
    let mut is_white = !row.get(start);
    let mut position = 0usize;
    let mut i = start;
    while i < end {
        if row.get(i) != is_white {
            // Same color as the current run.
            counters[position] += 1;
        } else {
            position += 1;
            if position == counters.len() {
                break;
            }
            counters[position] = 1;
            is_white = !is_white;
        }
        i += 1;
    }
    if !(position == counters.len() || (position == counters.len() - 1 && i == end)) {
        return Err(Error::NotFound);
    }
    Ok(())
}

/// Average, normalized deviation of observed run lengths from an expected
/// pattern. Returns `f32::MAX` when any single run deviates more than
/// `max_individual_variance` (a fraction of the unit width).
pub fn pattern_match_variance(
    counters: &[usize],
    pattern: &[usize],
    max_individual_variance: f32,
) -> f32 {
    let total: usize = counters.iter().sum();
    let pattern_length: usize = pattern.iter().sum();
    if total < pattern_length {
        // Row ended before the pattern could possibly fit.
        return f32::MAX;
    }
    let unit_bar_width = total as f32 / pattern_length as f32;
    let max_individual = max_individual_variance * unit_bar_width;

    let mut total_variance = 0.0f32;
    for (&counter, &expected) in counters.iter().zip(pattern) {
        let variance = (counter as f32 - expected as f32 * unit_bar_width).abs();
        if variance > max_individual {
            return f32::MAX;
        }
        total_variance += variance;
    }
    total_variance / total as f32
}

/// The readers enabled under `hints`, in trial order.
fn build_readers(hints: &DecodeHints) -> Vec<Box<dyn OneDReader>> {
    let mut readers: Vec<Box<dyn OneDReader>> = Vec::new();
    if [
        BarcodeFormat::Ean13,
        BarcodeFormat::UpcA,
        BarcodeFormat::Ean8,
        BarcodeFormat::UpcE,
    ]
    .iter()
    .any(|&f| hints.allows(f))
    {
        readers.push(Box::new(upc_ean::MultiFormatUpcEanReader));
    }
    if hints.allows(BarcodeFormat::Code39) {
        readers.push(Box::new(code39::Code39Reader::new(
            hints.code39_check_digit,
            hints.code39_extended,
        )));
    }
    if hints.allows(BarcodeFormat::Code128) {
        readers.push(Box::new(code128::Code128Reader));
    }
    readers
}

/// Try every enabled reader against image rows, middle-out. Under
/// TRY_HARDER every row is scanned and each row is also tried reversed.
pub fn decode(source: &dyn LuminanceSource, hints: &DecodeHints) -> Result<Symbol> {
    let readers = build_readers(hints);
    if readers.is_empty() {
        return Err(Error::NotFound);
    }

    let width = source.width();
    let height = source.height();
    let binarizer = GlobalHistogramBinarizer::new();

    let try_harder = hints.try_harder;
    let row_step = (height >> (if try_harder { 8 } else { 5 })).max(1);
    let max_lines = if try_harder {
        height
    } else {
        15.min(height)
    };

    let middle = height / 2;
    let mut best_error = Error::NotFound;
    for attempt in 0..max_lines {
        let row_steps_above_or_below = (attempt + 1) / 2;
        let below = attempt & 1 == 0;
        let offset = row_step * row_steps_above_or_below;
        let row_number = if below {
            middle + offset
        } else {
            match middle.checked_sub(offset) {
                Some(n) => n,
                None => break,
            }
        };
        if row_number >= height {
            break;
        }

        let Ok(mut row) = binarizer.black_row(row_number, source) else {
            continue;
        };
        let passes = if try_harder { 2 } else { 1 };
        for pass in 0..passes {
            if pass == 1 {
                row.reverse();
            }
            for reader in &readers {
                match reader.decode_row(row_number, &row, hints) {
                    Ok(mut symbol) => {
                        if pass == 1 {
                            // Mirror points back into unreversed coordinates.
                            let points = symbol
                                .points()
                                .iter()
                                .map(|p| Point::new(width as f32 - p.x - 1.0, p.y))
                                .collect();
                            symbol.set_points(points);
                            symbol.put_metadata(
                                MetadataKey::Orientation,
                                MetadataValue::Int(180),
                            );
                        }
                        return Ok(symbol);
                    }
                    Err(Error::NotFound) => {}
                    Err(error @ (Error::Checksum | Error::Format(_))) => {
                        // Abort this attempt, remember the failure, move on.
                        best_error = error;
                    }
                    Err(error) => return Err(error),
                }
            }
        }
    }
    Err(best_error)
}
