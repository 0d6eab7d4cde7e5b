//! Matrix assembly for the QR encoder
//!
//! Builds the module matrix from coded bits: function patterns first, then
//! format/version info, then the data bits in the two-column zig-zag with
//! the chosen mask applied. Cells keep the "unset" sentinel until written,
//! which is what stops data placement from touching function patterns.

use crate::common::{BitVector, ByteMatrix};
use crate::qr::format_info::{calculate_bch_code, encode_format_info, ErrorCorrectionLevel,
    VERSION_GENERATOR};
use crate::qr::mask::mask_bit;
use crate::qr::version::Version;
use crate::{Error, Result};

#[rustfmt::skip]
const POSITION_DETECTION_PATTERN: [[i8; 7]; 7] = [
    [1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 1, 1, 0, 1],
    [1, 0, 1, 1, 1, 0, 1],
    [1, 0, 1, 1, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 1, 1, 1],
];

#[rustfmt::skip]
const POSITION_ADJUSTMENT_PATTERN: [[i8; 5]; 5] = [
    [1, 1, 1, 1, 1],
    [1, 0, 0, 0, 1],
    [1, 0, 1, 0, 1],
    [1, 0, 0, 0, 1],
    [1, 1, 1, 1, 1],
];

/// Format info cell coordinates around the top-left finder, LSB first.
pub(crate) const TYPE_INFO_COORDINATES: [(usize, usize); 15] = [
    (8, 0),
    (8, 1),
    (8, 2),
    (8, 3),
    (8, 4),
    (8, 5),
    (8, 7),
    (8, 8),
    (7, 8),
    (5, 8),
    (4, 8),
    (3, 8),
    (2, 8),
    (1, 8),
    (0, 8),
];

/// Build the complete matrix. `mask_pattern` -1 leaves data unmasked
/// (useful in tests only; real symbols always carry a mask).
pub fn build_matrix(
    data_bits: &BitVector,
    level: ErrorCorrectionLevel,
    version: &Version,
    mask_pattern: i8,
    matrix: &mut ByteMatrix,
) -> Result<()> {
    matrix.clear(-1);
    embed_basic_patterns(version, matrix);
    embed_type_info(level, mask_pattern, matrix)?;
    maybe_embed_version_info(version, matrix);
    embed_data_bits(data_bits, mask_pattern, matrix)?;
    Ok(())
}

/// Finders, separators, the dark module, alignment patterns and timing.
pub fn embed_basic_patterns(version: &Version, matrix: &mut ByteMatrix) {
    embed_position_detection_patterns_and_separators(matrix);
    embed_dark_dot(matrix);
    maybe_embed_position_adjustment_patterns(version, matrix);
    embed_timing_patterns(matrix);
}

fn embed_position_detection_patterns_and_separators(matrix: &mut ByteMatrix) {
    let width = matrix.width();
    let pdp_width = POSITION_DETECTION_PATTERN[0].len();
    embed_position_detection_pattern(0, 0, matrix);
    embed_position_detection_pattern(width - pdp_width, 0, matrix);
    embed_position_detection_pattern(0, width - pdp_width, matrix);

    // Horizontal separators (8 wide) under/over the finders.
    for x in 0..8 {
        matrix.set(x, 7, 0);
        matrix.set(width - 1 - x, 7, 0);
        matrix.set(x, width - 8, 0);
    }
    // Vertical separators (7 tall) beside the finders.
    for y in 0..7 {
        matrix.set(7, y, 0);
        matrix.set(width - 8, y, 0);
        matrix.set(7, width - 7 + y, 0);
    }
}

fn embed_position_detection_pattern(x_start: usize, y_start: usize, matrix: &mut ByteMatrix) {
    for (y, row) in POSITION_DETECTION_PATTERN.iter().enumerate() {
        for (x, &cell) in row.iter().enumerate() {
            matrix.set(x_start + x, y_start + y, cell);
        }
    }
}

fn embed_dark_dot(matrix: &mut ByteMatrix) {
    let height = matrix.height();
    matrix.set(8, height - 8, 1);
}

fn maybe_embed_position_adjustment_patterns(version: &Version, matrix: &mut ByteMatrix) {
    if version.number() < 2 {
        return;
    }
    let centers = version.alignment_centers();
    for &y in centers {
        for &x in centers {
            // A center already claimed by a finder is skipped.
            if matrix.is_empty_at(x, y) {
                for (dy, row) in POSITION_ADJUSTMENT_PATTERN.iter().enumerate() {
                    for (dx, &cell) in row.iter().enumerate() {
                        matrix.set(x - 2 + dx, y - 2 + dy, cell);
                    }
                }
            }
        }
    }
}

fn embed_timing_patterns(matrix: &mut ByteMatrix) {
    let width = matrix.width();
    for i in 8..width - 8 {
        let bit = ((i + 1) % 2) as i8;
        if matrix.is_empty_at(i, 6) {
            matrix.set(i, 6, bit);
        }
        if matrix.is_empty_at(6, i) {
            matrix.set(6, i, bit);
        }
    }
}

/// The 15-bit format word, embedded twice: around the top-left finder and
/// split between the top-right and bottom-left finders.
pub fn embed_type_info(
    level: ErrorCorrectionLevel,
    mask_pattern: i8,
    matrix: &mut ByteMatrix,
) -> Result<()> {
    if !(-1..=7).contains(&mask_pattern) {
        return Err(Error::InvalidArgument("mask pattern out of range"));
    }
    let type_info = encode_format_info(level, mask_pattern.max(0) as u8);
    let width = matrix.width();
    for (i, &(x1, y1)) in TYPE_INFO_COORDINATES.iter().enumerate() {
        // Bit 0 of the word goes to the first coordinate.
        let bit = ((type_info >> i) & 1) as i8;
        matrix.set(x1, y1, bit);
        if i < 8 {
            matrix.set(width - 1 - i, 8, bit);
        } else {
            matrix.set(8, width - 15 + i, bit);
        }
    }
    Ok(())
}

/// 18-bit version info in two 6x3 blocks, versions 7 and up.
pub fn maybe_embed_version_info(version: &Version, matrix: &mut ByteMatrix) {
    if version.number() < 7 {
        return;
    }
    let number = version.number();
    let version_info = (number << 12) | calculate_bch_code(number, VERSION_GENERATOR);
    let height = matrix.height();
    for i in 0..6 {
        for j in 0..3 {
            let bit = ((version_info >> (i * 3 + j)) & 1) as i8;
            // Bottom-left block, then its transpose at top-right.
            matrix.set(i, height - 11 + j, bit);
            matrix.set(height - 11 + j, i, bit);
        }
    }
}

/// Zig-zag data placement: start at the bottom-right, consume two-module
/// columns right to left, skipping the vertical timing column, alternating
/// upward and downward. Only unset cells receive bits; leftover remainder
/// cells are zero-filled. The mask is applied per cell as bits land.
pub fn embed_data_bits(
    data_bits: &BitVector,
    mask_pattern: i8,
    matrix: &mut ByteMatrix,
) -> Result<()> {
    let width = matrix.width() as i32;
    let height = matrix.height() as i32;
    let mut bit_index = 0usize;
    let mut direction: i32 = -1;
    let mut x = width - 1;
    let mut y = height - 1;
    while x > 0 {
        if x == 6 {
            x -= 1;
        }
        while y >= 0 && y < height {
            for i in 0..2 {
                let xx = (x - i) as usize;
                let yy = y as usize;
                if !matrix.is_empty_at(xx, yy) {
                    continue;
                }
                let mut bit = if bit_index < data_bits.len() {
                    let b = data_bits.at(bit_index) as i8;
                    bit_index += 1;
                    b
                } else {
                    0
                };
                if mask_pattern != -1 && mask_bit(mask_pattern as u8, xx, yy)? {
                    bit ^= 1;
                }
                matrix.set(xx, yy, bit);
            }
            y += direction;
        }
        direction = -direction;
        y += direction;
        x -= 2;
    }
    if bit_index != data_bits.len() {
        return Err(Error::Writer(format!(
            "placed {bit_index} of {} data bits",
            data_bits.len()
        )));
    }
    Ok(())
}
