//! Data masking
//!
//! The eight reversible XOR maps applied to the data region, plus the
//! four-rule penalty score the encoder minimizes when picking one.

use crate::common::ByteMatrix;
use crate::{Error, Result};

/// Whether the mask flips the module at (x, y).
pub fn mask_bit(mask_pattern: u8, x: usize, y: usize) -> Result<bool> {
    let x = x as u32;
    let y = y as u32;
    let intermediate = match mask_pattern {
        0 => (y + x) % 2,
        1 => y % 2,
        2 => x % 3,
        3 => (y + x) % 3,
        4 => (y / 2 + x / 3) % 2,
        5 => (y * x) % 2 + (y * x) % 3,
        6 => ((y * x) % 2 + (y * x) % 3) % 2,
        7 => ((y + x) % 2 + (y * x) % 3) % 2,
        _ => return Err(Error::InvalidArgument("mask pattern out of range")),
    };
    Ok(intermediate == 0)
}

const N1: u32 = 3;
const N2: u32 = 3;
const N3: u32 = 40;
const N4: u32 = 10;

/// Total penalty for a fully built matrix (values 0/1 only).
pub fn penalty_score(matrix: &ByteMatrix) -> u32 {
    rule1(matrix) + rule2(matrix) + rule3(matrix) + rule4(matrix)
}

/// Runs of 5+ same-colored modules in a row or column: 3 + (length - 5).
fn rule1(matrix: &ByteMatrix) -> u32 {
    rule1_one_direction(matrix, true) + rule1_one_direction(matrix, false)
}

fn rule1_one_direction(matrix: &ByteMatrix, horizontal: bool) -> u32 {
    let (outer, inner) = if horizontal {
        (matrix.height(), matrix.width())
    } else {
        (matrix.width(), matrix.height())
    };
    let mut penalty = 0u32;
    for i in 0..outer {
        let mut run = 0u32;
        let mut previous = -1i8;
        for j in 0..inner {
            let value = if horizontal {
                matrix.get(j, i)
            } else {
                matrix.get(i, j)
            };
            if value == previous {
                run += 1;
                if run == 5 {
                    penalty += N1;
                } else if run > 5 {
                    penalty += 1;
                }
            } else {
                run = 1;
                previous = value;
            }
        }
    }
    penalty
}

/// Every 2x2 block of one color costs 3; overlapping blocks all count.
fn rule2(matrix: &ByteMatrix) -> u32 {
    let mut penalty = 0u32;
    for y in 0..matrix.height() - 1 {
        for x in 0..matrix.width() - 1 {
            let value = matrix.get(x, y);
            if value == matrix.get(x + 1, y)
                && value == matrix.get(x, y + 1)
                && value == matrix.get(x + 1, y + 1)
            {
                penalty += N2;
            }
        }
    }
    penalty
}

/// Finder-like 1:1:3:1:1 run with 4 light modules on either side, in either
/// orientation: 40 points each.
fn rule3(matrix: &ByteMatrix) -> u32 {
    let width = matrix.width();
    let height = matrix.height();
    let mut penalty = 0u32;
    let at = |x: usize, y: usize| matrix.get(x, y) == 1;

    for y in 0..height {
        for x in 0..width {
            if x + 6 < width
                && at(x, y)
                && !at(x + 1, y)
                && at(x + 2, y)
                && at(x + 3, y)
                && at(x + 4, y)
                && !at(x + 5, y)
                && at(x + 6, y)
            {
                let light_after = x + 10 < width
                    && !at(x + 7, y)
                    && !at(x + 8, y)
                    && !at(x + 9, y)
                    && !at(x + 10, y);
                let light_before = x >= 4
                    && !at(x - 1, y)
                    && !at(x - 2, y)
                    && !at(x - 3, y)
                    && !at(x - 4, y);
                if light_after || light_before {
                    penalty += N3;
                }
            }
            if y + 6 < height
                && at(x, y)
                && !at(x, y + 1)
                && at(x, y + 2)
                && at(x, y + 3)
                && at(x, y + 4)
                && !at(x, y + 5)
                && at(x, y + 6)
            {
                let light_after = y + 10 < height
                    && !at(x, y + 7)
                    && !at(x, y + 8)
                    && !at(x, y + 9)
                    && !at(x, y + 10);
                let light_before = y >= 4
                    && !at(x, y - 1)
                    && !at(x, y - 2)
                    && !at(x, y - 3)
                    && !at(x, y - 4);
                if light_after || light_before {
                    penalty += N3;
                }
            }
        }
    }
    penalty
}

/// Deviation of the dark-module ratio from 50%, in 5% steps, truncated
/// toward zero.
fn rule4(matrix: &ByteMatrix) -> u32 {
    let mut dark = 0i64;
    let total = (matrix.width() * matrix.height()) as i64;
    for y in 0..matrix.height() {
        for x in 0..matrix.width() {
            if matrix.get(x, y) == 1 {
                dark += 1;
            }
        }
    }
    let deviation = (100 * dark - 50 * total) / total;
    deviation.unsigned_abs() as u32 / 5 * N4
}
