//! QR matrix decoder
//!
//! Takes a sampled module grid and recovers the payload: format info with
//! BCH correction, version info, de-masking, the codeword zig-zag walk,
//! block de-interleaving, Reed-Solomon correction and finally bit-stream
//! parsing.

use crate::common::{reedsolomon, BitMatrix};
use crate::hints::DecodeHints;
use crate::qr::bitstream::{self, DecodedStream};
use crate::qr::format_info::{ErrorCorrectionLevel, FormatInformation};
use crate::qr::mask::mask_bit;
use crate::qr::matrix_builder::TYPE_INFO_COORDINATES;
use crate::qr::version::Version;
use crate::{Error, Result};

/// Decoded payload plus the structural facts worth reporting.
#[derive(Debug, Clone)]
pub struct DecoderResult {
    pub bytes: Vec<u8>,
    pub text: String,
    pub charset: Option<String>,
    pub fnc1: bool,
    pub version: u32,
    pub ec_level: ErrorCorrectionLevel,
}

/// Decode a grid of modules (dark = set). The matrix must be exactly the
/// symbol, one cell per module.
pub fn decode_matrix(matrix: &BitMatrix, hints: &DecodeHints) -> Result<DecoderResult> {
    let dimension = matrix.width();
    if dimension != matrix.height() {
        return Err(Error::Format("module grid is not square"));
    }
    let version = read_version(matrix)?;
    if version.dimension() != dimension {
        return Err(Error::Format("version does not match dimension"));
    }
    let format = read_format_information(matrix)?;

    let codewords = read_codewords(matrix, version, format.mask_pattern)?;
    let data = correct_and_deinterleave(&codewords, version, format.level)?;
    let DecodedStream {
        text,
        charset,
        fnc1,
    } = bitstream::decode(&data, version.number(), hints)?;

    Ok(DecoderResult {
        bytes: data,
        text,
        charset,
        fnc1,
        version: version.number(),
        ec_level: format.level,
    })
}

/// Read both 15-bit format info copies and BCH-decode them.
pub fn read_format_information(matrix: &BitMatrix) -> Result<FormatInformation> {
    let dimension = matrix.width();
    let mut raw1 = 0u32;
    let mut raw2 = 0u32;
    for (i, &(x, y)) in TYPE_INFO_COORDINATES.iter().enumerate() {
        if matrix.get(x, y) {
            raw1 |= 1 << i;
        }
        let (x2, y2) = if i < 8 {
            (dimension - 1 - i, 8)
        } else {
            (8, dimension - 15 + i)
        };
        if matrix.get(x2, y2) {
            raw2 |= 1 << i;
        }
    }
    FormatInformation::decode(raw1, raw2)
}

/// Version from the 18-bit info blocks when present, else from the
/// dimension.
pub fn read_version(matrix: &BitMatrix) -> Result<&'static Version> {
    let dimension = matrix.width();
    let provisional = Version::for_dimension(dimension)?;
    if provisional.number() < 7 {
        return Ok(provisional);
    }

    let mut top_right = 0u32;
    let mut bottom_left = 0u32;
    for i in 0..6 {
        for j in 0..3 {
            let bit = i * 3 + j;
            if matrix.get(dimension - 11 + j, i) {
                top_right |= 1 << bit;
            }
            if matrix.get(i, dimension - 11 + j) {
                bottom_left |= 1 << bit;
            }
        }
    }
    Ok(Version::decode_version_info(top_right)
        .or_else(|| Version::decode_version_info(bottom_left))
        .unwrap_or(provisional))
}

/// Undo the mask and collect codewords along the placement zig-zag.
pub fn read_codewords(
    matrix: &BitMatrix,
    version: &'static Version,
    mask_pattern: u8,
) -> Result<Vec<u8>> {
    let dimension = matrix.width();
    let function_pattern = version.build_function_pattern();

    let mut codewords = Vec::with_capacity(version.total_codewords());
    let mut current_byte = 0u32;
    let mut bits_read = 0u32;
    let mut reading_up = true;

    let mut x = dimension as i32 - 1;
    while x > 0 {
        if x == 6 {
            // Skip the vertical timing column entirely.
            x -= 1;
        }
        for count in 0..dimension {
            let y = if reading_up {
                dimension - 1 - count
            } else {
                count
            };
            for i in 0..2 {
                let xx = (x - i) as usize;
                if function_pattern.get(xx, y) {
                    continue;
                }
                let mut bit = matrix.get(xx, y);
                if mask_bit(mask_pattern, xx, y)? {
                    bit = !bit;
                }
                current_byte <<= 1;
                if bit {
                    current_byte |= 1;
                }
                bits_read += 1;
                if bits_read == 8 {
                    codewords.push(current_byte as u8);
                    current_byte = 0;
                    bits_read = 0;
                }
            }
        }
        reading_up = !reading_up;
        x -= 2;
    }

    if codewords.len() != version.total_codewords() {
        return Err(Error::Format("wrong number of codewords read"));
    }
    Ok(codewords)
}

/// Split interleaved codewords back into RS blocks, correct each, and
/// concatenate the data bytes in block order.
pub fn correct_and_deinterleave(
    codewords: &[u8],
    version: &'static Version,
    level: ErrorCorrectionLevel,
) -> Result<Vec<u8>> {
    let ec_blocks = version.ec_blocks(level);
    if codewords.len() != version.total_codewords() {
        return Err(Error::Format("codeword count does not match version"));
    }
    let ec_len = ec_blocks.ec_codewords_per_block;

    // Block shapes in order: the table lists shorter groups first.
    let mut shapes: Vec<usize> = Vec::with_capacity(ec_blocks.num_blocks());
    for group in ec_blocks.groups {
        for _ in 0..group.count {
            shapes.push(group.data_codewords);
        }
    }
    let max_data = shapes.iter().copied().max().unwrap_or(0);

    let mut blocks: Vec<Vec<u8>> = shapes
        .iter()
        .map(|&len| Vec::with_capacity(len + ec_len))
        .collect();

    let mut cursor = codewords.iter();
    for column in 0..max_data {
        for (block, &data_len) in blocks.iter_mut().zip(&shapes) {
            if column < data_len {
                block.push(*cursor.next().ok_or(Error::Format("codewords exhausted"))?);
            }
        }
    }
    for _ in 0..ec_len {
        for block in blocks.iter_mut() {
            block.push(*cursor.next().ok_or(Error::Format("codewords exhausted"))?);
        }
    }

    let mut data = Vec::with_capacity(ec_blocks.total_data_codewords());
    for (block, &data_len) in blocks.iter_mut().zip(&shapes) {
        reedsolomon::correct(block, ec_len)?;
        data.extend_from_slice(&block[..data_len]);
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::encoder;

    fn encode_to_matrix(content: &str, level: ErrorCorrectionLevel) -> BitMatrix {
        encoder::encode(content, level, &DecodeHints::new())
            .unwrap()
            .to_bit_matrix()
    }

    #[test]
    fn format_info_round_trips_through_matrix() {
        let matrix = encode_to_matrix("ABCDEF", ErrorCorrectionLevel::H);
        let info = read_format_information(&matrix).unwrap();
        assert_eq!(info.level, ErrorCorrectionLevel::H);
        assert_eq!(info.mask_pattern, 0);
    }

    #[test]
    fn clean_matrix_decodes() {
        let matrix = encode_to_matrix("ABCDEF", ErrorCorrectionLevel::H);
        let result = decode_matrix(&matrix, &DecodeHints::new()).unwrap();
        assert_eq!(result.text, "ABCDEF");
        assert_eq!(result.version, 1);
        assert_eq!(result.ec_level, ErrorCorrectionLevel::H);
    }

    #[test]
    fn decodes_with_module_damage() {
        // Flip a handful of data modules; level H absorbs them.
        let mut matrix = encode_to_matrix("DAMAGE TEST 123", ErrorCorrectionLevel::H);
        for (x, y) in [(10, 12), (11, 15), (15, 10), (12, 18)] {
            matrix.flip(x, y);
        }
        let result = decode_matrix(&matrix, &DecodeHints::new()).unwrap();
        assert_eq!(result.text, "DAMAGE TEST 123");
    }

    #[test]
    fn too_much_damage_is_a_checksum_error() {
        let mut matrix = encode_to_matrix("0123456789", ErrorCorrectionLevel::L);
        // Shred the data region.
        for y in 9..12 {
            for x in 9..21 {
                matrix.flip(x, y);
            }
        }
        assert_eq!(
            decode_matrix(&matrix, &DecodeHints::new()).unwrap_err(),
            Error::Checksum
        );
    }

    #[test]
    fn version7_reports_version_info() {
        // Enough bytes to need version 7 at level L (>= 136 data bytes).
        let content = "A".repeat(200);
        let matrix = encode_to_matrix(&content, ErrorCorrectionLevel::L);
        let version = read_version(&matrix).unwrap();
        assert!(version.number() >= 7);
        let result = decode_matrix(&matrix, &DecodeHints::new()).unwrap();
        assert_eq!(result.text, content);
    }

    #[test]
    fn multi_block_version_round_trips() {
        // Lands on version 4-H: four RS blocks of 9 data bytes each.
        let content = "MULTI BLOCK INTERLEAVING CHECK 0123456789";
        let matrix = encode_to_matrix(content, ErrorCorrectionLevel::H);
        let result = decode_matrix(&matrix, &DecodeHints::new()).unwrap();
        assert_eq!(result.text, content);
    }
}
