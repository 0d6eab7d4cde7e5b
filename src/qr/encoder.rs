//! QR encoder
//!
//! String in, fully populated [`QrCode`] out: mode selection, segment
//! encoding, version fitting, terminator and padding, Reed-Solomon block
//! interleaving, and mask selection by penalty score.

use std::fmt;

use crate::common::{reedsolomon, BitVector, ByteMatrix};
use crate::hints::DecodeHints;
use crate::qr::format_info::ErrorCorrectionLevel;
use crate::qr::mask::penalty_score;
use crate::qr::matrix_builder;
use crate::qr::mode::Mode;
use crate::qr::version::Version;
use crate::{Error, Result};

/// A QR code under construction; fully populated once `encode` returns.
pub struct QrCode {
    pub mode: Mode,
    pub ec_level: ErrorCorrectionLevel,
    pub version: u32,
    pub matrix_width: usize,
    pub mask_pattern: i8,
    pub num_total_bytes: usize,
    pub num_data_bytes: usize,
    pub num_ec_bytes: usize,
    pub num_rs_blocks: usize,
    pub matrix: ByteMatrix,
}

impl QrCode {
    /// Render to the plain dark/light grid.
    pub fn to_bit_matrix(&self) -> crate::common::BitMatrix {
        self.matrix.to_bit_matrix()
    }
}

impl fmt::Display for QrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<<")?;
        writeln!(f, " mode: {}", self.mode.name())?;
        writeln!(f, " ecLevel: {}", self.ec_level.name())?;
        writeln!(f, " version: {}", self.version)?;
        writeln!(f, " matrixWidth: {}", self.matrix_width)?;
        writeln!(f, " maskPattern: {}", self.mask_pattern)?;
        writeln!(f, " numTotalBytes: {}", self.num_total_bytes)?;
        writeln!(f, " numDataBytes: {}", self.num_data_bytes)?;
        writeln!(f, " numECBytes: {}", self.num_ec_bytes)?;
        writeln!(f, " numRSBlocks: {}", self.num_rs_blocks)?;
        writeln!(f, " matrix:")?;
        write!(f, "{}", self.matrix)?;
        writeln!(f, ">>")
    }
}

/// Code for a character in the 45-symbol alphanumeric set, or -1.
pub fn get_alphanumeric_code(c: char) -> i8 {
    match c {
        '0'..='9' => c as i8 - b'0' as i8,
        'A'..='Z' => c as i8 - b'A' as i8 + 10,
        ' ' => 36,
        '$' => 37,
        '%' => 38,
        '*' => 39,
        '+' => 40,
        '-' => 41,
        '.' => 42,
        '/' => 43,
        ':' => 44,
        _ => -1,
    }
}

/// Pick the tightest mode that covers every character. Kanji is never
/// chosen here: Shift_JIS cannot be told apart from other encodings by
/// looking at the data, so callers must ask for it explicitly.
pub fn choose_mode(content: &str) -> Mode {
    let mut has_numeric = false;
    let mut has_alphanumeric = false;
    for c in content.chars() {
        if c.is_ascii_digit() {
            has_numeric = true;
        } else if get_alphanumeric_code(c) != -1 {
            has_alphanumeric = true;
        } else {
            return Mode::Byte;
        }
    }
    if has_alphanumeric {
        Mode::Alphanumeric
    } else if has_numeric {
        Mode::Numeric
    } else {
        Mode::Byte
    }
}

pub fn append_mode_info(mode: Mode, bits: &mut BitVector) {
    bits.append_bits(mode.bits(), 4);
}

pub fn append_length_info(
    num_letters: usize,
    version: u32,
    mode: Mode,
    bits: &mut BitVector,
) -> Result<()> {
    let count_bits = mode.character_count_bits(version);
    if num_letters >= (1 << count_bits) {
        return Err(Error::Writer(format!(
            "{num_letters} is longer than the {count_bits}-bit count field"
        )));
    }
    bits.append_bits(num_letters as u32, count_bits);
    Ok(())
}

pub fn append_bytes(content: &str, mode: Mode, bits: &mut BitVector, utf8: bool) -> Result<()> {
    match mode {
        Mode::Numeric => append_numeric_bytes(content, bits),
        Mode::Alphanumeric => append_alphanumeric_bytes(content, bits),
        Mode::Byte => append_8bit_bytes(&encode_content(content, utf8)?, bits),
        Mode::Kanji => append_kanji_bytes(content, bits),
        _ => Err(Error::Writer(format!("invalid mode {}", mode.name()))),
    }
}

pub fn append_numeric_bytes(content: &str, bits: &mut BitVector) -> Result<()> {
    let digits = content.as_bytes();
    let mut i = 0;
    while i < digits.len() {
        let d = |k: usize| -> Result<u32> {
            let b = digits[k];
            if !(b'0'..=b'9').contains(&b) {
                return Err(Error::Writer("non-digit in numeric mode".into()));
            }
            Ok(u32::from(b - b'0'))
        };
        if i + 2 < digits.len() {
            bits.append_bits(d(i)? * 100 + d(i + 1)? * 10 + d(i + 2)?, 10);
            i += 3;
        } else if i + 1 < digits.len() {
            bits.append_bits(d(i)? * 10 + d(i + 1)?, 7);
            i += 2;
        } else {
            bits.append_bits(d(i)?, 4);
            i += 1;
        }
    }
    Ok(())
}

pub fn append_alphanumeric_bytes(content: &str, bits: &mut BitVector) -> Result<()> {
    let mut chars = content.chars();
    loop {
        let Some(first) = chars.next() else { break };
        let code1 = get_alphanumeric_code(first);
        if code1 == -1 {
            return Err(Error::Writer(format!("'{first}' is not alphanumeric")));
        }
        match chars.next() {
            Some(second) => {
                let code2 = get_alphanumeric_code(second);
                if code2 == -1 {
                    return Err(Error::Writer(format!("'{second}' is not alphanumeric")));
                }
                bits.append_bits(code1 as u32 * 45 + code2 as u32, 11);
            }
            None => {
                bits.append_bits(code1 as u32, 6);
                break;
            }
        }
    }
    Ok(())
}

fn encode_content(content: &str, utf8: bool) -> Result<Vec<u8>> {
    if utf8 {
        return Ok(content.as_bytes().to_vec());
    }
    // Default wire charset is ISO-8859-1, which is exactly the first 256
    // Unicode code points.
    content
        .chars()
        .map(|c| {
            u8::try_from(c as u32)
                .map_err(|_| Error::Writer(format!("'{c}' not representable in ISO-8859-1")))
        })
        .collect()
}

pub fn append_8bit_bytes(bytes: &[u8], bits: &mut BitVector) -> Result<()> {
    for &b in bytes {
        bits.append_bits(u32::from(b), 8);
    }
    Ok(())
}

pub fn append_kanji_bytes(content: &str, bits: &mut BitVector) -> Result<()> {
    let (encoded, _, unmappable) = encoding_rs::SHIFT_JIS.encode(content);
    if unmappable || encoded.len() % 2 != 0 {
        return Err(Error::Writer("content is not Shift_JIS double-byte".into()));
    }
    for pair in encoded.chunks_exact(2) {
        let code = (u32::from(pair[0]) << 8) | u32::from(pair[1]);
        let subtracted = if (0x8140..=0x9FFC).contains(&code) {
            code - 0x8140
        } else if (0xE040..=0xEBBF).contains(&code) {
            code - 0xC140
        } else {
            return Err(Error::Writer(format!("invalid Shift_JIS pair {code:#x}")));
        };
        bits.append_bits((subtracted >> 8) * 0xC0 + (subtracted & 0xFF), 13);
    }
    Ok(())
}

/// The number of "letters" the count field declares for `content` in `mode`.
fn num_letters(content: &str, mode: Mode, utf8: bool) -> Result<usize> {
    Ok(match mode {
        Mode::Byte => encode_content(content, utf8)?.len(),
        Mode::Kanji => {
            let (encoded, _, _) = encoding_rs::SHIFT_JIS.encode(content);
            encoded.len() / 2
        }
        _ => content.chars().count(),
    })
}

/// Smallest version whose data capacity at `level` holds the header plus
/// payload, rounded up to whole bytes.
fn choose_version(
    payload_bits: usize,
    letters: usize,
    mode: Mode,
    level: ErrorCorrectionLevel,
) -> Result<&'static Version> {
    for number in 1..=40u32 {
        let version = Version::by_number(number)?;
        let count_bits = mode.character_count_bits(number);
        if letters >= (1 << count_bits) {
            continue;
        }
        let total_bits = 4 + count_bits + payload_bits;
        let needed_bytes = (total_bits + 7) / 8;
        if version.ec_blocks(level).total_data_codewords() >= needed_bytes {
            return Ok(version);
        }
    }
    Err(Error::Writer("data too big for any version".into()))
}

/// Terminator, zero-pad to a byte boundary, then alternate 0xEC / 0x11
/// filler bytes out to capacity.
pub fn terminate_bits(num_data_bytes: usize, bits: &mut BitVector) -> Result<()> {
    let capacity = num_data_bytes * 8;
    if bits.len() > capacity {
        return Err(Error::Writer(format!(
            "data bits cannot fit: {} > {capacity}",
            bits.len()
        )));
    }
    for _ in 0..4 {
        if bits.len() >= capacity {
            break;
        }
        bits.append_bit(0);
    }
    while bits.len() % 8 != 0 {
        bits.append_bit(0);
    }
    let num_padding_bytes = num_data_bytes - bits.size_in_bytes();
    for i in 0..num_padding_bytes {
        bits.append_bits(if i % 2 == 0 { 0xEC } else { 0x11 }, 8);
    }
    if bits.len() != capacity {
        return Err(Error::Writer("padding did not reach capacity".into()));
    }
    Ok(())
}

/// Data/EC byte counts for one block. Blocks are as even as possible: the
/// first `total % blocks` from the end get one extra data byte.
pub fn block_shape(
    num_total_bytes: usize,
    num_data_bytes: usize,
    num_rs_blocks: usize,
    block_id: usize,
) -> Result<(usize, usize)> {
    if block_id >= num_rs_blocks {
        return Err(Error::InvalidArgument("block id out of range"));
    }
    let group2_blocks = num_total_bytes % num_rs_blocks;
    let group1_blocks = num_rs_blocks - group2_blocks;
    let group1_total = num_total_bytes / num_rs_blocks;
    let group2_total = group1_total + 1;
    let group1_data = num_data_bytes / num_rs_blocks;
    let group2_data = group1_data + 1;
    let group1_ec = group1_total - group1_data;
    let group2_ec = group2_total - group2_data;
    // Every block carries the same EC byte count.
    if group1_ec != group2_ec {
        return Err(Error::Writer("uneven EC byte split".into()));
    }
    if num_total_bytes != group1_blocks * group1_total + group2_blocks * group2_total {
        return Err(Error::Writer("total bytes do not split into blocks".into()));
    }
    Ok(if block_id < group1_blocks {
        (group1_data, group1_ec)
    } else {
        (group2_data, group2_ec)
    })
}

/// Split data codewords into RS blocks, compute EC bytes per block, and
/// emit all data columns interleaved, then all EC columns. Blocks with
/// fewer data bytes simply drop out of later columns.
pub fn interleave_with_ec_bytes(
    bits: &BitVector,
    num_total_bytes: usize,
    num_data_bytes: usize,
    num_rs_blocks: usize,
) -> Result<BitVector> {
    if bits.size_in_bytes() != num_data_bytes {
        return Err(Error::Writer("bit length does not match data byte count".into()));
    }

    let all_data = bits.as_bytes();
    let mut blocks: Vec<(Vec<u8>, Vec<u8>)> = Vec::with_capacity(num_rs_blocks);
    let mut data_offset = 0usize;
    let mut max_data = 0usize;
    let mut max_ec = 0usize;
    for block_id in 0..num_rs_blocks {
        let (data_len, ec_len) = block_shape(num_total_bytes, num_data_bytes, num_rs_blocks, block_id)?;
        let data = all_data[data_offset..data_offset + data_len].to_vec();
        let ec = reedsolomon::encode(&data, ec_len);
        data_offset += data_len;
        max_data = max_data.max(data_len);
        max_ec = max_ec.max(ec_len);
        blocks.push((data, ec));
    }
    if data_offset != num_data_bytes {
        return Err(Error::Writer("data bytes left over after split".into()));
    }

    let mut result = BitVector::new();
    for column in 0..max_data {
        for (data, _) in &blocks {
            if let Some(&byte) = data.get(column) {
                result.append_bits(u32::from(byte), 8);
            }
        }
    }
    for column in 0..max_ec {
        for (_, ec) in &blocks {
            if let Some(&byte) = ec.get(column) {
                result.append_bits(u32::from(byte), 8);
            }
        }
    }
    if result.size_in_bytes() != num_total_bytes {
        return Err(Error::Writer(format!(
            "interleaving error: {} != {num_total_bytes}",
            result.size_in_bytes()
        )));
    }
    Ok(result)
}

fn choose_mask_pattern(
    bits: &BitVector,
    level: ErrorCorrectionLevel,
    version: &Version,
    matrix: &mut ByteMatrix,
) -> Result<i8> {
    let mut min_penalty = u32::MAX;
    let mut best_pattern = -1i8;
    for pattern in 0..8i8 {
        matrix_builder::build_matrix(bits, level, version, pattern, matrix)?;
        let penalty = penalty_score(matrix);
        if penalty < min_penalty {
            min_penalty = penalty;
            best_pattern = pattern;
        }
    }
    Ok(best_pattern)
}

/// Encode `content` at `level`. Hints may force UTF-8 for byte segments.
pub fn encode(content: &str, level: ErrorCorrectionLevel, hints: &DecodeHints) -> Result<QrCode> {
    encode_in_mode(content, level, choose_mode(content), hints)
}

/// Encode with an explicit mode; this is the only path that produces KANJI
/// segments.
pub fn encode_in_mode(
    content: &str,
    level: ErrorCorrectionLevel,
    mode: Mode,
    hints: &DecodeHints,
) -> Result<QrCode> {
    let utf8 = hints
        .character_set
        .as_deref()
        .is_some_and(|cs| cs.eq_ignore_ascii_case("UTF-8"));

    let mut data_bits = BitVector::new();
    append_bytes(content, mode, &mut data_bits, utf8)?;
    let letters = num_letters(content, mode, utf8)?;

    let version = choose_version(data_bits.len(), letters, mode, level)?;
    let ec_blocks = version.ec_blocks(level);
    let num_data_bytes = ec_blocks.total_data_codewords();
    let num_total_bytes = version.total_codewords();
    let num_rs_blocks = ec_blocks.num_blocks();

    let mut header_and_data = BitVector::new();
    append_mode_info(mode, &mut header_and_data);
    append_length_info(letters, version.number(), mode, &mut header_and_data)?;
    header_and_data.append(&data_bits);
    terminate_bits(num_data_bytes, &mut header_and_data)?;

    let final_bits =
        interleave_with_ec_bytes(&header_and_data, num_total_bytes, num_data_bytes, num_rs_blocks)?;

    let dimension = version.dimension();
    let mut matrix = ByteMatrix::new(dimension, dimension);
    let mask_pattern = choose_mask_pattern(&final_bits, level, version, &mut matrix)?;
    matrix_builder::build_matrix(&final_bits, level, version, mask_pattern, &mut matrix)?;

    Ok(QrCode {
        mode,
        ec_level: level,
        version: version.number(),
        matrix_width: dimension,
        mask_pattern,
        num_total_bytes,
        num_data_bytes,
        num_ec_bytes: num_total_bytes - num_data_bytes,
        num_rs_blocks,
        matrix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphanumeric_codes() {
        for i in 0..10 {
            assert_eq!(get_alphanumeric_code((b'0' + i) as char), i as i8);
        }
        for i in 10..36 {
            assert_eq!(get_alphanumeric_code((b'A' + i - 10) as char), i as i8);
        }
        assert_eq!(get_alphanumeric_code(' '), 36);
        assert_eq!(get_alphanumeric_code('$'), 37);
        assert_eq!(get_alphanumeric_code('%'), 38);
        assert_eq!(get_alphanumeric_code('*'), 39);
        assert_eq!(get_alphanumeric_code('+'), 40);
        assert_eq!(get_alphanumeric_code('-'), 41);
        assert_eq!(get_alphanumeric_code('.'), 42);
        assert_eq!(get_alphanumeric_code('/'), 43);
        assert_eq!(get_alphanumeric_code(':'), 44);
        assert_eq!(get_alphanumeric_code('a'), -1);
        assert_eq!(get_alphanumeric_code('#'), -1);
        assert_eq!(get_alphanumeric_code('\0'), -1);
    }

    #[test]
    fn mode_selection() {
        assert_eq!(choose_mode("0"), Mode::Numeric);
        assert_eq!(choose_mode("0123456789"), Mode::Numeric);
        assert_eq!(choose_mode("A"), Mode::Alphanumeric);
        assert_eq!(
            choose_mode("0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:"),
            Mode::Alphanumeric
        );
        assert_eq!(choose_mode("a"), Mode::Byte);
        assert_eq!(choose_mode("#"), Mode::Byte);
        assert_eq!(choose_mode(""), Mode::Byte);
        // Shift_JIS-flavored text still chooses BYTE: Kanji mode is never
        // inferred from a generic string.
        assert_eq!(choose_mode("\u{65E5}\u{672C}"), Mode::Byte);
    }

    #[test]
    fn mode_and_length_headers() {
        let mut bits = BitVector::new();
        append_mode_info(Mode::Numeric, &mut bits);
        assert_eq!(bits.to_string(), "0001");

        let mut bits = BitVector::new();
        append_length_info(1, 1, Mode::Numeric, &mut bits).unwrap();
        assert_eq!(bits.to_string(), "0000000001");

        let mut bits = BitVector::new();
        append_length_info(2, 10, Mode::Alphanumeric, &mut bits).unwrap();
        assert_eq!(bits.to_string(), "00000000010");

        let mut bits = BitVector::new();
        append_length_info(255, 27, Mode::Byte, &mut bits).unwrap();
        assert_eq!(bits.to_string(), "0000000011111111");

        let mut bits = BitVector::new();
        append_length_info(512, 40, Mode::Kanji, &mut bits).unwrap();
        assert_eq!(bits.to_string(), "001000000000");
    }

    #[test]
    fn numeric_segments() {
        let mut bits = BitVector::new();
        append_numeric_bytes("1", &mut bits).unwrap();
        assert_eq!(bits.to_string(), "0001");

        let mut bits = BitVector::new();
        append_numeric_bytes("12", &mut bits).unwrap();
        assert_eq!(bits.to_string(), "0001100");

        let mut bits = BitVector::new();
        append_numeric_bytes("123", &mut bits).unwrap();
        assert_eq!(bits.to_string(), "0001111011");

        let mut bits = BitVector::new();
        append_numeric_bytes("1234", &mut bits).unwrap();
        assert_eq!(bits.to_string(), "00011110110100");

        let mut bits = BitVector::new();
        append_numeric_bytes("", &mut bits).unwrap();
        assert_eq!(bits.to_string(), "");
    }

    #[test]
    fn alphanumeric_segments() {
        let mut bits = BitVector::new();
        append_alphanumeric_bytes("A", &mut bits).unwrap();
        assert_eq!(bits.to_string(), "001010");

        let mut bits = BitVector::new();
        append_alphanumeric_bytes("AB", &mut bits).unwrap();
        assert_eq!(bits.to_string(), "00111001101");

        let mut bits = BitVector::new();
        append_alphanumeric_bytes("ABC", &mut bits).unwrap();
        assert_eq!(bits.to_string(), "00111001101001100");

        let mut bits = BitVector::new();
        append_alphanumeric_bytes("", &mut bits).unwrap();
        assert_eq!(bits.to_string(), "");

        let mut bits = BitVector::new();
        assert!(append_alphanumeric_bytes("abc", &mut bits).is_err());
    }

    #[test]
    fn byte_segments() {
        let mut bits = BitVector::new();
        append_8bit_bytes(b"abc", &mut bits).unwrap();
        assert_eq!(bits.to_string(), "011000010110001001100011");

        let mut bits = BitVector::new();
        append_8bit_bytes(b"", &mut bits).unwrap();
        assert_eq!(bits.to_string(), "");
    }

    #[test]
    fn kanji_segments() {
        // JIS X 0510 worked example pairs 0x935F and 0xE4AA.
        let sjis = |bytes: &[u8]| encoding_rs::SHIFT_JIS.decode(bytes).0.into_owned();
        let mut bits = BitVector::new();
        append_kanji_bytes(&sjis(&[0x93, 0x5F]), &mut bits).unwrap();
        assert_eq!(bits.to_string(), "0110110011111");
        append_kanji_bytes(&sjis(&[0xE4, 0xAA]), &mut bits).unwrap();
        assert_eq!(bits.to_string(), "01101100111111101010101010");
    }

    #[test]
    fn terminator_and_padding() {
        let mut v = BitVector::new();
        terminate_bits(0, &mut v).unwrap();
        assert_eq!(v.to_string(), "");

        let mut v = BitVector::new();
        terminate_bits(1, &mut v).unwrap();
        assert_eq!(v.to_string(), "00000000");

        let mut v = BitVector::new();
        v.append_bits(0, 3);
        terminate_bits(1, &mut v).unwrap();
        assert_eq!(v.to_string(), "00000000");

        let mut v = BitVector::new();
        v.append_bits(0, 5);
        terminate_bits(1, &mut v).unwrap();
        assert_eq!(v.to_string(), "00000000");

        let mut v = BitVector::new();
        v.append_bits(0, 8);
        terminate_bits(1, &mut v).unwrap();
        assert_eq!(v.to_string(), "00000000");

        let mut v = BitVector::new();
        terminate_bits(2, &mut v).unwrap();
        assert_eq!(v.to_string(), "0000000011101100");

        let mut v = BitVector::new();
        v.append_bits(0, 1);
        terminate_bits(3, &mut v).unwrap();
        assert_eq!(v.to_string(), "000000001110110000010001");
    }

    #[test]
    fn block_shapes() {
        // Version 1-H.
        assert_eq!(block_shape(26, 9, 1, 0).unwrap(), (9, 17));
        // Version 3-H: two equal blocks.
        assert_eq!(block_shape(70, 26, 2, 0).unwrap(), (13, 22));
        assert_eq!(block_shape(70, 26, 2, 1).unwrap(), (13, 22));
        // Version 7-H: 4 + 1 blocks.
        assert_eq!(block_shape(196, 66, 5, 0).unwrap(), (13, 26));
        assert_eq!(block_shape(196, 66, 5, 4).unwrap(), (14, 26));
        // Version 40-H: 20 + 61 blocks.
        assert_eq!(block_shape(3706, 1276, 81, 0).unwrap(), (15, 30));
        assert_eq!(block_shape(3706, 1276, 81, 20).unwrap(), (16, 30));
        assert_eq!(block_shape(3706, 1276, 81, 80).unwrap(), (16, 30));
    }

    #[test]
    fn interleave_single_block() {
        let data = [32u8, 65, 205, 69, 41, 220, 46, 128, 236];
        let mut bits = BitVector::new();
        for &b in &data {
            bits.append_bits(u32::from(b), 8);
        }
        let out = interleave_with_ec_bytes(&bits, 26, 9, 1).unwrap();
        let expected: [u8; 26] = [
            32, 65, 205, 69, 41, 220, 46, 128, 236, //
            42, 159, 74, 221, 244, 169, 239, 150, 138, 70, 237, 85, 224, 96, 74, 219, 61,
        ];
        assert_eq!(out.size_in_bytes(), expected.len());
        assert_eq!(&out.as_bytes()[..26], &expected);
    }

    #[test]
    fn interleave_four_blocks() {
        let data: [u8; 62] = [
            67, 70, 22, 38, 54, 70, 86, 102, 118, 134, 150, 166, 182, 198, 214, 230, 247, 7, 23,
            39, 55, 71, 87, 103, 119, 135, 151, 166, 22, 38, 54, 70, 86, 102, 118, 134, 150, 166,
            182, 198, 214, 230, 247, 7, 23, 39, 55, 71, 87, 103, 119, 135, 151, 160, 236, 17, 236,
            17, 236, 17, 236, 17,
        ];
        let mut bits = BitVector::new();
        for &b in &data {
            bits.append_bits(u32::from(b), 8);
        }
        let out = interleave_with_ec_bytes(&bits, 134, 62, 4).unwrap();
        let expected: [u8; 134] = [
            67, 230, 54, 55, 70, 247, 70, 71, 22, 7, 86, 87, 38, 23, 102, 103, 54, 39, 118, 119,
            70, 55, 134, 135, 86, 71, 150, 151, 102, 87, 166, 160, 118, 103, 182, 236, 134, 119,
            198, 17, 150, 135, 214, 236, 166, 151, 230, 17, 182, 166, 247, 236, 198, 22, 7, 17,
            214, 38, 23, 236, 39, 17, //
            175, 155, 245, 236, 80, 146, 56, 74, 155, 165, 133, 142, 64, 183, 132, 13, 178, 54,
            132, 108, 45, 113, 53, 50, 214, 98, 193, 152, 233, 147, 50, 71, 65, 190, 82, 51, 209,
            199, 171, 54, 12, 112, 57, 113, 155, 117, 211, 164, 117, 30, 158, 225, 31, 190, 242,
            38, 140, 61, 179, 154, 214, 138, 147, 87, 27, 96, 77, 47, 187, 49, 156, 214,
        ];
        assert_eq!(out.size_in_bytes(), expected.len());
        assert_eq!(&out.as_bytes()[..134], &expected);
    }

    #[test]
    fn encode_fixture_abcdef_h() {
        let qr = encode("ABCDEF", ErrorCorrectionLevel::H, &DecodeHints::new()).unwrap();
        let expected = "\
<<
 mode: ALPHANUMERIC
 ecLevel: H
 version: 1
 matrixWidth: 21
 maskPattern: 0
 numTotalBytes: 26
 numDataBytes: 9
 numECBytes: 17
 numRSBlocks: 1
 matrix:
 1 1 1 1 1 1 1 0 1 1 1 1 0 0 1 1 1 1 1 1 1
 1 0 0 0 0 0 1 0 0 1 1 1 0 0 1 0 0 0 0 0 1
 1 0 1 1 1 0 1 0 0 1 0 1 1 0 1 0 1 1 1 0 1
 1 0 1 1 1 0 1 0 1 1 1 0 1 0 1 0 1 1 1 0 1
 1 0 1 1 1 0 1 0 0 1 1 1 0 0 1 0 1 1 1 0 1
 1 0 0 0 0 0 1 0 0 1 0 0 0 0 1 0 0 0 0 0 1
 1 1 1 1 1 1 1 0 1 0 1 0 1 0 1 1 1 1 1 1 1
 0 0 0 0 0 0 0 0 0 0 1 0 1 0 0 0 0 0 0 0 0
 0 0 1 0 1 1 1 0 1 1 0 0 1 1 0 0 0 1 0 0 1
 1 0 1 1 1 0 0 1 0 0 0 1 0 1 0 0 0 0 0 0 0
 0 0 1 1 0 0 1 0 1 0 0 0 1 0 1 0 1 0 1 1 0
 1 1 0 1 0 1 0 1 1 1 0 1 0 1 0 0 0 0 0 1 0
 0 0 1 1 0 1 1 1 1 0 0 0 1 0 1 0 1 1 1 1 0
 0 0 0 0 0 0 0 0 1 0 0 1 1 1 0 1 0 1 0 0 0
 1 1 1 1 1 1 1 0 0 0 1 0 1 0 1 1 0 0 0 0 1
 1 0 0 0 0 0 1 0 1 1 1 1 0 1 0 1 1 1 1 0 1
 1 0 1 1 1 0 1 0 1 0 1 1 0 1 0 1 0 0 0 0 1
 1 0 1 1 1 0 1 0 0 1 1 0 1 1 1 1 0 1 0 1 0
 1 0 1 1 1 0 1 0 1 0 0 0 1 0 1 0 1 1 1 0 1
 1 0 0 0 0 0 1 0 0 1 1 0 1 1 0 1 0 0 0 1 1
 1 1 1 1 1 1 1 0 0 0 0 0 0 0 0 0 1 0 1 0 1
>>
";
        assert_eq!(qr.to_string(), expected);
    }

    #[test]
    fn encoder_handles_3518_digit_regression() {
        // Regression for the size_in_bytes truncation bug: 3518 digits are
        // 11727 payload bits, which must round up to 1466 bytes during
        // version fitting.
        let content = "0".repeat(3518);
        let qr = encode(&content, ErrorCorrectionLevel::L, &DecodeHints::new()).unwrap();
        assert_eq!(qr.mode, Mode::Numeric);
        assert!(qr.version >= 27);
    }

    #[test]
    fn oversized_content_is_a_writer_error() {
        let content = "0".repeat(8000);
        assert!(matches!(
            encode(&content, ErrorCorrectionLevel::H, &DecodeHints::new()),
            Err(Error::Writer(_))
        ));
    }
}
