//! Bit-stream parsing of corrected QR data codewords
//!
//! Reads 4-bit mode indicators and decodes the mixed-mode segments back
//! into text. Trailing bits after the terminator are deliberately ignored:
//! real-world symbols violate the strict all-zero rule often enough that
//! enforcing it loses good reads.

use crate::common::BitSource;
use crate::hints::DecodeHints;
use crate::qr::eci;
use crate::qr::mode::Mode;
use crate::{Error, Result};

const ALPHANUMERIC_CHARS: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Output of the bit-stream parser.
#[derive(Debug, Clone)]
pub struct DecodedStream {
    pub text: String,
    /// Charset name the byte segments resolved to, if any were present.
    pub charset: Option<String>,
    /// A GS1/AIM FNC1 marker was present.
    pub fnc1: bool,
}

pub fn decode(bytes: &[u8], version: u32, hints: &DecodeHints) -> Result<DecodedStream> {
    let mut bits = BitSource::new(bytes);
    let mut result = String::new();
    let mut current_charset: Option<String> = None;
    let mut seen_charset: Option<String> = None;
    let mut fnc1 = false;

    loop {
        // A stream may legally end without an explicit terminator.
        let mode = if bits.available() < 4 {
            Mode::Terminator
        } else {
            Mode::from_bits(bits.read_bits(4)?)?
        };
        match mode {
            Mode::Terminator => break,
            Mode::Fnc1First | Mode::Fnc1Second => {
                // The flag holds for the remainder of the symbol.
                fnc1 = true;
            }
            Mode::StructuredAppend => {
                if bits.available() < 16 {
                    return Err(Error::Format("truncated structured append header"));
                }
                // Sequence/parity header; this symbol's own payload follows.
                bits.read_bits(16)?;
            }
            Mode::Eci => {
                let value = parse_eci_value(&mut bits)?;
                match eci::charset_name(value) {
                    Some(name) => current_charset = Some(name.to_string()),
                    None => return Err(Error::Format("unknown ECI designator")),
                }
            }
            Mode::Numeric | Mode::Alphanumeric | Mode::Byte | Mode::Kanji => {
                let count = bits.read_bits(mode.character_count_bits(version))? as usize;
                match mode {
                    Mode::Numeric => decode_numeric(&mut bits, &mut result, count)?,
                    Mode::Alphanumeric => {
                        decode_alphanumeric(&mut bits, &mut result, count, fnc1)?
                    }
                    Mode::Byte => {
                        let charset = decode_byte_segment(
                            &mut bits,
                            &mut result,
                            count,
                            current_charset.as_deref(),
                            hints,
                        )?;
                        seen_charset = Some(charset);
                    }
                    Mode::Kanji => decode_kanji(&mut bits, &mut result, count)?,
                    _ => unreachable!(),
                }
            }
        }
    }

    Ok(DecodedStream {
        text: result,
        charset: seen_charset,
        fnc1,
    })
}

/// ECI designators use a 1, 2 or 3 byte encoding keyed by the top bits.
fn parse_eci_value(bits: &mut BitSource<'_>) -> Result<u32> {
    let first = bits.read_bits(8)?;
    if first & 0x80 == 0 {
        Ok(first & 0x7F)
    } else if first & 0xC0 == 0x80 {
        Ok(((first & 0x3F) << 8) | bits.read_bits(8)?)
    } else if first & 0xE0 == 0xC0 {
        Ok(((first & 0x1F) << 16) | bits.read_bits(16)?)
    } else {
        Err(Error::Format("bad ECI designator first byte"))
    }
}

fn decode_numeric(bits: &mut BitSource<'_>, result: &mut String, mut count: usize) -> Result<()> {
    while count >= 3 {
        let three = bits.read_bits(10)?;
        if three >= 1000 {
            return Err(Error::Format("illegal 3-digit group"));
        }
        result.push(char::from(ALPHANUMERIC_CHARS[(three / 100) as usize]));
        result.push(char::from(ALPHANUMERIC_CHARS[(three / 10 % 10) as usize]));
        result.push(char::from(ALPHANUMERIC_CHARS[(three % 10) as usize]));
        count -= 3;
    }
    if count == 2 {
        let two = bits.read_bits(7)?;
        if two >= 100 {
            return Err(Error::Format("illegal 2-digit group"));
        }
        result.push(char::from(ALPHANUMERIC_CHARS[(two / 10) as usize]));
        result.push(char::from(ALPHANUMERIC_CHARS[(two % 10) as usize]));
    } else if count == 1 {
        let one = bits.read_bits(4)?;
        if one >= 10 {
            return Err(Error::Format("illegal digit"));
        }
        result.push(char::from(ALPHANUMERIC_CHARS[one as usize]));
    }
    Ok(())
}

fn decode_alphanumeric(
    bits: &mut BitSource<'_>,
    result: &mut String,
    mut count: usize,
    fnc1: bool,
) -> Result<()> {
    let start = result.len();
    let push = |result: &mut String, code: u32| -> Result<()> {
        let c = ALPHANUMERIC_CHARS
            .get(code as usize)
            .ok_or(Error::Format("illegal alphanumeric code"))?;
        result.push(char::from(*c));
        Ok(())
    };
    while count > 1 {
        let pair = bits.read_bits(11)?;
        push(result, pair / 45)?;
        push(result, pair % 45)?;
        count -= 2;
    }
    if count == 1 {
        let single = bits.read_bits(6)?;
        push(result, single)?;
    }
    if fnc1 {
        // In a GS1 symbol "%" marks a group separator and "%%" a literal
        // percent.
        let tail: String = result.split_off(start);
        let mut rewritten = String::with_capacity(tail.len());
        let mut chars = tail.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '%' {
                if chars.peek() == Some(&'%') {
                    chars.next();
                    rewritten.push('%');
                } else {
                    rewritten.push('\u{1D}');
                }
            } else {
                rewritten.push(c);
            }
        }
        result.push_str(&rewritten);
    }
    Ok(())
}

fn decode_byte_segment(
    bits: &mut BitSource<'_>,
    result: &mut String,
    count: usize,
    current_charset: Option<&str>,
    hints: &DecodeHints,
) -> Result<String> {
    if count * 8 > bits.available() {
        return Err(Error::Format("byte segment count too large"));
    }
    let mut bytes = Vec::with_capacity(count);
    for _ in 0..count {
        bytes.push(bits.read_bits(8)? as u8);
    }
    // ECI wins; then an explicit caller hint; otherwise guess.
    let charset = match current_charset {
        Some(name) => name.to_string(),
        None => match &hints.character_set {
            Some(name) => name.clone(),
            None => guess_encoding(&bytes).to_string(),
        },
    };
    result.push_str(&eci::decode_bytes(&bytes, &charset)?);
    Ok(charset)
}

fn decode_kanji(bits: &mut BitSource<'_>, result: &mut String, count: usize) -> Result<()> {
    let mut buffer = Vec::with_capacity(2 * count);
    for _ in 0..count {
        let thirteen = bits.read_bits(13)?;
        let mut assembled = ((thirteen / 0xC0) << 8) | (thirteen % 0xC0);
        assembled += if assembled < 0x1F00 { 0x8140 } else { 0xC140 };
        buffer.push((assembled >> 8) as u8);
        buffer.push(assembled as u8);
    }
    result.push_str(&eci::decode_bytes(&buffer, "Shift_JIS")?);
    Ok(())
}

/// Distinguish ISO-8859-1, UTF-8 and Shift_JIS without an ECI designator.
///
/// A UTF-8 BOM wins outright. Otherwise bytes in 0x80..=0x9F rule out
/// ISO-8859-1; if each such byte starts a plausible Shift_JIS double-byte
/// pair, guess Shift_JIS, else fall back to UTF-8.
pub fn guess_encoding(bytes: &[u8]) -> &'static str {
    if bytes.len() > 3 && bytes[0] == 0xEF && bytes[1] == 0xBB && bytes[2] == 0xBF {
        return "UTF-8";
    }
    let mut can_be_latin1 = true;
    let mut last_was_possible_double_byte_start = false;
    for i in 0..bytes.len() {
        let value = bytes[i];
        if (0x80..=0x9F).contains(&value) && i < bytes.len() - 1 {
            can_be_latin1 = false;
            if last_was_possible_double_byte_start {
                // This byte was the trail of the pair just checked.
                last_was_possible_double_byte_start = false;
            } else {
                last_was_possible_double_byte_start = true;
                let next = bytes[i + 1];
                if value & 1 == 0 {
                    // Even lead bytes take trail bytes in 0x9F..=0xFC.
                    if !(0x9F..=0xFC).contains(&next) {
                        return "UTF-8";
                    }
                } else if !(0x40..=0x9E).contains(&next) {
                    return "UTF-8";
                }
            }
        }
    }
    if can_be_latin1 {
        "ISO-8859-1"
    } else {
        "Shift_JIS"
    }
}
