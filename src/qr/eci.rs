//! Extended Channel Interpretation character sets
//!
//! Maps ECI designator values to character encodings. Decoding goes
//! through `encoding_rs`, except ISO-8859-1 which is decoded directly
//! (the first 256 code points), since the web-oriented tables alias it
//! to windows-1252.

use encoding_rs::Encoding;

use crate::{Error, Result};

/// Charset name for an ECI value, if assigned.
pub fn charset_name(value: u32) -> Option<&'static str> {
    Some(match value {
        0 | 2 => "IBM437",
        1 | 3 => "ISO-8859-1",
        4 => "ISO-8859-2",
        5 => "ISO-8859-3",
        6 => "ISO-8859-4",
        7 => "ISO-8859-5",
        8 => "ISO-8859-6",
        9 => "ISO-8859-7",
        10 => "ISO-8859-8",
        11 => "ISO-8859-9",
        12 => "ISO-8859-10",
        13 => "ISO-8859-11",
        15 => "ISO-8859-13",
        16 => "ISO-8859-14",
        17 => "ISO-8859-15",
        18 => "ISO-8859-16",
        20 => "Shift_JIS",
        21 => "windows-1250",
        22 => "windows-1251",
        23 => "windows-1252",
        24 => "windows-1256",
        25 => "UTF-16BE",
        26 => "UTF-8",
        27 | 170 => "US-ASCII",
        28 => "Big5",
        29 => "GB2312",
        30 => "EUC-KR",
        _ => return None,
    })
}

/// Decode `bytes` according to `charset` (an ECI charset name or anything
/// `encoding_rs` recognizes as a label).
pub fn decode_bytes(bytes: &[u8], charset: &str) -> Result<String> {
    if charset.eq_ignore_ascii_case("ISO-8859-1") {
        return Ok(bytes.iter().map(|&b| char::from(b)).collect());
    }
    if charset.eq_ignore_ascii_case("US-ASCII") {
        if bytes.iter().any(|&b| b >= 0x80) {
            return Err(Error::Format("non-ASCII byte in ASCII segment"));
        }
        return Ok(bytes.iter().map(|&b| char::from(b)).collect());
    }
    let encoding = Encoding::for_label(charset.as_bytes())
        .ok_or_else(|| Error::Unsupported(charset.to_string()))?;
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(Error::Format("undecodable bytes for character set"));
    }
    Ok(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_eci_values() {
        assert_eq!(charset_name(3), Some("ISO-8859-1"));
        assert_eq!(charset_name(20), Some("Shift_JIS"));
        assert_eq!(charset_name(26), Some("UTF-8"));
        assert_eq!(charset_name(25), Some("UTF-16BE"));
        assert_eq!(charset_name(30), Some("EUC-KR"));
        assert_eq!(charset_name(14), None);
        assert_eq!(charset_name(900), None);
    }

    #[test]
    fn latin1_decodes_every_byte() {
        let text = decode_bytes(&[0x41, 0xE9, 0xFF], "ISO-8859-1").unwrap();
        assert_eq!(text, "A\u{E9}\u{FF}");
    }

    #[test]
    fn utf8_and_shift_jis_decode() {
        assert_eq!(decode_bytes("héllo".as_bytes(), "UTF-8").unwrap(), "héllo");
        let (sjis, _, _) = encoding_rs::SHIFT_JIS.encode("日本");
        assert_eq!(decode_bytes(&sjis, "Shift_JIS").unwrap(), "日本");
    }

    #[test]
    fn unknown_charset_is_unsupported() {
        assert!(matches!(
            decode_bytes(b"x", "KLINGON-8"),
            Err(Error::Unsupported(_))
        ));
    }
}
