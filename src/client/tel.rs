//! tel: URI and bare E.164 numbers

use crate::client::ParsedResult;

#[derive(Debug, Clone, PartialEq)]
pub struct Tel {
    pub number: String,
    /// The canonical tel: form.
    pub uri: String,
}

pub(crate) fn parse(raw: &str) -> Option<ParsedResult> {
    if let Some(rest) = raw
        .strip_prefix("tel:")
        .or_else(|| raw.strip_prefix("TEL:"))
    {
        let number = rest.split('?').next().unwrap_or(rest);
        if number.is_empty() {
            return None;
        }
        return Some(ParsedResult::Tel(Tel {
            number: number.to_string(),
            uri: format!("tel:{rest}"),
        }));
    }

    // A bare international number: plus sign then 7..=15 digits.
    if let Some(digits) = raw.strip_prefix('+') {
        if (7..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()) {
            return Some(ParsedResult::Tel(Tel {
                number: raw.to_string(),
                uri: format!("tel:{raw}"),
            }));
        }
    }
    None
}
