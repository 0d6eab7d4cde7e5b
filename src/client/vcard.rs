//! vCard contact parsing
//!
//! Handles CRLF unfolding, `;TYPE=...` parameters, quoted-printable
//! values, and the structured N field reordering
//! ("Family;Given;Middle;Prefix;Suffix" presented as readable order).

use crate::client::{AddressBook, ParsedResult};

pub(crate) fn parse(raw: &str) -> Option<ParsedResult> {
    if !raw.starts_with("BEGIN:VCARD") {
        return None;
    }
    let unfolded = unfold(raw);

    let names = match field_values(&unfolded, "FN") {
        values if !values.is_empty() => values,
        _ => field_values(&unfolded, "N")
            .into_iter()
            .map(|n| format_structured_name(&n))
            .collect(),
    };
    if names.is_empty() {
        return None;
    }

    Some(ParsedResult::AddressBook(AddressBook {
        names,
        pronunciation: None,
        phone_numbers: field_values(&unfolded, "TEL"),
        emails: field_values(&unfolded, "EMAIL"),
        note: field_values(&unfolded, "NOTE").into_iter().next(),
        addresses: field_values(&unfolded, "ADR"),
        org: field_values(&unfolded, "ORG").into_iter().next(),
        title: field_values(&unfolded, "TITLE").into_iter().next(),
        url: field_values(&unfolded, "URL").into_iter().next(),
        birthday: field_values(&unfolded, "BDAY").into_iter().next(),
    }))
}

/// Join continuation lines (leading space or tab) with their parent.
fn unfold(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for line in raw.split("\r\n").flat_map(|l| l.split('\n')) {
        if let Some(rest) = line.strip_prefix(' ').or_else(|| line.strip_prefix('\t')) {
            out.push_str(rest);
        } else {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(line);
        }
    }
    out
}

/// All values for `name`, honoring parameters after `;` and decoding
/// quoted-printable when declared.
fn field_values(unfolded: &str, name: &str) -> Vec<String> {
    let mut values = Vec::new();
    for line in unfolded.lines() {
        let Some(rest) = line.strip_prefix(name) else {
            continue;
        };
        // The field name must be followed by params or the value separator.
        let (params, value) = match rest.split_once(':') {
            Some((params, value)) if params.is_empty() || params.starts_with(';') => {
                (params, value)
            }
            _ => continue,
        };
        let quoted_printable = params.to_ascii_uppercase().contains("QUOTED-PRINTABLE");
        let value = if quoted_printable {
            decode_quoted_printable(value)
        } else {
            value.to_string()
        };
        let value = unescape(&value);
        if !value.is_empty() {
            values.push(value);
        }
    }
    values
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') | Some('N') => out.push('\n'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Soft line breaks and =XX escapes; anything malformed passes through.
fn decode_quoted_printable(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'=' && i + 2 < bytes.len() + 1 {
            let hex = bytes.get(i + 1..i + 3).and_then(|pair| {
                let s = std::str::from_utf8(pair).ok()?;
                u8::from_str_radix(s, 16).ok()
            });
            if let Some(byte) = hex {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// "Owen;Sean" (Family;Given;Middle;Prefix;Suffix) reads as "Sean Owen".
fn format_structured_name(value: &str) -> String {
    let components: Vec<&str> = value.split(';').collect();
    let order = [3usize, 1, 2, 0, 4];
    let mut out = String::new();
    for index in order {
        if let Some(part) = components.get(index) {
            let part = part.trim();
            if !part.is_empty() {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(part);
            }
        }
    }
    out
}
