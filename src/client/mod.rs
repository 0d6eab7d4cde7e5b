//! Decoded-text post-parsers
//!
//! A chain of recognizers over the decoded string: contact cards, geo
//! URIs, phone numbers, email, SMS, calendar events, bookmarks and bare
//! URLs, with plain text as the terminal fallback. Each parser either
//! returns a typed result or declines.

mod calendar;
mod docomo;
mod email;
mod geo;
mod sms;
mod tel;
mod uri;
mod vcard;

use crate::symbol::Symbol;

pub use calendar::CalendarEvent;
pub use email::Email;
pub use geo::Geo;
pub use sms::Sms;
pub use tel::Tel;
pub use uri::Uri;

/// A structured contact card, produced by the MECARD, BIZCARD, AU and
/// vCard parsers alike.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressBook {
    pub names: Vec<String>,
    pub pronunciation: Option<String>,
    pub phone_numbers: Vec<String>,
    pub emails: Vec<String>,
    pub note: Option<String>,
    pub addresses: Vec<String>,
    pub org: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub birthday: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResult {
    AddressBook(AddressBook),
    Calendar(CalendarEvent),
    Email(Email),
    Geo(Geo),
    Sms(Sms),
    Tel(Tel),
    Uri(Uri),
    Text(String),
}

impl ParsedResult {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::AddressBook(_) => "ADDRESSBOOK",
            Self::Calendar(_) => "CALENDAR",
            Self::Email(_) => "EMAIL_ADDRESS",
            Self::Geo(_) => "GEO",
            Self::Sms(_) => "SMS",
            Self::Tel(_) => "TEL",
            Self::Uri(_) => "URI",
            Self::Text(_) => "TEXT",
        }
    }
}

/// Run the recognizer chain over a decoded symbol.
pub fn parse(symbol: &Symbol) -> ParsedResult {
    let text = symbol.text().unwrap_or_default();
    parse_text(text)
}

/// Run the recognizer chain over raw decoded text.
pub fn parse_text(text: &str) -> ParsedResult {
    let parsers: [fn(&str) -> Option<ParsedResult>; 11] = [
        docomo::parse_bookmark,
        docomo::parse_mecard,
        docomo::parse_address_book_au,
        docomo::parse_bizcard,
        vcard::parse,
        calendar::parse,
        geo::parse,
        tel::parse,
        email::parse,
        sms::parse,
        uri::parse,
    ];
    for parser in parsers {
        if let Some(result) = parser(text) {
            return result;
        }
    }
    ParsedResult::Text(text.to_string())
}

/// Every occurrence of `prefix` up to an unescaped `end_char`; `\` escapes
/// the delimiter.
pub(crate) fn match_prefixed_field(
    prefix: &str,
    raw: &str,
    end_char: char,
    trim: bool,
) -> Option<Vec<String>> {
    let mut matches = Vec::new();
    let mut i = 0usize;
    while let Some(found) = raw[i..].find(prefix) {
        let start = i + found + prefix.len();
        let mut end = start;
        let bytes = raw.as_bytes();
        loop {
            match raw[end..].find(end_char) {
                None => {
                    end = raw.len();
                    break;
                }
                Some(offset) => {
                    end += offset;
                    // An odd number of preceding backslashes escapes it.
                    let mut backslashes = 0;
                    while end > backslashes && bytes[end - backslashes - 1] == b'\\' {
                        backslashes += 1;
                    }
                    if backslashes % 2 == 1 {
                        end += 1;
                        continue;
                    }
                    break;
                }
            }
        }
        let mut element = unescape_backslash(&raw[start..end]);
        if trim {
            element = element.trim().to_string();
        }
        if !element.is_empty() {
            matches.push(element);
        }
        i = (end + 1).min(raw.len());
    }
    (!matches.is_empty()).then_some(matches)
}

pub(crate) fn match_single_prefixed_field(
    prefix: &str,
    raw: &str,
    end_char: char,
    trim: bool,
) -> Option<String> {
    match_prefixed_field(prefix, raw, end_char, trim).map(|mut v| v.swap_remove(0))
}

fn unescape_backslash(escaped: &str) -> String {
    let mut result = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                result.push(next);
            }
        } else {
            result.push(c);
        }
    }
    result
}
