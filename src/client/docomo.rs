//! DoCoMo-style prefixed formats: MEBKM bookmarks, MECARD contacts, the
//! Japanese AU address book layout, and BIZCARD.

use crate::client::{
    match_prefixed_field, match_single_prefixed_field, AddressBook, ParsedResult, Uri,
};

pub(crate) fn parse_bookmark(raw: &str) -> Option<ParsedResult> {
    if !raw.starts_with("MEBKM:") {
        return None;
    }
    let title = match_single_prefixed_field("TITLE:", raw, ';', true);
    let uri = match_single_prefixed_field("URL:", raw, ';', true)?;
    Some(ParsedResult::Uri(Uri { uri, title }))
}

pub(crate) fn parse_mecard(raw: &str) -> Option<ParsedResult> {
    if !raw.starts_with("MECARD:") {
        return None;
    }
    let raw_name = match_single_prefixed_field("N:", raw, ';', true)?;
    let name = raw_name.replace(',', " ");

    let mut birthday = match_single_prefixed_field("BDAY:", raw, ';', true);
    if birthday
        .as_deref()
        .is_some_and(|b| b.len() != 8 || !b.bytes().all(|c| c.is_ascii_digit()))
    {
        birthday = None;
    }

    Some(ParsedResult::AddressBook(AddressBook {
        names: vec![name],
        pronunciation: match_single_prefixed_field("SOUND:", raw, ';', true),
        phone_numbers: match_prefixed_field("TEL:", raw, ';', true).unwrap_or_default(),
        emails: match_prefixed_field("EMAIL:", raw, ';', true).unwrap_or_default(),
        note: match_single_prefixed_field("NOTE:", raw, ';', false),
        addresses: match_prefixed_field("ADR:", raw, ';', true).unwrap_or_default(),
        org: match_single_prefixed_field("ORG:", raw, ';', true),
        title: None,
        url: match_single_prefixed_field("URL:", raw, ';', true),
        birthday,
    }))
}

/// The KDDI AU handset format: NAME1/NAME2 lines, numbered TEL/MAIL
/// fields, a MEMORY note.
pub(crate) fn parse_address_book_au(raw: &str) -> Option<ParsedResult> {
    // MEMORY is the signature field of this format.
    if !raw.contains("MEMORY") || !raw.contains("\r\n") {
        return None;
    }
    let name = match_single_prefixed_field("NAME1:", raw, '\r', true)?;

    let numbered = |prefix: &str, max: usize| -> Vec<String> {
        (1..=max)
            .filter_map(|i| match_single_prefixed_field(&format!("{prefix}{i}:"), raw, '\r', true))
            .collect()
    };

    Some(ParsedResult::AddressBook(AddressBook {
        names: vec![name],
        pronunciation: match_single_prefixed_field("NAME2:", raw, '\r', true),
        phone_numbers: numbered("TEL", 3),
        emails: numbered("MAIL", 3),
        note: match_single_prefixed_field("MEMORY:", raw, '\r', false),
        addresses: match_single_prefixed_field("ADD:", raw, '\r', true)
            .map(|a| vec![a])
            .unwrap_or_default(),
        ..Default::default()
    }))
}

pub(crate) fn parse_bizcard(raw: &str) -> Option<ParsedResult> {
    if !raw.starts_with("BIZCARD:") {
        return None;
    }
    let first_name = match_single_prefixed_field("N:", raw, ';', true);
    let last_name = match_single_prefixed_field("X:", raw, ';', true);
    let full_name = match (first_name, last_name) {
        (None, None) => return None,
        (Some(f), None) => f,
        (None, Some(l)) => l,
        (Some(f), Some(l)) => format!("{f} {l}"),
    };

    let mut phone_numbers = Vec::new();
    for prefix in ["B:", "M:", "F:"] {
        if let Some(number) = match_single_prefixed_field(prefix, raw, ';', true) {
            phone_numbers.push(number);
        }
    }

    Some(ParsedResult::AddressBook(AddressBook {
        names: vec![full_name],
        phone_numbers,
        emails: match_single_prefixed_field("E:", raw, ';', true)
            .map(|e| vec![e])
            .unwrap_or_default(),
        addresses: match_prefixed_field("A:", raw, ';', true).unwrap_or_default(),
        org: match_single_prefixed_field("C:", raw, ';', true),
        title: match_single_prefixed_field("T:", raw, ';', true),
        ..Default::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address_book(result: Option<ParsedResult>) -> AddressBook {
        match result.unwrap() {
            ParsedResult::AddressBook(a) => a,
            other => panic!("expected address book, got {}", other.type_name()),
        }
    }

    #[test]
    fn minimal_mecard() {
        let result = address_book(parse_mecard("MECARD:N:Sean Owen;;"));
        assert_eq!(result.names, ["Sean Owen"]);
        assert!(result.phone_numbers.is_empty());
        assert!(result.emails.is_empty());
        assert_eq!(result.note, None);
        assert_eq!(result.org, None);
        assert_eq!(result.url, None);
        assert_eq!(result.birthday, None);
    }

    #[test]
    fn mecard_with_fields() {
        let result = address_book(parse_mecard(
            "MECARD:NOTE:Widgets Inc;N:Sean Owen;URL:google.com;EMAIL:srowen@example.org;;",
        ));
        assert_eq!(result.names, ["Sean Owen"]);
        assert_eq!(result.emails, ["srowen@example.org"]);
        assert_eq!(result.url.as_deref(), Some("google.com"));
        assert_eq!(result.note.as_deref(), Some("Widgets Inc"));
    }

    #[test]
    fn mecard_multiple_addresses_and_note() {
        let result = address_book(parse_mecard(
            "MECARD:N:Foo Bar;ORG:Company;TEL:5555555555;EMAIL:foo.bar@xyz.com;ADR:City, 10001;\
             ADR:City, 10001;NOTE:This is the memo.;;",
        ));
        assert_eq!(result.names, ["Foo Bar"]);
        assert_eq!(result.addresses, ["City, 10001", "City, 10001"]);
        assert_eq!(result.phone_numbers, ["5555555555"]);
        assert_eq!(result.org.as_deref(), Some("Company"));
        assert_eq!(result.note.as_deref(), Some("This is the memo."));
    }

    #[test]
    fn mecard_rejects_malformed_birthday() {
        let result = address_book(parse_mecard("MECARD:N:J Random;BDAY:20080808;;"));
        assert_eq!(result.birthday.as_deref(), Some("20080808"));
        let result = address_book(parse_mecard("MECARD:N:J Random;BDAY:next week;;"));
        assert_eq!(result.birthday, None);
    }

    #[test]
    fn au_address_book() {
        let result = address_book(parse_address_book_au(
            "MEMORY:foo\r\nNAME1:Sean\r\nTEL1:+12125551212\r\n",
        ));
        assert_eq!(result.names, ["Sean"]);
        assert_eq!(result.phone_numbers, ["+12125551212"]);
        assert_eq!(result.note.as_deref(), Some("foo"));
        assert!(result.emails.is_empty());
    }

    #[test]
    fn bizcard() {
        let result = address_book(parse_bizcard(
            "BIZCARD:N:Sean;X:Owen;C:Google;A:123 Main St;M:+12125551212;E:srowen@example.org;",
        ));
        assert_eq!(result.names, ["Sean Owen"]);
        assert_eq!(result.addresses, ["123 Main St"]);
        assert_eq!(result.emails, ["srowen@example.org"]);
        assert_eq!(result.phone_numbers, ["+12125551212"]);
        assert_eq!(result.org.as_deref(), Some("Google"));
        assert_eq!(result.title, None);
    }

    #[test]
    fn bookmark() {
        let result = parse_bookmark("MEBKM:TITLE:Example;URL:http\\://example.com;;").unwrap();
        match result {
            ParsedResult::Uri(uri) => {
                assert_eq!(uri.uri, "http://example.com");
                assert_eq!(uri.title.as_deref(), Some("Example"));
            }
            other => panic!("expected URI, got {}", other.type_name()),
        }
    }

    #[test]
    fn non_matching_prefixes_decline() {
        assert!(parse_mecard("BIZCARD:N:x;").is_none());
        assert!(parse_bizcard("MECARD:N:x;;").is_none());
        assert!(parse_bookmark("http://example.com").is_none());
        assert!(parse_address_book_au("NAME1:Sean\r\n").is_none());
    }
}
