//! vCalendar / iCalendar event parsing (the VEVENT block inside a decoded
//! payload). Date-time values are kept verbatim; interpreting them is the
//! caller's concern.

use crate::client::ParsedResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarEvent {
    pub summary: Option<String>,
    pub start: String,
    pub end: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

pub(crate) fn parse(raw: &str) -> Option<ParsedResult> {
    let begin = raw.find("BEGIN:VEVENT")?;
    let body = &raw[begin..];

    let start = field(body, "DTSTART")?;
    Some(ParsedResult::Calendar(CalendarEvent {
        summary: field(body, "SUMMARY"),
        start,
        end: field(body, "DTEND"),
        location: field(body, "LOCATION"),
        description: field(body, "DESCRIPTION"),
    }))
}

fn field(body: &str, name: &str) -> Option<String> {
    for line in body.lines() {
        let Some(rest) = line.strip_prefix(name) else {
            continue;
        };
        // Allow parameters between the name and the value.
        let value = match rest.split_once(':') {
            Some((params, value)) if params.is_empty() || params.starts_with(';') => value,
            _ => continue,
        };
        let value = value.trim_end_matches('\r').trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vevent() {
        let raw = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nSUMMARY:Team sync\r\n\
                   DTSTART:20080504T123456Z\r\nDTEND:20080504T133456Z\r\n\
                   LOCATION:Room 4\r\nEND:VEVENT\r\nEND:VCALENDAR";
        match parse(raw).unwrap() {
            ParsedResult::Calendar(event) => {
                assert_eq!(event.summary.as_deref(), Some("Team sync"));
                assert_eq!(event.start, "20080504T123456Z");
                assert_eq!(event.end.as_deref(), Some("20080504T133456Z"));
                assert_eq!(event.location.as_deref(), Some("Room 4"));
                assert_eq!(event.description, None);
            }
            other => panic!("expected calendar, got {}", other.type_name()),
        }
    }

    #[test]
    fn requires_start() {
        assert!(parse("BEGIN:VEVENT\r\nSUMMARY:No date\r\nEND:VEVENT").is_none());
        assert!(parse("BEGIN:VCARD\r\nN:Owen;Sean\r\nEND:VCARD").is_none());
    }
}
