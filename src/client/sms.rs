//! sms:/mms: URIs and the SMSTO shorthand

use crate::client::ParsedResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sms {
    pub numbers: Vec<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

pub(crate) fn parse(raw: &str) -> Option<ParsedResult> {
    for prefix in ["sms:", "SMS:", "mms:", "MMS:"] {
        if let Some(rest) = raw.strip_prefix(prefix) {
            let (numbers_part, query) = match rest.split_once('?') {
                Some((n, q)) => (n, Some(q)),
                None => (rest, None),
            };
            let numbers: Vec<String> = numbers_part
                .split(',')
                .filter(|n| !n.is_empty())
                // A ;via= suffix occasionally rides along; drop it.
                .map(|n| n.split(';').next().unwrap_or(n).to_string())
                .collect();
            if numbers.is_empty() {
                return None;
            }
            let mut sms = Sms {
                numbers,
                ..Default::default()
            };
            if let Some(query) = query {
                for pair in query.split('&') {
                    match pair.split_once('=') {
                        Some(("subject", v)) => sms.subject = Some(v.to_string()),
                        Some(("body", v)) => sms.body = Some(v.to_string()),
                        _ => {}
                    }
                }
            }
            return Some(ParsedResult::Sms(sms));
        }
    }

    // SMSTO:number:body
    for prefix in ["SMSTO:", "smsto:", "MMSTO:", "mmsto:"] {
        if let Some(rest) = raw.strip_prefix(prefix) {
            let (number, body) = match rest.split_once(':') {
                Some((n, b)) => (n, Some(b.to_string())),
                None => (rest, None),
            };
            if number.is_empty() {
                return None;
            }
            return Some(ParsedResult::Sms(Sms {
                numbers: vec![number.to_string()],
                subject: None,
                body,
            }));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sms(raw: &str) -> Sms {
        match parse(raw).unwrap() {
            ParsedResult::Sms(s) => s,
            other => panic!("expected sms, got {}", other.type_name()),
        }
    }

    #[test]
    fn sms_uri() {
        let s = sms("sms:+15551212?body=Hello");
        assert_eq!(s.numbers, ["+15551212"]);
        assert_eq!(s.body.as_deref(), Some("Hello"));
    }

    #[test]
    fn multiple_numbers() {
        let s = sms("sms:+15551212,+15557777");
        assert_eq!(s.numbers, ["+15551212", "+15557777"]);
    }

    #[test]
    fn smsto_shorthand() {
        let s = sms("SMSTO:+15551212:On my way");
        assert_eq!(s.numbers, ["+15551212"]);
        assert_eq!(s.body.as_deref(), Some("On my way"));
    }

    #[test]
    fn declines_empty() {
        assert!(parse("sms:").is_none());
        assert!(parse("smells").is_none());
    }
}
