//! mailto: URIs, DoCoMo MATMSG messages and bare email addresses

use crate::client::{match_single_prefixed_field, ParsedResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Email {
    pub to: String,
    pub subject: Option<String>,
    pub body: Option<String>,
}

pub(crate) fn parse(raw: &str) -> Option<ParsedResult> {
    if raw.starts_with("MATMSG:") {
        let to = match_single_prefixed_field("TO:", raw, ';', true)?;
        if !is_basically_valid_email(&to) {
            return None;
        }
        return Some(ParsedResult::Email(Email {
            to,
            subject: match_single_prefixed_field("SUB:", raw, ';', false),
            body: match_single_prefixed_field("BODY:", raw, ';', false),
        }));
    }

    if let Some(rest) = raw
        .strip_prefix("mailto:")
        .or_else(|| raw.strip_prefix("MAILTO:"))
    {
        let (to, query) = match rest.split_once('?') {
            Some((to, query)) => (to, Some(query)),
            None => (rest, None),
        };
        let mut email = Email {
            to: to.to_string(),
            ..Default::default()
        };
        if let Some(query) = query {
            for pair in query.split('&') {
                match pair.split_once('=') {
                    Some(("subject", v)) => email.subject = Some(v.to_string()),
                    Some(("body", v)) => email.body = Some(v.to_string()),
                    _ => {}
                }
            }
        }
        return Some(ParsedResult::Email(email));
    }

    if is_basically_valid_email(raw) {
        return Some(ParsedResult::Email(Email {
            to: raw.to_string(),
            ..Default::default()
        }));
    }
    None
}

/// Loose shape check: one @, something before it, a dot somewhere in the
/// domain, no whitespace.
fn is_basically_valid_email(text: &str) -> bool {
    if text.is_empty() || text.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@')
}
