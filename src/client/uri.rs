//! URLTO bookmarks and bare URIs

use crate::client::ParsedResult;

#[derive(Debug, Clone, PartialEq)]
pub struct Uri {
    pub uri: String,
    pub title: Option<String>,
}

pub(crate) fn parse(raw: &str) -> Option<ParsedResult> {
    // Mobile-tag simple web form: URLTO:title:uri
    for prefix in ["URLTO:", "urlto:"] {
        if let Some(rest) = raw.strip_prefix(prefix) {
            let (title, uri) = rest.split_once(':')?;
            return Some(ParsedResult::Uri(Uri {
                uri: normalize(uri),
                title: (!title.is_empty()).then(|| title.to_string()),
            }));
        }
    }

    if is_basically_valid_uri(raw) {
        return Some(ParsedResult::Uri(Uri {
            uri: normalize(raw),
            title: None,
        }));
    }
    None
}

/// Loose plausibility test: no whitespace, and either a scheme separator
/// or a domain-looking dot that is not at the very end.
fn is_basically_valid_uri(uri: &str) -> bool {
    if uri.is_empty() || uri.chars().any(char::is_whitespace) {
        return false;
    }
    let period = uri.find('.');
    match period {
        Some(i) if i >= uri.len() - 2 => false,
        Some(_) => true,
        None => uri.contains(':'),
    }
}

/// Web addresses without a scheme get http://, matching how readers treat
/// "www." content.
fn normalize(uri: &str) -> String {
    if uri.contains("://") || uri.starts_with("mailto:") {
        uri.to_string()
    } else {
        format!("http://{uri}")
    }
}
