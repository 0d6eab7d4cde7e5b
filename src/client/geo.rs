//! geo: URI parsing

use crate::client::ParsedResult;

#[derive(Debug, Clone, PartialEq)]
pub struct Geo {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters; zero when the URI omits it.
    pub altitude: f64,
    pub query: Option<String>,
}

pub(crate) fn parse(raw: &str) -> Option<ParsedResult> {
    let rest = raw
        .strip_prefix("geo:")
        .or_else(|| raw.strip_prefix("GEO:"))?;
    let (coords, query) = match rest.split_once('?') {
        Some((coords, query)) => (coords, Some(query.to_string())),
        None => (rest, None),
    };

    let mut parts = coords.split(',');
    let latitude: f64 = parts.next()?.parse().ok()?;
    let longitude: f64 = parts.next()?.parse().ok()?;
    let altitude: f64 = match parts.next() {
        Some(a) => a.parse().ok()?,
        None => 0.0,
    };
    if parts.next().is_some() || altitude < 0.0 {
        return None;
    }
    Some(ParsedResult::Geo(Geo {
        latitude,
        longitude,
        altitude,
        query,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo(raw: &str) -> Geo {
        match parse(raw).unwrap() {
            ParsedResult::Geo(g) => g,
            other => panic!("expected geo, got {}", other.type_name()),
        }
    }

    #[test]
    fn two_and_three_component_forms() {
        let g = geo("geo:1,2");
        assert_eq!(g.latitude, 1.0);
        assert_eq!(g.longitude, 2.0);
        assert_eq!(g.altitude, 0.0);

        let g = geo("geo:100.33,-32.3344,3.35");
        assert_eq!(g.latitude, 100.33);
        assert_eq!(g.longitude, -32.3344);
        assert_eq!(g.altitude, 3.35);
    }

    #[test]
    fn query_is_retained() {
        let g = geo("geo:37.786971,-122.399677?q=park");
        assert_eq!(g.query.as_deref(), Some("q=park"));
    }

    #[test]
    fn declines_malformed() {
        assert!(parse("geo:").is_none());
        assert!(parse("geo:1").is_none());
        assert!(parse("geo:1,2,3,4").is_none());
        assert!(parse("geo:one,two").is_none());
        assert!(parse("geography lesson").is_none());
    }
}
